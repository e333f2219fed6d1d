// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Per-learner, per-course progress record.
//!
//! Stored at `user/{user_id}/InProgressCourses/{course_id}`. All bookkeeping
//! rules for module transitions, quiz submissions and warning signals live
//! here as plain methods; the progress service only loads, calls and saves.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use std::collections::BTreeMap;

use crate::models::course::Course;
use crate::models::quiz::{CategoryScore, QuestionSet, QuizOutcome, QuizScore};

pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_COMPLETED: &str = "Completed";

/// Timing, attempts and warnings for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ModuleDetail {
    #[serde(default)]
    pub attempts: u32,
    /// Accumulated seconds spent before passing the module
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub time_spent_secs: u64,
    #[serde(default)]
    pub warnings: u32,
    #[serde(default)]
    pub critical_warnings: u32,
    #[serde(default)]
    pub last_score: Option<u32>,
}

/// Aggregate quiz performance for the enrollment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PerformanceAnalysis {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    /// Percentage of all answered questions that were correct
    #[serde(default)]
    pub accuracy: f64,
    /// Remember-level questions
    #[serde(default)]
    pub memory: CategoryScore,
    /// Understand-level questions
    #[serde(default)]
    pub understanding: CategoryScore,
    /// Analyze-level questions
    #[serde(default)]
    pub analysis: CategoryScore,
}

impl PerformanceAnalysis {
    /// Fold a passing submission into the totals.
    pub fn record(&mut self, score: &QuizScore) {
        self.total_questions += score.total;
        self.correct_answers += score.correct;
        self.memory.add(score.remember);
        self.understanding.add(score.understand);
        self.analysis.add(score.analyze);
        self.accuracy = CategoryScore {
            correct: self.correct_answers,
            total: self.total_questions,
        }
        .accuracy();
    }
}

/// Anti-cheating signal reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum WarningKind {
    /// Tab hidden or switched away
    Visibility,
    /// Cursor left the viewport
    MouseLeave,
}

/// In-progress enrollment document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub course_id: String,
    pub course_name: String,
    pub author_id: String,
    /// 1-based module the learner is on
    pub current_module: u32,
    /// Furthest module reached
    pub module_covered: u32,
    pub total_modules: u32,
    #[serde(default)]
    pub warnings: u32,
    #[serde(default)]
    pub critical_warnings: u32,
    #[serde(default)]
    pub completed: bool,
    /// Keyed by 1-based module number (Firestore map keys are strings)
    #[serde(default)]
    pub module_details: BTreeMap<String, ModuleDetail>,
    /// Mean of `time_spent_secs` over all stored module details
    #[serde(default)]
    pub avg_time_per_module: f64,
    #[serde(default)]
    pub performance_analysis: PerformanceAnalysis,
    /// Question set awaiting an answer
    #[serde(default)]
    pub pending_questions: Option<QuestionSet>,
    /// When the learner arrived on the current module
    pub module_started_at: String,
    pub applied_at: String,
    pub updated_at: String,
}

/// Result of a quiz submission applied to an enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizApplied {
    pub outcome: QuizOutcome,
    /// Module the submission was for
    pub module: u32,
    /// Module after the submission
    pub current_module: u32,
    pub completed: bool,
}

impl Enrollment {
    /// Fresh enrollment positioned on module 1.
    pub fn new(course: &Course, now: &str) -> Self {
        Self {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            author_id: course.author_id.clone(),
            current_module: 1,
            module_covered: 1,
            total_modules: course.module_count.max(1),
            warnings: 0,
            critical_warnings: 0,
            completed: false,
            module_details: BTreeMap::new(),
            avg_time_per_module: 0.0,
            performance_analysis: PerformanceAnalysis::default(),
            pending_questions: None,
            module_started_at: now.to_string(),
            applied_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    pub fn status(&self) -> &'static str {
        if self.completed {
            STATUS_COMPLETED
        } else {
            STATUS_IN_PROGRESS
        }
    }

    /// Stored detail for a module, if any.
    pub fn detail(&self, module: u32) -> Option<&ModuleDetail> {
        self.module_details.get(&module.to_string())
    }

    fn detail_mut(&mut self, module: u32) -> &mut ModuleDetail {
        self.module_details.entry(module.to_string()).or_default()
    }

    /// Attempts recorded for a module (0 if never attempted).
    pub fn attempts_for(&self, module: u32) -> u32 {
        self.detail(module).map(|d| d.attempts).unwrap_or(0)
    }

    /// Whether a question set is pending for the current module.
    pub fn has_pending_questions(&self) -> bool {
        self.pending_questions
            .as_ref()
            .is_some_and(|set| set.module == self.current_module)
    }

    fn recompute_average_time(&mut self) {
        if self.module_details.is_empty() {
            self.avg_time_per_module = 0.0;
            return;
        }
        let total: u64 = self
            .module_details
            .values()
            .map(|d| d.time_spent_secs)
            .sum();
        self.avg_time_per_module = total as f64 / self.module_details.len() as f64;
    }

    fn move_to(&mut self, module: u32, now: &str) {
        self.current_module = module;
        self.pending_questions = None;
        self.module_started_at = now.to_string();
        self.updated_at = now.to_string();
    }

    /// Advance past the current module after it was passed.
    ///
    /// Passing the final module marks the enrollment completed and leaves
    /// the pointer on the final module.
    pub fn advance(&mut self, elapsed_secs: u64, now: &str) {
        let module = self.current_module;
        self.detail_mut(module).time_spent_secs += elapsed_secs;
        self.recompute_average_time();

        if module >= self.total_modules {
            self.completed = true;
            self.move_to(module, now);
        } else {
            let next = module + 1;
            self.module_covered = self.module_covered.max(next);
            self.move_to(next, now);
        }
    }

    /// Step back one module. Returns the attempt count of the module now current.
    ///
    /// From module 1 the index stays at 1.
    pub fn previous(&mut self, now: &str) -> u32 {
        if self.current_module > 1 {
            let target = self.current_module - 1;
            self.move_to(target, now);
        }
        self.attempts_for(self.current_module)
    }

    /// Step forward to an already covered module without a quiz.
    ///
    /// Returns the attempt count of the new module, or `None` when the next
    /// module has not been reached yet.
    pub fn next_covered(&mut self, now: &str) -> Option<u32> {
        if self.current_module >= self.module_covered {
            return None;
        }
        let target = self.current_module + 1;
        self.move_to(target, now);
        Some(self.attempts_for(target))
    }

    /// Store a freshly generated question set for the current module.
    pub fn set_pending_questions(&mut self, set: QuestionSet, now: &str) {
        self.pending_questions = Some(set);
        self.updated_at = now.to_string();
    }

    /// Apply a scored submission for the current module.
    pub fn record_quiz(&mut self, score: &QuizScore, elapsed_secs: u64, now: &str) -> QuizApplied {
        let module = self.current_module;
        let outcome = QuizOutcome::for_percent(score.percent);

        let detail = self.detail_mut(module);
        detail.attempts += 1;
        detail.last_score = Some(score.percent);

        match outcome {
            QuizOutcome::Advance => {
                self.performance_analysis.record(score);
                self.advance(elapsed_secs, now);
            }
            QuizOutcome::Retry => {
                self.updated_at = now.to_string();
            }
            QuizOutcome::Regenerate => {
                self.pending_questions = None;
                self.updated_at = now.to_string();
            }
        }
        self.recompute_average_time();

        QuizApplied {
            outcome,
            module,
            current_module: self.current_module,
            completed: self.completed,
        }
    }

    /// Record an anti-cheating signal. Returns whether it was counted.
    ///
    /// Signals only count while a question set is pending. A visibility
    /// change also discards the pending set.
    pub fn record_signal(&mut self, kind: WarningKind, now: &str) -> bool {
        if !self.has_pending_questions() {
            return false;
        }

        let module = self.current_module;
        match kind {
            WarningKind::Visibility => {
                self.warnings += 1;
                self.detail_mut(module).warnings += 1;
                self.pending_questions = None;
            }
            WarningKind::MouseLeave => {
                self.critical_warnings += 1;
                self.detail_mut(module).critical_warnings += 1;
            }
        }
        self.recompute_average_time();
        self.updated_at = now.to_string();
        true
    }

    /// Total seconds recorded across modules.
    pub fn total_time_secs(&self) -> u64 {
        self.module_details.values().map(|d| d.time_spent_secs).sum()
    }
}
