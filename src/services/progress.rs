// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Learner progress workflow.
//!
//! Each operation follows the same shape:
//! 1. Load the enrollment (and course when content is needed)
//! 2. Apply the bookkeeping rule on the `Enrollment` model
//! 3. Store the enrollment
//! 4. Refresh the author's roster mirror (best-effort, separate write)

use chrono::Utc;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::enrollment::WarningKind;
use crate::models::quiz::{score_answers, QuestionSet, QuestionView, QuizOutcome, QuizScore};
use crate::models::{Course, Enrollment, RosterEntry, UserAccount};
use crate::services::ai::AiService;
use crate::time_utils::{format_utc_rfc3339, seconds_since};

/// Module position after a navigation step.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ModulePosition {
    pub current_module: u32,
    pub module_covered: u32,
    pub total_modules: u32,
    /// Attempts previously recorded for the module now current
    pub attempts: u32,
    pub completed: bool,
}

impl ModulePosition {
    fn of(enrollment: &Enrollment, attempts: u32) -> Self {
        Self {
            current_module: enrollment.current_module,
            module_covered: enrollment.module_covered,
            total_modules: enrollment.total_modules,
            attempts,
            completed: enrollment.completed,
        }
    }
}

/// Questions handed to the learner for the current module.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuizView {
    pub module: u32,
    pub questions: Vec<QuestionView>,
    pub generated_at: String,
}

impl From<&QuestionSet> for QuizView {
    fn from(set: &QuestionSet) -> Self {
        Self {
            module: set.module,
            questions: set.questions.iter().map(QuestionView::from).collect(),
            generated_at: set.generated_at.clone(),
        }
    }
}

/// Result of a quiz submission.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmitResult {
    pub outcome: QuizOutcome,
    pub score: QuizScore,
    /// Module the submission was for
    pub module: u32,
    pub current_module: u32,
    pub completed: bool,
}

/// Result of reporting an anti-cheating signal.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WarningResult {
    /// False when no quiz was pending and the signal was ignored
    pub counted: bool,
    pub warnings: u32,
    pub critical_warnings: u32,
    /// Whether the pending questions were discarded
    pub questions_cleared: bool,
}

/// Drives enrollments through module transitions, quizzes and warnings.
pub struct ProgressService {
    db: FirestoreDb,
    ai: AiService,
}

impl ProgressService {
    pub fn new(db: FirestoreDb, ai: AiService) -> Self {
        Self { db, ai }
    }

    /// Enroll a learner in a published course.
    pub async fn apply(&self, user: &UserAccount, course_id: &str) -> Result<Enrollment> {
        let course = self.load_course(course_id).await?;

        if self.db.get_enrollment(&user.id, course_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "already enrolled in course {}",
                course_id
            )));
        }

        let enrollment = Enrollment::new(&course, &now());
        self.save(user, &enrollment, true).await?;

        tracing::info!(
            user_id = %user.id,
            course_id,
            total_modules = enrollment.total_modules,
            "Learner applied to course"
        );
        Ok(enrollment)
    }

    /// Step back one module.
    pub async fn previous(&self, user: &UserAccount, course_id: &str) -> Result<ModulePosition> {
        let mut enrollment = self.load_enrollment(user, course_id).await?;
        let before = enrollment.current_module;

        let attempts = enrollment.previous(&now());
        let moved = enrollment.current_module != before;
        if moved {
            self.save(user, &enrollment, true).await?;
        }

        tracing::debug!(
            user_id = %user.id,
            course_id,
            from = before,
            to = enrollment.current_module,
            "Previous module"
        );
        Ok(ModulePosition::of(&enrollment, attempts))
    }

    /// Step forward to an already covered module.
    pub async fn next(&self, user: &UserAccount, course_id: &str) -> Result<ModulePosition> {
        let mut enrollment = self.load_enrollment(user, course_id).await?;
        let before = enrollment.current_module;

        let attempts = enrollment.next_covered(&now()).ok_or_else(|| {
            AppError::Forbidden(format!(
                "module {} must be passed before moving on",
                before
            ))
        })?;
        self.save(user, &enrollment, true).await?;

        tracing::debug!(
            user_id = %user.id,
            course_id,
            from = before,
            to = enrollment.current_module,
            "Next covered module"
        );
        Ok(ModulePosition::of(&enrollment, attempts))
    }

    /// Generate (or return the pending) question set for the current module.
    pub async fn generate_quiz(&self, user: &UserAccount, course_id: &str) -> Result<QuizView> {
        let mut enrollment = self.load_enrollment(user, course_id).await?;
        ensure_quiz_allowed(&enrollment)?;

        if enrollment.has_pending_questions() {
            if let Some(set) = enrollment.pending_questions.as_ref() {
                return Ok(QuizView::from(set));
            }
        }

        let course = self.load_course(course_id).await?;
        let module = course
            .module(enrollment.current_module)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("course content: {}", e)))?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "module {} of course {}",
                    enrollment.current_module, course_id
                ))
            })?;

        let questions = self
            .ai
            .generate_questions(&module, course.questions_per_module)
            .await?;

        let now = now();
        // Nothing is stored, so warnings stay uncounted and the next request
        // asks the model again.
        if questions.is_empty() {
            tracing::warn!(
                user_id = %user.id,
                course_id,
                module = enrollment.current_module,
                "Model returned no questions"
            );
            return Ok(QuizView {
                module: enrollment.current_module,
                questions: Vec::new(),
                generated_at: now,
            });
        }

        let set = QuestionSet {
            module: enrollment.current_module,
            questions,
            generated_at: now.clone(),
        };
        let view = QuizView::from(&set);
        enrollment.set_pending_questions(set, &now);
        self.save(user, &enrollment, false).await?;

        tracing::info!(
            user_id = %user.id,
            course_id,
            module = view.module,
            questions = view.questions.len(),
            "Quiz generated"
        );
        Ok(view)
    }

    /// Score a submission against the pending question set.
    pub async fn submit_quiz(
        &self,
        user: &UserAccount,
        course_id: &str,
        answers: &[String],
    ) -> Result<SubmitResult> {
        let mut enrollment = self.load_enrollment(user, course_id).await?;

        let score = match enrollment.pending_questions.as_ref() {
            Some(set) if enrollment.has_pending_questions() => {
                score_answers(&set.questions, answers)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "no quiz pending for the current module".to_string(),
                ))
            }
        };

        let now_dt = Utc::now();
        let elapsed = seconds_since(&enrollment.module_started_at, now_dt);
        let applied = enrollment.record_quiz(&score, elapsed, &format_utc_rfc3339(now_dt));
        let moved = applied.outcome == QuizOutcome::Advance;
        self.save(user, &enrollment, moved).await?;

        tracing::info!(
            user_id = %user.id,
            course_id,
            module = applied.module,
            percent = score.percent,
            outcome = ?applied.outcome,
            completed = applied.completed,
            "Quiz submitted"
        );

        Ok(SubmitResult {
            outcome: applied.outcome,
            score,
            module: applied.module,
            current_module: applied.current_module,
            completed: applied.completed,
        })
    }

    /// Record an anti-cheating signal from the client.
    pub async fn record_warning(
        &self,
        user: &UserAccount,
        course_id: &str,
        kind: WarningKind,
    ) -> Result<WarningResult> {
        let mut enrollment = self.load_enrollment(user, course_id).await?;

        let counted = enrollment.record_signal(kind, &now());
        if counted {
            self.save(user, &enrollment, false).await?;
            tracing::warn!(
                user_id = %user.id,
                course_id,
                module = enrollment.current_module,
                kind = ?kind,
                "Integrity warning recorded"
            );
        }

        Ok(WarningResult {
            counted,
            warnings: enrollment.warnings,
            critical_warnings: enrollment.critical_warnings,
            questions_cleared: counted && kind == WarningKind::Visibility,
        })
    }

    async fn load_course(&self, course_id: &str) -> Result<Course> {
        self.db
            .get_course(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("course {}", course_id)))
    }

    async fn load_enrollment(&self, user: &UserAccount, course_id: &str) -> Result<Enrollment> {
        self.db
            .get_enrollment(&user.id, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("enrollment in course {}", course_id)))
    }

    /// Store the enrollment, then refresh the roster mirror if asked.
    ///
    /// The roster write is not retried; a failure leaves the mirror stale
    /// until the next module change.
    async fn save(&self, user: &UserAccount, enrollment: &Enrollment, sync_roster: bool) -> Result<()> {
        self.db.set_enrollment(&user.id, enrollment).await?;

        if sync_roster {
            let entry = RosterEntry::from_enrollment(user, enrollment);
            if let Err(e) = self
                .db
                .set_roster_entry(&enrollment.author_id, &enrollment.course_id, &entry)
                .await
            {
                tracing::warn!(
                    user_id = %user.id,
                    course_id = %enrollment.course_id,
                    error = %e,
                    "Roster mirror update failed"
                );
            }
        }
        Ok(())
    }
}

fn now() -> String {
    format_utc_rfc3339(Utc::now())
}

/// A new quiz may only be requested while the course is unfinished.
fn ensure_quiz_allowed(enrollment: &Enrollment) -> Result<()> {
    if enrollment.completed {
        return Err(AppError::Conflict(format!(
            "course {} is already completed",
            enrollment.course_id
        )));
    }
    Ok(())
}
