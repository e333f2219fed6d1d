//! Dashboard aggregates computed from enrollment and roster documents.
//!
//! These are computed on read; nothing here is stored.

use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::enrollment::{Enrollment, STATUS_COMPLETED};
use crate::models::quiz::CategoryScore;
use crate::models::RosterEntry;

/// Learner dashboard statistics across all enrollments.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LearnerStats {
    // ─── Courses ─────────────────────────────────────────────────
    pub courses_applied: u32,
    pub courses_completed: u32,
    /// Modules passed across all courses
    pub modules_passed: u32,

    // ─── Time ────────────────────────────────────────────────────
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_time_secs: u64,

    // ─── Integrity Signals ───────────────────────────────────────
    pub warnings: u32,
    pub critical_warnings: u32,

    // ─── Accuracy ────────────────────────────────────────────────
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub memory: CategoryScore,
    pub understanding: CategoryScore,
    pub analysis: CategoryScore,
}

impl LearnerStats {
    pub fn from_enrollments(enrollments: &[Enrollment]) -> Self {
        let mut stats = Self::default();

        for enrollment in enrollments {
            stats.courses_applied += 1;
            if enrollment.completed {
                stats.courses_completed += 1;
                stats.modules_passed += enrollment.total_modules;
            } else {
                stats.modules_passed += enrollment.module_covered.saturating_sub(1);
            }

            stats.total_time_secs += enrollment.total_time_secs();
            stats.warnings += enrollment.warnings;
            stats.critical_warnings += enrollment.critical_warnings;

            let perf = &enrollment.performance_analysis;
            stats.total_questions += perf.total_questions;
            stats.correct_answers += perf.correct_answers;
            stats.memory.add(perf.memory);
            stats.understanding.add(perf.understanding);
            stats.analysis.add(perf.analysis);
        }

        stats.accuracy = CategoryScore {
            correct: stats.correct_answers,
            total: stats.total_questions,
        }
        .accuracy();

        stats
    }
}

/// Admin statistics for one course.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CourseStats {
    pub applied: u32,
    pub completed: u32,
    pub in_progress: u32,
    /// Learner count per current module ("1", "2", ...)
    pub by_module: BTreeMap<String, u32>,
}

impl CourseStats {
    pub fn from_roster(entries: &[RosterEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            stats.applied += 1;
            if entry.status == STATUS_COMPLETED {
                stats.completed += 1;
            } else {
                stats.in_progress += 1;
            }
            *stats
                .by_module
                .entry(entry.current_module.to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::Course;
    use crate::models::quiz::QuizScore;

    const NOW: &str = "2025-02-01T10:00:00Z";

    fn make_enrollment(modules: u32) -> Enrollment {
        let course = Course {
            id: format!("course-{modules}"),
            name: "Course".to_string(),
            author_id: "admin".to_string(),
            author_name: "Admin".to_string(),
            thumbnail: None,
            banner: None,
            content: "[]".to_string(),
            module_count: modules,
            questions_per_module: 2,
            created_at: NOW.to_string(),
        };
        Enrollment::new(&course, NOW)
    }

    fn passing_score() -> QuizScore {
        QuizScore {
            correct: 2,
            total: 2,
            percent: 100,
            remember: CategoryScore { correct: 1, total: 1 },
            understand: CategoryScore { correct: 0, total: 0 },
            analyze: CategoryScore { correct: 1, total: 1 },
        }
    }

    #[test]
    fn test_learner_stats_aggregate() {
        let mut first = make_enrollment(2);
        first.record_quiz(&passing_score(), 100, NOW);
        first.record_quiz(&passing_score(), 50, NOW);
        assert!(first.completed);

        let mut second = make_enrollment(3);
        second.record_quiz(&passing_score(), 30, NOW);
        second.warnings = 2;

        let stats = LearnerStats::from_enrollments(&[first, second]);

        assert_eq!(stats.courses_applied, 2);
        assert_eq!(stats.courses_completed, 1);
        assert_eq!(stats.modules_passed, 3);
        assert_eq!(stats.total_time_secs, 180);
        assert_eq!(stats.warnings, 2);
        assert_eq!(stats.total_questions, 6);
        assert_eq!(stats.correct_answers, 6);
        assert_eq!(stats.memory, CategoryScore { correct: 3, total: 3 });
        assert_eq!(stats.accuracy, 100.0);
    }

    #[test]
    fn test_learner_stats_empty() {
        let stats = LearnerStats::from_enrollments(&[]);
        assert_eq!(stats.courses_applied, 0);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn test_course_stats_from_roster() {
        let entry = |module: u32, status: &str| RosterEntry {
            user_id: format!("u{module}{status}"),
            name: "Learner".to_string(),
            branch: "CS".to_string(),
            current_module: module,
            status: status.to_string(),
            updated_at: NOW.to_string(),
        };
        let roster = vec![
            entry(1, "In Progress"),
            entry(1, "In Progress"),
            entry(4, "Completed"),
        ];

        let stats = CourseStats::from_roster(&roster);
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.by_module.get("1"), Some(&2));
    }
}
