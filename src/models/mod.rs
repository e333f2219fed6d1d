// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Data models for the application.

pub mod course;
pub mod enrollment;
pub mod generated;
pub mod quiz;
pub mod repository;
pub mod roster;
pub mod stats;
pub mod user;

pub use course::{Course, CourseModule, CourseSummary};
pub use enrollment::{Enrollment, WarningKind};
pub use quiz::{Question, QuestionSet, QuizOutcome, QuizScore};
pub use repository::{RepositoryEntry, SnippetSource};
pub use roster::RosterEntry;
pub use stats::{CourseStats, LearnerStats};
pub use user::{AdminAccount, UserAccount};
