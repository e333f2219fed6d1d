// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Admin-facing mirror of a learner's enrollment.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Enrollment, UserAccount};

/// Applied-student roster entry.
///
/// Stored at `admin/{author_id}/courses/{course_id}/AppliedStudents/{user_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RosterEntry {
    pub user_id: String,
    pub name: String,
    pub branch: String,
    pub current_module: u32,
    /// "In Progress" or "Completed"
    pub status: String,
    pub updated_at: String,
}

impl RosterEntry {
    pub fn from_enrollment(user: &UserAccount, enrollment: &Enrollment) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.full_name(),
            branch: user.branch.clone(),
            current_module: enrollment.current_module,
            status: enrollment.status().to_string(),
            updated_at: enrollment.updated_at.clone(),
        }
    }
}
