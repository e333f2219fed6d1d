// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Course model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One structured unit of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CourseModule {
    pub title: String,
    /// Concept explanation
    pub concept: String,
    /// Example or analogy illustrating the concept
    pub example: String,
}

/// Published course stored in Firestore.
///
/// Stored at `Courses/{id}` and mirrored at `admin/{author_id}/courses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Course ID (also used as document ID)
    pub id: String,
    pub name: String,
    /// Admin account that published the course
    pub author_id: String,
    pub author_name: String,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    /// JSON array of `CourseModule` objects
    pub content: String,
    pub module_count: u32,
    pub questions_per_module: u32,
    pub created_at: String,
}

impl Course {
    /// Serialize modules into the stored content blob.
    pub fn encode_modules(modules: &[CourseModule]) -> Result<String, serde_json::Error> {
        serde_json::to_string(modules)
    }

    /// Decode the content blob.
    pub fn modules(&self) -> Result<Vec<CourseModule>, serde_json::Error> {
        serde_json::from_str(&self.content)
    }

    /// Module by 1-based index.
    pub fn module(&self, index: u32) -> Result<Option<CourseModule>, serde_json::Error> {
        let modules = self.modules()?;
        Ok(index
            .checked_sub(1)
            .and_then(|i| modules.into_iter().nth(i as usize)))
    }
}

/// Course listing entry (content omitted).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub author_name: String,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    pub module_count: u32,
    pub questions_per_module: u32,
    pub created_at: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            author_name: course.author_name.clone(),
            thumbnail: course.thumbnail.clone(),
            banner: course.banner.clone(),
            module_count: course.module_count,
            questions_per_module: course.questions_per_module,
            created_at: course.created_at.clone(),
        }
    }
}
