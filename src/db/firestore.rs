// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (learners and admins)
//! - Courses (published copy and the author's mirror)
//! - Enrollments (per-learner progress sub-collection)
//! - Roster (admin-facing mirror of enrollments)
//! - Repository (saved text snippets)
//!
//! Writes are plain last-write-wins upserts; nothing here is transactional.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{AdminAccount, Course, Enrollment, RepositoryEntry, RosterEntry, UserAccount};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    fn parent_path(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collection, document_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Parent path for a course's roster: `admin/{author}/courses/{course}`.
    fn roster_parent(
        &self,
        author_id: &str,
        course_id: &str,
    ) -> Result<firestore::ParentPathBuilder, AppError> {
        self.parent_path(collections::ADMINS, author_id)?
            .at(collections::ADMIN_COURSES, course_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Learner Account Operations ──────────────────────────────

    /// Get a learner account by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a learner account.
    pub async fn upsert_user(&self, user: &UserAccount) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a learner account and its enrollments.
    ///
    /// Roster mirrors for each enrollment are removed on a best-effort basis.
    /// Returns the number of enrollment documents deleted.
    pub async fn delete_user(&self, user_id: &str) -> Result<usize, AppError> {
        let enrollments = self.list_enrollments(user_id).await?;
        let count = enrollments.len();
        let client = self.get_client()?;
        let parent = self.parent_path(collections::USERS, user_id)?;

        stream::iter(enrollments)
            .map(|enrollment| {
                let parent = &parent;
                async move {
                    client
                        .fluent()
                        .delete()
                        .from(collections::IN_PROGRESS)
                        .document_id(&enrollment.course_id)
                        .parent(parent)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;

                    if let Err(e) = self
                        .delete_roster_entry(&enrollment.author_id, &enrollment.course_id, user_id)
                        .await
                    {
                        tracing::warn!(
                            user_id,
                            course_id = %enrollment.course_id,
                            error = %e,
                            "Failed to remove roster entry during account deletion"
                        );
                    }

                    Ok::<_, AppError>(())
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id, enrollments = count, "Learner account deleted");
        Ok(count)
    }

    // ─── Admin Account Operations ────────────────────────────────

    /// Get an admin account by ID.
    pub async fn get_admin(&self, admin_id: &str) -> Result<Option<AdminAccount>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ADMINS)
            .obj()
            .one(admin_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update an admin account.
    pub async fn upsert_admin(&self, admin: &AdminAccount) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ADMINS)
            .document_id(&admin.id)
            .object(admin)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Course Operations ───────────────────────────────────────

    /// Get a published course.
    pub async fn get_course(&self, course_id: &str) -> Result<Option<Course>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COURSES)
            .obj()
            .one(course_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all published courses, newest first.
    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COURSES)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List courses authored by an admin.
    pub async fn list_admin_courses(&self, admin_id: &str) -> Result<Vec<Course>, AppError> {
        let parent = self.parent_path(collections::ADMINS, admin_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ADMIN_COURSES)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Publish a course: the shared copy first, then the author's mirror.
    pub async fn publish_course(&self, course: &Course) -> Result<(), AppError> {
        let client = self.get_client()?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::COURSES)
            .document_id(&course.id)
            .object(course)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let parent = self.parent_path(collections::ADMINS, &course.author_id)?;
        let _: () = client
            .fluent()
            .update()
            .in_col(collections::ADMIN_COURSES)
            .document_id(&course.id)
            .parent(&parent)
            .object(course)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ─── Enrollment Operations ───────────────────────────────────

    /// Get a learner's enrollment in a course.
    pub async fn get_enrollment(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<Enrollment>, AppError> {
        let parent = self.parent_path(collections::USERS, user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::IN_PROGRESS)
            .parent(&parent)
            .obj()
            .one(course_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all of a learner's enrollments.
    pub async fn list_enrollments(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError> {
        let parent = self.parent_path(collections::USERS, user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::IN_PROGRESS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a learner's enrollment.
    pub async fn set_enrollment(
        &self,
        user_id: &str,
        enrollment: &Enrollment,
    ) -> Result<(), AppError> {
        let parent = self.parent_path(collections::USERS, user_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::IN_PROGRESS)
            .document_id(&enrollment.course_id)
            .parent(&parent)
            .object(enrollment)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Roster Operations ───────────────────────────────────────

    /// Store a roster entry under the course author's mirror.
    pub async fn set_roster_entry(
        &self,
        author_id: &str,
        course_id: &str,
        entry: &RosterEntry,
    ) -> Result<(), AppError> {
        let parent = self.roster_parent(author_id, course_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::APPLIED_STUDENTS)
            .document_id(&entry.user_id)
            .parent(&parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List the applied-student roster of a course.
    pub async fn list_roster(
        &self,
        author_id: &str,
        course_id: &str,
    ) -> Result<Vec<RosterEntry>, AppError> {
        let parent = self.roster_parent(author_id, course_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::APPLIED_STUDENTS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_roster_entry(
        &self,
        author_id: &str,
        course_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let parent = self.roster_parent(author_id, course_id)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::APPLIED_STUDENTS)
            .document_id(user_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Repository Operations ───────────────────────────────────

    /// List an admin's saved snippets.
    pub async fn list_repository(&self, admin_id: &str) -> Result<Vec<RepositoryEntry>, AppError> {
        let parent = self.parent_path(collections::ADMINS, admin_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPOSITORY)
            .parent(&parent)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get one saved snippet.
    pub async fn get_repository_entry(
        &self,
        admin_id: &str,
        entry_id: &str,
    ) -> Result<Option<RepositoryEntry>, AppError> {
        let parent = self.parent_path(collections::ADMINS, admin_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REPOSITORY)
            .parent(&parent)
            .obj()
            .one(entry_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Save a snippet.
    pub async fn add_repository_entry(
        &self,
        admin_id: &str,
        entry: &RepositoryEntry,
    ) -> Result<(), AppError> {
        let parent = self.parent_path(collections::ADMINS, admin_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REPOSITORY)
            .document_id(&entry.id)
            .parent(&parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a snippet.
    pub async fn delete_repository_entry(
        &self,
        admin_id: &str,
        entry_id: &str,
    ) -> Result<(), AppError> {
        let parent = self.parent_path(collections::ADMINS, admin_id)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::REPOSITORY)
            .document_id(entry_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
