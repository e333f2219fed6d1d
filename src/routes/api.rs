// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! API routes for signed-in learners.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::enrollment::{ModuleDetail, PerformanceAnalysis, WarningKind};
use crate::models::generated::AnswerJudgement;
use crate::models::{CourseModule, CourseSummary, Enrollment, LearnerStats, UserAccount};
use crate::routes::validated;
use crate::services::progress::{ModulePosition, QuizView, SubmitResult, WarningResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Learner routes.
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).delete(delete_account))
        .route("/api/me/settings", put(update_settings))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/{id}", get(get_course))
        .route("/api/courses/{id}/apply", post(apply))
        .route("/api/enrollments", get(list_enrollments))
        .route("/api/enrollments/{course_id}", get(get_enrollment))
        .route("/api/enrollments/{course_id}/next", post(next_module))
        .route("/api/enrollments/{course_id}/previous", post(previous_module))
        .route("/api/enrollments/{course_id}/quiz", post(generate_quiz))
        .route("/api/enrollments/{course_id}/quiz/submit", post(submit_quiz))
        .route("/api/enrollments/{course_id}/warnings", post(report_warning))
        .route("/api/stats", get(get_stats))
        .route("/api/assist/validate", post(validate_answer))
}

// ─── Account ─────────────────────────────────────────────────

/// Get the signed-in learner's account.
async fn get_me(Extension(user): Extension<AuthUser>) -> Json<UserAccount> {
    Json(user.account)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettingsRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub surname: Option<String>,
    #[validate(length(max = 100))]
    pub branch: Option<String>,
    #[validate(length(max = 200))]
    pub college: Option<String>,
    pub audio_enabled: Option<bool>,
}

/// Update profile fields and preferences. Absent fields are unchanged.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SettingsRequest>,
) -> Result<Json<UserAccount>> {
    let body = validated(body)?;
    let mut account = user.account;

    if let Some(name) = body.name {
        account.name = name;
    }
    if let Some(surname) = body.surname {
        account.surname = surname;
    }
    if let Some(branch) = body.branch {
        account.branch = branch;
    }
    if let Some(college) = body.college {
        account.college = college;
    }
    if let Some(audio_enabled) = body.audio_enabled {
        account.audio_enabled = audio_enabled;
    }

    state.db.upsert_user(&account).await?;
    tracing::info!(user_id = %account.id, "Settings updated");
    Ok(Json(account))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub enrollments_deleted: usize,
}

/// Delete the learner's account and enrollments, and clear the session cookie.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DeleteAccountResponse>)> {
    tracing::info!(user_id = %user.account.id, "User-initiated account deletion");

    let enrollments_deleted = state.db.delete_user(&user.account.id).await?;
    let jar = crate::routes::auth::clear_learner_cookie(&state.config, jar);

    Ok((
        jar,
        Json(DeleteAccountResponse {
            success: true,
            enrollments_deleted,
        }),
    ))
}

// ─── Courses ─────────────────────────────────────────────────

async fn list_courses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CourseSummary>>> {
    let courses = state.db.list_courses().await?;
    Ok(Json(courses.iter().map(CourseSummary::from).collect()))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CourseDetailResponse {
    pub course: CourseSummary,
    pub modules: Vec<CourseModule>,
}

async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CourseDetailResponse>> {
    let course = state
        .db
        .get_course(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {}", id)))?;

    let modules = course
        .modules()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("course {} content: {}", id, e)))?;

    Ok(Json(CourseDetailResponse {
        course: CourseSummary::from(&course),
        modules,
    }))
}

async fn apply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<EnrollmentView>> {
    let enrollment = state.progress().apply(&user.account, &id).await?;
    Ok(Json(EnrollmentView::from(&enrollment)))
}

// ─── Enrollments ─────────────────────────────────────────────

/// Learner-facing enrollment (pending answers withheld).
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EnrollmentView {
    pub course_id: String,
    pub course_name: String,
    pub status: String,
    pub current_module: u32,
    pub module_covered: u32,
    pub total_modules: u32,
    pub completed: bool,
    pub warnings: u32,
    pub critical_warnings: u32,
    pub avg_time_per_module: f64,
    pub module_details: BTreeMap<String, ModuleDetail>,
    pub performance_analysis: PerformanceAnalysis,
    pub has_pending_quiz: bool,
    pub applied_at: String,
    pub updated_at: String,
}

impl From<&Enrollment> for EnrollmentView {
    fn from(e: &Enrollment) -> Self {
        Self {
            course_id: e.course_id.clone(),
            course_name: e.course_name.clone(),
            status: e.status().to_string(),
            current_module: e.current_module,
            module_covered: e.module_covered,
            total_modules: e.total_modules,
            completed: e.completed,
            warnings: e.warnings,
            critical_warnings: e.critical_warnings,
            avg_time_per_module: e.avg_time_per_module,
            module_details: e.module_details.clone(),
            performance_analysis: e.performance_analysis.clone(),
            has_pending_quiz: e.has_pending_questions(),
            applied_at: e.applied_at.clone(),
            updated_at: e.updated_at.clone(),
        }
    }
}

async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<EnrollmentView>>> {
    let enrollments = state.db.list_enrollments(&user.account.id).await?;
    Ok(Json(enrollments.iter().map(EnrollmentView::from).collect()))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EnrollmentDetailResponse {
    pub enrollment: EnrollmentView,
    /// Content of the current module
    pub module: Option<CourseModule>,
}

async fn get_enrollment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<Json<EnrollmentDetailResponse>> {
    let enrollment = state
        .db
        .get_enrollment(&user.account.id, &course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("enrollment in course {}", course_id)))?;

    // A deleted course still shows its progress record.
    let module = match state.db.get_course(&course_id).await? {
        Some(course) => course
            .module(enrollment.current_module)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("course content: {}", e)))?,
        None => None,
    };

    Ok(Json(EnrollmentDetailResponse {
        enrollment: EnrollmentView::from(&enrollment),
        module,
    }))
}

async fn next_module(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<Json<ModulePosition>> {
    Ok(Json(state.progress().next(&user.account, &course_id).await?))
}

async fn previous_module(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<Json<ModulePosition>> {
    Ok(Json(
        state.progress().previous(&user.account, &course_id).await?,
    ))
}

// ─── Quiz ────────────────────────────────────────────────────

async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
) -> Result<Json<QuizView>> {
    Ok(Json(
        state
            .progress()
            .generate_quiz(&user.account, &course_id)
            .await?,
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// Selected option text per question, in question order
    #[validate(length(min = 1, max = 100))]
    pub answers: Vec<String>,
}

async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
    Json(body): Json<SubmitQuizRequest>,
) -> Result<Json<SubmitResult>> {
    let body = validated(body)?;
    Ok(Json(
        state
            .progress()
            .submit_quiz(&user.account, &course_id, &body.answers)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct WarningRequest {
    pub kind: WarningKind,
}

async fn report_warning(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<String>,
    Json(body): Json<WarningRequest>,
) -> Result<Json<WarningResult>> {
    Ok(Json(
        state
            .progress()
            .record_warning(&user.account, &course_id, body.kind)
            .await?,
    ))
}

// ─── Stats & Assistance ──────────────────────────────────────

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LearnerStats>> {
    let enrollments = state.db.list_enrollments(&user.account.id).await?;
    Ok(Json(LearnerStats::from_enrollments(&enrollments)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateAnswerRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(length(min = 1, max = 5000))]
    pub answer: String,
    pub context: Option<String>,
}

async fn validate_answer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateAnswerRequest>,
) -> Result<Json<AnswerJudgement>> {
    let body = validated(body)?;
    let judgement = state
        .ai
        .validate_answer(&body.question, &body.answer, body.context.as_deref())
        .await?;
    Ok(Json(judgement))
}
