// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! API routes for signed-in admins: ingestion, course authoring, the
//! snippet repository, scraping pass-through and rosters.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthAdmin;
use crate::models::{
    AdminAccount, Course, CourseModule, CourseStats, CourseSummary, RepositoryEntry, RosterEntry,
    SnippetSource,
};
use crate::routes::validated;
use crate::services::ingest::{self, DocumentKind};
use crate::services::scraper::{PdfText, ScrapedPage, SearchHit};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_MODULE_COUNT: u32 = 5;
const DEFAULT_QUESTIONS_PER_MODULE: u32 = 5;
const MAX_MODULES: u32 = 20;
const MAX_QUESTIONS_PER_MODULE: u32 = 20;

/// Admin routes.
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/me", get(get_me))
        .route("/api/admin/ingest", post(ingest_document))
        .route("/api/admin/courses/generate", post(generate_course))
        .route("/api/admin/courses", get(list_courses).post(publish_course))
        .route("/api/admin/courses/{id}/students", get(list_students))
        .route("/api/admin/courses/{id}/stats", get(course_stats))
        .route(
            "/api/admin/repository",
            get(list_repository).post(add_repository_entry),
        )
        .route(
            "/api/admin/repository/{entry_id}",
            delete(delete_repository_entry),
        )
        .route("/api/admin/scrape/link", post(scrape_link))
        .route("/api/admin/scrape/pdfs", post(search_pdfs))
        .route("/api/admin/scrape/pdf-text", post(pdf_text))
        .route("/api/admin/scrape/videos", post(search_videos))
        .route("/api/admin/assist/write", post(assist_writing))
}

async fn get_me(Extension(admin): Extension<AuthAdmin>) -> Json<AdminAccount> {
    Json(admin.account)
}

// ─── Ingestion ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IngestResponse {
    pub file_name: Option<String>,
    pub text: String,
    pub char_count: usize,
    /// Repository entry created when `save` was set
    pub entry_id: Option<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("invalid multipart body: {}", e.body_text()))
    }
}

/// Extract text from an uploaded document.
///
/// Multipart fields: `file` (required), `save` ("true" stores the text in
/// the repository), `title` (repository title, defaults to the file name).
async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let mut upload: Option<(Option<String>, Option<String>, Vec<u8>)> = None;
    let mut save = false;
    let mut title: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("save") => {
                let value = field.text().await.map_err(multipart_error)?;
                save = matches!(value.trim(), "true" | "1" | "on");
            }
            Some("title") => {
                let value = field.text().await.map_err(multipart_error)?;
                title = Some(value.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("missing `file` field".to_string()))?;

    ingest::check_size(bytes.len(), state.config.max_upload_bytes)?;
    let kind = DocumentKind::detect(file_name.as_deref(), content_type.as_deref())?;

    tracing::info!(
        admin_id = %admin.account.id,
        file_name = ?file_name,
        kind = ?kind,
        bytes = bytes.len(),
        "Ingesting document"
    );

    let text = ingest::extract_text_blocking(kind, bytes).await?;

    let entry_id = if save {
        let entry = RepositoryEntry::new(
            title
                .or_else(|| file_name.clone())
                .unwrap_or_else(|| "Uploaded document".to_string()),
            SnippetSource::Upload,
            file_name.clone(),
            text.clone(),
            &now_rfc3339(),
        );
        state
            .db
            .add_repository_entry(&admin.account.id, &entry)
            .await?;
        Some(entry.id)
    } else {
        None
    };

    Ok(Json(IngestResponse {
        file_name,
        char_count: text.chars().count(),
        text,
        entry_id,
    }))
}

// ─── Course Authoring ────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub module_count: Option<u32>,
    /// Repository entries to use as source, concatenated in order
    #[serde(default)]
    pub snippet_ids: Vec<String>,
    /// Inline source text (e.g. from a prior ingestion)
    pub text: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GenerateCourseResponse {
    pub name: String,
    pub modules: Vec<CourseModule>,
}

/// Concatenate snippet texts (in request order) and inline text.
fn assemble_source(snippets: &[RepositoryEntry], inline: Option<&str>) -> Result<String> {
    let parts: Vec<&str> = snippets
        .iter()
        .map(|s| s.text.as_str())
        .chain(inline)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(AppError::BadRequest(
            "no source text: provide `text` or `snippet_ids`".to_string(),
        ));
    }
    Ok(parts.join("\n\n"))
}

fn clamp_count(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max)
}

/// Structure source material into course modules (not yet published).
async fn generate_course(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Json(body): Json<GenerateCourseRequest>,
) -> Result<Json<GenerateCourseResponse>> {
    let body = validated(body)?;

    let mut snippets = Vec::with_capacity(body.snippet_ids.len());
    for id in &body.snippet_ids {
        let entry = state
            .db
            .get_repository_entry(&admin.account.id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("repository entry {}", id)))?;
        snippets.push(entry);
    }

    let source = assemble_source(&snippets, body.text.as_deref())?;
    let module_count = clamp_count(body.module_count, DEFAULT_MODULE_COUNT, MAX_MODULES);

    let modules = state
        .ai
        .structure_course(&body.name, &source, module_count)
        .await?;

    Ok(Json(GenerateCourseResponse {
        name: body.name,
        modules,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublishCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub modules: Vec<CourseModule>,
    pub questions_per_module: Option<u32>,
    #[validate(url)]
    pub thumbnail: Option<String>,
    #[validate(url)]
    pub banner: Option<String>,
}

/// Publish a course to learners and the author's mirror.
async fn publish_course(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Json(body): Json<PublishCourseRequest>,
) -> Result<(StatusCode, Json<CourseSummary>)> {
    let body = validated(body)?;

    let content = Course::encode_modules(&body.modules)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("encode modules: {}", e)))?;

    let course = Course {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name,
        author_id: admin.account.id.clone(),
        author_name: admin.account.name.clone(),
        thumbnail: body.thumbnail,
        banner: body.banner,
        content,
        module_count: body.modules.len() as u32,
        questions_per_module: clamp_count(
            body.questions_per_module,
            DEFAULT_QUESTIONS_PER_MODULE,
            MAX_QUESTIONS_PER_MODULE,
        ),
        created_at: now_rfc3339(),
    };

    state.db.publish_course(&course).await?;
    tracing::info!(
        admin_id = %admin.account.id,
        course_id = %course.id,
        modules = course.module_count,
        "Course published"
    );

    Ok((StatusCode::CREATED, Json(CourseSummary::from(&course))))
}

async fn list_courses(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
) -> Result<Json<Vec<CourseSummary>>> {
    let courses = state.db.list_admin_courses(&admin.account.id).await?;
    Ok(Json(courses.iter().map(CourseSummary::from).collect()))
}

async fn list_students(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RosterEntry>>> {
    Ok(Json(state.db.list_roster(&admin.account.id, &id).await?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CourseStatsResponse {
    pub course_id: String,
    pub stats: CourseStats,
    pub students: Vec<RosterEntry>,
}

async fn course_stats(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(id): Path<String>,
) -> Result<Json<CourseStatsResponse>> {
    let students = state.db.list_roster(&admin.account.id, &id).await?;
    Ok(Json(CourseStatsResponse {
        stats: CourseStats::from_roster(&students),
        course_id: id,
        students,
    }))
}

// ─── Repository ──────────────────────────────────────────────

async fn list_repository(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
) -> Result<Json<Vec<RepositoryEntry>>> {
    Ok(Json(state.db.list_repository(&admin.account.id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddEntryRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub source: Option<SnippetSource>,
    pub origin: Option<String>,
}

async fn add_repository_entry(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Json(body): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<RepositoryEntry>)> {
    let body = validated(body)?;
    let entry = RepositoryEntry::new(
        body.title,
        body.source.unwrap_or(SnippetSource::Manual),
        body.origin,
        body.text,
        &now_rfc3339(),
    );
    state
        .db
        .add_repository_entry(&admin.account.id, &entry)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_repository_entry(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode> {
    if state
        .db
        .get_repository_entry(&admin.account.id, &entry_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("repository entry {}", entry_id)));
    }
    state
        .db
        .delete_repository_entry(&admin.account.id, &entry_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Scraping ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ScrapeLinkRequest {
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    pub save: bool,
    pub title: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScrapeLinkResponse {
    pub page: ScrapedPage,
    pub entry_id: Option<String>,
}

async fn scrape_link(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Json(body): Json<ScrapeLinkRequest>,
) -> Result<Json<ScrapeLinkResponse>> {
    let body = validated(body)?;
    let page = state.scraper.scrape_link(&body.url).await?;

    let entry_id = if body.save && !page.text.trim().is_empty() {
        let title = body
            .title
            .or_else(|| page.title.clone())
            .unwrap_or_else(|| page.url.clone());
        let entry = RepositoryEntry::new(
            title,
            SnippetSource::Scrape,
            Some(page.url.clone()),
            page.text.clone(),
            &now_rfc3339(),
        );
        state
            .db
            .add_repository_entry(&admin.account.id, &entry)
            .await?;
        Some(entry.id)
    } else {
        None
    };

    Ok(Json(ScrapeLinkResponse { page, entry_id }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 200))]
    pub query: String,
}

async fn search_pdfs(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>> {
    let body = validated(body)?;
    Ok(Json(state.scraper.search_pdfs(&body.query).await?))
}

async fn search_videos(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>> {
    let body = validated(body)?;
    Ok(Json(state.scraper.search_videos(&body.query).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PdfTextRequest {
    #[validate(length(min = 1, max = 20))]
    pub urls: Vec<String>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PdfTextResponse {
    pub documents: Vec<PdfText>,
    pub entry_ids: Vec<String>,
}

async fn pdf_text(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthAdmin>,
    Json(body): Json<PdfTextRequest>,
) -> Result<Json<PdfTextResponse>> {
    let body = validated(body)?;
    let documents = state.scraper.pdfs_to_text(&body.urls).await?;

    let mut entry_ids = Vec::new();
    if body.save {
        let now = now_rfc3339();
        for doc in documents.iter().filter(|d| !d.text.trim().is_empty()) {
            let entry = RepositoryEntry::new(
                doc.url.clone(),
                SnippetSource::Pdf,
                Some(doc.url.clone()),
                doc.text.clone(),
                &now,
            );
            state
                .db
                .add_repository_entry(&admin.account.id, &entry)
                .await?;
            entry_ids.push(entry.id);
        }
    }

    Ok(Json(PdfTextResponse {
        documents,
        entry_ids,
    }))
}

// ─── Writing Assistance ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct WriteAssistRequest {
    #[validate(length(min = 1, max = 500))]
    pub instruction: String,
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WriteAssistResponse {
    pub text: String,
}

async fn assist_writing(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WriteAssistRequest>,
) -> Result<Json<WriteAssistResponse>> {
    let body = validated(body)?;
    let text = state
        .ai
        .assist_writing(&body.instruction, &body.text)
        .await?;
    Ok(Json(WriteAssistResponse { text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> RepositoryEntry {
        RepositoryEntry::new(
            "t".to_string(),
            SnippetSource::Manual,
            None,
            text.to_string(),
            "2025-01-01T00:00:00Z",
        )
    }

    #[test]
    fn test_assemble_source_keeps_request_order() {
        let snippets = vec![entry("first"), entry("  "), entry("second")];
        let source = assemble_source(&snippets, Some("inline")).unwrap();
        assert_eq!(source, "first\n\nsecond\n\ninline");
    }

    #[test]
    fn test_assemble_source_requires_text() {
        let err = assemble_source(&[], Some("   ")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_counts_are_clamped() {
        assert_eq!(clamp_count(None, DEFAULT_MODULE_COUNT, MAX_MODULES), 5);
        assert_eq!(clamp_count(Some(0), DEFAULT_MODULE_COUNT, MAX_MODULES), 1);
        assert_eq!(clamp_count(Some(99), DEFAULT_MODULE_COUNT, MAX_MODULES), 20);
    }

    #[test]
    fn test_publish_request_validation() {
        let body = PublishCourseRequest {
            name: "Course".to_string(),
            modules: vec![],
            questions_per_module: None,
            thumbnail: Some("not a url".to_string()),
            banner: None,
        };
        let err = validated(body).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
