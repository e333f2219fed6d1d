// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running:
//! `FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration`
//!
//! Each test uses unique IDs so runs do not interfere.

use course_forge::config::Config;
use course_forge::error::AppError;
use course_forge::models::{
    Course, CourseModule, Enrollment, QuizOutcome, RepositoryEntry, RosterEntry, SnippetSource,
    UserAccount, WarningKind,
};
use course_forge::services::{AiService, ProgressService};
use std::sync::Arc;

mod common;
use common::{test_db, CountingGenerator};

const NOW: &str = "2025-03-01T09:00:00Z";

fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn test_user(id: &str) -> UserAccount {
    UserAccount {
        id: id.to_string(),
        email: Some("learner@example.com".to_string()),
        name: "Test".to_string(),
        surname: "Learner".to_string(),
        branch: "Physics".to_string(),
        college: "North Campus".to_string(),
        is_admin: false,
        audio_enabled: false,
        created_at: NOW.to_string(),
    }
}

fn test_course(id: &str, author_id: &str) -> Course {
    let modules = vec![
        CourseModule {
            title: "Vectors".to_string(),
            concept: "Magnitude and direction.".to_string(),
            example: "Wind velocity.".to_string(),
        },
        CourseModule {
            title: "Forces".to_string(),
            concept: "Newton's laws.".to_string(),
            example: "Pushing a cart.".to_string(),
        },
    ];
    Course {
        id: id.to_string(),
        name: "Mechanics".to_string(),
        author_id: author_id.to_string(),
        author_name: "Prof".to_string(),
        thumbnail: None,
        banner: None,
        content: Course::encode_modules(&modules).unwrap(),
        module_count: modules.len() as u32,
        questions_per_module: 3,
        created_at: NOW.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCOUNT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");

    assert!(db.get_user(&id).await.unwrap().is_none());

    let mut user = test_user(&id);
    db.upsert_user(&user).await.unwrap();

    user.audio_enabled = true;
    user.branch = "Chemistry".to_string();
    db.upsert_user(&user).await.unwrap();

    let stored = db.get_user(&id).await.unwrap().expect("user exists");
    assert!(stored.audio_enabled);
    assert_eq!(stored.branch, "Chemistry");
    assert_eq!(stored.college, "North Campus");
}

// ═══════════════════════════════════════════════════════════════════════════
// COURSE & ENROLLMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_publish_course_writes_both_copies() {
    require_emulator!();

    let db = test_db().await;
    let author = unique_id("admin");
    let course = test_course(&unique_id("course"), &author);

    db.publish_course(&course).await.unwrap();

    let shared = db.get_course(&course.id).await.unwrap().expect("shared copy");
    assert_eq!(shared.modules().unwrap().len(), 2);

    let mirror = db.list_admin_courses(&author).await.unwrap();
    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror[0].id, course.id);
}

#[tokio::test]
async fn test_enrollment_and_roster_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let author = unique_id("admin");
    let user = test_user(&unique_id("user"));
    let course = test_course(&unique_id("course"), &author);

    let mut enrollment = Enrollment::new(&course, NOW);
    enrollment.advance(42, NOW);
    db.set_enrollment(&user.id, &enrollment).await.unwrap();
    db.set_roster_entry(
        &author,
        &course.id,
        &RosterEntry::from_enrollment(&user, &enrollment),
    )
    .await
    .unwrap();

    let stored = db
        .get_enrollment(&user.id, &course.id)
        .await
        .unwrap()
        .expect("enrollment exists");
    assert_eq!(stored.current_module, 2);
    assert_eq!(stored.detail(1).unwrap().time_spent_secs, 42);
    assert_eq!(stored.avg_time_per_module, 42.0);

    let roster = db.list_roster(&author, &course.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].current_module, 2);
    assert_eq!(roster[0].status, "In Progress");
}

#[tokio::test]
async fn test_delete_user_removes_enrollments_and_roster() {
    require_emulator!();

    let db = test_db().await;
    let author = unique_id("admin");
    let user = test_user(&unique_id("user"));
    db.upsert_user(&user).await.unwrap();

    for _ in 0..2 {
        let course = test_course(&unique_id("course"), &author);
        let enrollment = Enrollment::new(&course, NOW);
        db.set_enrollment(&user.id, &enrollment).await.unwrap();
        db.set_roster_entry(
            &author,
            &course.id,
            &RosterEntry::from_enrollment(&user, &enrollment),
        )
        .await
        .unwrap();
    }

    let deleted = db.delete_user(&user.id).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(db.get_user(&user.id).await.unwrap().is_none());
    assert!(db.list_enrollments(&user.id).await.unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// REPOSITORY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_repository_crud() {
    require_emulator!();

    let db = test_db().await;
    let admin = unique_id("admin");

    let entry = RepositoryEntry::new(
        "Lecture notes".to_string(),
        SnippetSource::Manual,
        None,
        "Entropy always increases.".to_string(),
        NOW,
    );
    db.add_repository_entry(&admin, &entry).await.unwrap();

    let listed = db.list_repository(&admin).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].char_count, 25);

    db.delete_repository_entry(&admin, &entry.id).await.unwrap();
    assert!(db
        .get_repository_entry(&admin, &entry.id)
        .await
        .unwrap()
        .is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PROGRESS WORKFLOW TESTS
// ═══════════════════════════════════════════════════════════════════════════

const QUIZ_JSON: &str = r#"```json
{"questions": [
  {"question": "Unit of force?", "bloom_level": "Remember", "options": [
    {"text": "Newton", "correct": true}, {"text": "Joule", "correct": false},
    {"text": "Watt", "correct": false}, {"text": "Pascal", "correct": false}]},
  {"question": "F = m times?", "bloom_level": "Understand", "options": [
    {"text": "acceleration", "correct": true}, {"text": "velocity", "correct": false},
    {"text": "time", "correct": false}, {"text": "distance", "correct": false}]}
]}
```"#;

fn answers(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

async fn progress_service(generator: Arc<CountingGenerator>) -> ProgressService {
    let config = Config::test_default();
    ProgressService::new(
        test_db().await,
        AiService::new(generator, config.max_prompt_chars),
    )
}

async fn published_course() -> Course {
    let course = test_course(&unique_id("course"), &unique_id("admin"));
    test_db().await.publish_course(&course).await.unwrap();
    course
}

async fn roster_entry(course: &Course, user_id: &str) -> RosterEntry {
    let roster = test_db()
        .await
        .list_roster(&course.author_id, &course.id)
        .await
        .unwrap();
    roster
        .into_iter()
        .find(|entry| entry.user_id == user_id)
        .expect("roster entry exists")
}

#[tokio::test]
async fn test_apply_twice_conflicts() {
    require_emulator!();

    let service = progress_service(CountingGenerator::new(QUIZ_JSON)).await;
    let course = published_course().await;
    let user = test_user(&unique_id("user"));

    let enrollment = service.apply(&user, &course.id).await.unwrap();
    assert_eq!(enrollment.current_module, 1);
    assert_eq!(enrollment.total_modules, 2);
    assert_eq!(roster_entry(&course, &user.id).await.current_module, 1);

    let err = service.apply(&user, &course.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_quiz_flow_moves_module_and_roster() {
    require_emulator!();

    let generator = CountingGenerator::new(QUIZ_JSON);
    let service = progress_service(generator.clone()).await;
    let db = test_db().await;
    let course = published_course().await;
    let user = test_user(&unique_id("user"));
    service.apply(&user, &course.id).await.unwrap();

    // Only covered modules can be revisited without a quiz.
    let err = service.next(&user, &course.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let quiz = service.generate_quiz(&user, &course.id).await.unwrap();
    assert_eq!(quiz.module, 1);
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(generator.calls(), 1);

    // The pending set is handed out again without another model call.
    let again = service.generate_quiz(&user, &course.id).await.unwrap();
    assert_eq!(again.generated_at, quiz.generated_at);
    assert_eq!(generator.calls(), 1);

    // A retry leaves the module alone and does not rewrite the roster.
    let mut marker = roster_entry(&course, &user.id).await;
    marker.status = "Untouched".to_string();
    db.set_roster_entry(&course.author_id, &course.id, &marker)
        .await
        .unwrap();

    let retry = service
        .submit_quiz(&user, &course.id, &answers(&["Newton", "velocity"]))
        .await
        .unwrap();
    assert_eq!(retry.outcome, QuizOutcome::Retry);
    assert_eq!(retry.current_module, 1);
    assert_eq!(roster_entry(&course, &user.id).await.status, "Untouched");

    let passed = service
        .submit_quiz(&user, &course.id, &answers(&["Newton", "acceleration"]))
        .await
        .unwrap();
    assert_eq!(passed.outcome, QuizOutcome::Advance);
    assert_eq!(passed.current_module, 2);
    let entry = roster_entry(&course, &user.id).await;
    assert_eq!(entry.current_module, 2);
    assert_eq!(entry.status, "In Progress");

    let stored = db.get_enrollment(&user.id, &course.id).await.unwrap().unwrap();
    assert_eq!(stored.module_covered, 2);
    assert!(stored.pending_questions.is_none());
    // Only the passing submission counts toward performance.
    assert_eq!(stored.performance_analysis.correct_answers, 2);
    assert_eq!(stored.performance_analysis.total_questions, 2);

    let back = service.previous(&user, &course.id).await.unwrap();
    assert_eq!(back.current_module, 1);
    assert_eq!(back.attempts, 2);
    assert_eq!(roster_entry(&course, &user.id).await.current_module, 1);

    let forward = service.next(&user, &course.id).await.unwrap();
    assert_eq!(forward.current_module, 2);
    assert_eq!(roster_entry(&course, &user.id).await.current_module, 2);

    // Module 2 has no questions yet.
    let err = service
        .submit_quiz(&user, &course.id, &answers(&["Newton"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_empty_question_set_is_not_stored() {
    require_emulator!();

    let generator = CountingGenerator::new("```json\n{\"questions\": []}\n```");
    let service = progress_service(generator.clone()).await;
    let course = published_course().await;
    let user = test_user(&unique_id("user"));
    service.apply(&user, &course.id).await.unwrap();

    let quiz = service.generate_quiz(&user, &course.id).await.unwrap();
    assert_eq!(quiz.module, 1);
    assert!(quiz.questions.is_empty());

    let stored = test_db()
        .await
        .get_enrollment(&user.id, &course.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.pending_questions.is_none());

    let warning = service
        .record_warning(&user, &course.id, WarningKind::Visibility)
        .await
        .unwrap();
    assert!(!warning.counted);
    assert_eq!(warning.warnings, 0);

    service.generate_quiz(&user, &course.id).await.unwrap();
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_failed_roster_write_keeps_module_change() {
    require_emulator!();

    let service = progress_service(CountingGenerator::new(QUIZ_JSON)).await;
    let db = test_db().await;
    let user = test_user(&unique_id("user"));

    // Document IDs cannot contain '/', so every roster write for this author fails.
    let course = test_course(&unique_id("course"), "no/such-author");
    let mut enrollment = Enrollment::new(&course, NOW);
    enrollment.advance(30, NOW);
    db.set_enrollment(&user.id, &enrollment).await.unwrap();

    let position = service.previous(&user, &course.id).await.unwrap();
    assert_eq!(position.current_module, 1);

    let stored = db.get_enrollment(&user.id, &course.id).await.unwrap().unwrap();
    assert_eq!(stored.current_module, 1);
}
