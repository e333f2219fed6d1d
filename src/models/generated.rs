// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Parsing of model output into course and quiz structures.
//!
//! Model responses are expected to be JSON but frequently arrive wrapped in
//! markdown code fences or surrounded by prose. `extract_json` strips that
//! before deserializing.

use serde::Deserialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::course::CourseModule;
use crate::models::quiz::{BloomLevel, Question, QuizOption, OPTIONS_PER_QUESTION};

/// Errors from interpreting model output.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("response contains no JSON object or array")]
    MissingJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("question {index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("response contains no modules")]
    NoModules,
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::AiResponse(err.to_string())
    }
}

/// Remove a surrounding markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[start + 3..];
    // Skip the language tag on the opening fence line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Locate the JSON payload in a model response.
///
/// The payload is the first complete JSON object or array after the first
/// `{` or `[`; anything following it, brackets included, is ignored.
pub fn extract_json(text: &str) -> Result<&str, ParseError> {
    let body = strip_code_fence(text);
    let open = body.find(['{', '[']).ok_or(ParseError::MissingJson)?;
    let candidate = &body[open..];

    let mut stream =
        serde_json::Deserializer::from_str(candidate).into_iter::<serde::de::IgnoredAny>();
    match stream.next() {
        Some(Ok(_)) => Ok(&candidate[..stream.byte_offset()]),
        Some(Err(e)) => Err(ParseError::InvalidJson(e)),
        None => Err(ParseError::MissingJson),
    }
}

#[derive(Deserialize)]
struct RawOption {
    #[serde(alias = "option", alias = "answer")]
    text: String,
    #[serde(alias = "isCorrect", alias = "is_correct")]
    correct: bool,
}

#[derive(Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<RawOption>,
    #[serde(default, alias = "bloomLevel", alias = "bloom", alias = "level")]
    bloom_level: Option<String>,
}

#[derive(Deserialize)]
struct RawQuestionSet {
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionPayload {
    Wrapped(RawQuestionSet),
    Bare(Vec<RawQuestion>),
}

/// Parse a quiz-generation response.
///
/// An empty `questions` array is valid and yields no questions.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, ParseError> {
    let payload: QuestionPayload = serde_json::from_str(extract_json(text)?)?;
    let raw = match payload {
        QuestionPayload::Wrapped(set) => set.questions,
        QuestionPayload::Bare(list) => list,
    };

    raw.into_iter()
        .enumerate()
        .map(|(index, q)| {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(ParseError::InvalidQuestion {
                    index,
                    reason: format!(
                        "expected {} options, got {}",
                        OPTIONS_PER_QUESTION,
                        q.options.len()
                    ),
                });
            }
            let correct = q.options.iter().filter(|o| o.correct).count();
            if correct != 1 {
                return Err(ParseError::InvalidQuestion {
                    index,
                    reason: format!("expected exactly one correct option, got {correct}"),
                });
            }

            Ok(Question {
                question: q.question.trim().to_string(),
                options: q
                    .options
                    .into_iter()
                    .map(|o| QuizOption {
                        text: o.text.trim().to_string(),
                        is_correct: o.correct,
                    })
                    .collect(),
                bloom_level: q
                    .bloom_level
                    .as_deref()
                    .map(BloomLevel::from_label)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

#[derive(Deserialize)]
struct RawModules {
    modules: Vec<CourseModule>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModulePayload {
    Wrapped(RawModules),
    Bare(Vec<CourseModule>),
}

/// Parse a course-structuring response into modules.
pub fn parse_modules(text: &str) -> Result<Vec<CourseModule>, ParseError> {
    let payload: ModulePayload = serde_json::from_str(extract_json(text)?)?;
    let modules = match payload {
        ModulePayload::Wrapped(m) => m.modules,
        ModulePayload::Bare(list) => list,
    };

    if modules.is_empty() {
        return Err(ParseError::NoModules);
    }
    Ok(modules)
}

/// Model judgement of a free-text answer.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AnswerJudgement {
    pub correct: bool,
    #[serde(default)]
    pub feedback: String,
}

/// Parse an answer-validation response.
pub fn parse_judgement(text: &str) -> Result<AnswerJudgement, ParseError> {
    Ok(serde_json::from_str(extract_json(text)?)?)
}
