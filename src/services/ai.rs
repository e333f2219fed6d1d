// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Generative-text API client and the content operations built on it.
//!
//! Handles:
//! - Course structuring (source text -> modules)
//! - Quiz generation for a module
//! - Free-text answer validation
//! - Writing assistance
//!
//! Every operation is a single request with no retry; failures surface to
//! the caller as `AppError::AiService` or `AppError::AiResponse`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::models::course::CourseModule;
use crate::models::generated::{self, AnswerJudgement};
use crate::models::quiz::Question;
use crate::services::prompts;

/// A text-completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the model's text.
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("AI HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.ai_base_url.clone(),
            config.ai_model.clone(),
            config.ai_api_key.clone(),
            config.ai_timeout,
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Calling AI endpoint");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AiService(format!("request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AiService(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiService(format!("invalid response body: {}", e)))?;

        response_text(parsed)
            .ok_or_else(|| AppError::AiResponse("model returned no text".to_string()))
    }
}

/// Content operations over a `TextGenerator`.
#[derive(Clone)]
pub struct AiService {
    generator: Arc<dyn TextGenerator>,
    max_prompt_chars: usize,
}

impl AiService {
    pub fn new(generator: Arc<dyn TextGenerator>, max_prompt_chars: usize) -> Self {
        Self {
            generator,
            max_prompt_chars,
        }
    }

    /// Split source text into course modules.
    pub async fn structure_course(
        &self,
        course_name: &str,
        source_text: &str,
        module_count: u32,
    ) -> Result<Vec<CourseModule>, AppError> {
        let source = prompts::truncate_chars(source_text, self.max_prompt_chars);
        let prompt = prompts::course_structure(course_name, source, module_count);
        let text = self.generator.generate(&prompt).await?;
        let modules = generated::parse_modules(&text)?;

        tracing::info!(
            course = course_name,
            requested = module_count,
            generated = modules.len(),
            "Course structured"
        );
        Ok(modules)
    }

    /// Generate multiple-choice questions for a module.
    pub async fn generate_questions(
        &self,
        module: &CourseModule,
        count: u32,
    ) -> Result<Vec<Question>, AppError> {
        let prompt = prompts::quiz(module, count);
        let text = self.generator.generate(&prompt).await?;
        let questions = generated::parse_questions(&text)?;

        tracing::debug!(
            module = %module.title,
            requested = count,
            generated = questions.len(),
            "Questions generated"
        );
        Ok(questions)
    }

    /// Ask the model whether a free-text answer is correct.
    pub async fn validate_answer(
        &self,
        question: &str,
        answer: &str,
        context: Option<&str>,
    ) -> Result<AnswerJudgement, AppError> {
        let context = context.map(|c| prompts::truncate_chars(c, self.max_prompt_chars));
        let prompt = prompts::answer_validation(question, answer, context);
        let text = self.generator.generate(&prompt).await?;
        Ok(generated::parse_judgement(&text)?)
    }

    /// Rewrite or extend text per an instruction.
    pub async fn assist_writing(&self, instruction: &str, text: &str) -> Result<String, AppError> {
        let text = prompts::truncate_chars(text, self.max_prompt_chars);
        let prompt = prompts::writing_assist(instruction, text);
        let output = self.generator.generate(&prompt).await?;
        Ok(generated::strip_code_fence(&output).to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Generator returning canned responses in order and recording prompts.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<Vec<String>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AppError::AiService("no scripted response".to_string()))
        }
    }

    fn module() -> CourseModule {
        CourseModule {
            title: "Photosynthesis".to_string(),
            concept: "Plants convert light to chemical energy.".to_string(),
            example: "A solar panel charging a battery.".to_string(),
        }
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] } }]
        }))
        .unwrap();
        assert_eq!(response_text(response).as_deref(), Some("{\"a\": 1}"));

        let empty: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(response_text(empty).is_none());
    }

    #[tokio::test]
    async fn test_generate_questions_embeds_module_text() {
        let generator = Arc::new(ScriptedGenerator::new(&["```json\n{\"questions\": []}\n```"]));
        let service = AiService::new(generator.clone(), 1000);

        let questions = service.generate_questions(&module(), 3).await.unwrap();

        assert!(questions.is_empty());
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Photosynthesis"));
        assert!(prompts[0].contains("solar panel"));
    }

    #[tokio::test]
    async fn test_structure_course_rejects_prose() {
        let generator = Arc::new(ScriptedGenerator::new(&["Sorry, I can't do that."]));
        let service = AiService::new(generator, 1000);

        let err = service
            .structure_course("Biology", "Cells and energy", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AiResponse(_)));
    }

    #[tokio::test]
    async fn test_assist_writing_strips_fence() {
        let generator = Arc::new(ScriptedGenerator::new(&["```\nPolished text.\n```"]));
        let service = AiService::new(generator, 1000);

        let output = service
            .assist_writing("Make it formal", "hey there")
            .await
            .unwrap();
        assert_eq!(output, "Polished text.");
    }
}
