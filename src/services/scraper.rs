// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Client for the external scraping and search services.
//!
//! Three services are configured by base URL:
//! - link scraping: `GET {scrape}/scrape?url=`
//! - PDF search and PDF-to-text: `GET {pdf}/search?q=`, `POST {pdf}/convert`
//! - video search: `GET {video}/search?q=`

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::Config;
use crate::error::AppError;

/// Scraping/search service client.
#[derive(Clone)]
pub struct ScraperClient {
    http: reqwest::Client,
    scrape_url: String,
    pdf_url: String,
    video_url: String,
}

/// Text scraped from a web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScrapedPage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(alias = "content")]
    pub text: String,
}

/// A search hit from the PDF or video service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(alias = "link")]
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Text converted from one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PdfText {
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// Search responses arrive either wrapped in `{"results": [...]}` or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { results: Vec<SearchHit> },
    Bare(Vec<SearchHit>),
}

impl From<SearchResponse> for Vec<SearchHit> {
    fn from(response: SearchResponse) -> Self {
        match response {
            SearchResponse::Wrapped { results } => results,
            SearchResponse::Bare(hits) => hits,
        }
    }
}

#[derive(Deserialize)]
struct ConvertResponse {
    #[serde(alias = "results")]
    documents: Vec<PdfText>,
}

impl ScraperClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.scraper_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("scraper HTTP client: {}", e)))?;

        Ok(Self {
            http,
            scrape_url: config.scrape_service_url.trim_end_matches('/').to_string(),
            pdf_url: config.pdf_service_url.trim_end_matches('/').to_string(),
            video_url: config.video_search_url.trim_end_matches('/').to_string(),
        })
    }

    /// Scrape the readable text of a web page.
    pub async fn scrape_link(&self, url: &str) -> Result<ScrapedPage, AppError> {
        let response = self
            .http
            .get(format!("{}/scrape", self.scrape_url))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| AppError::Scraper(format!("scrape request failed: {}", e)))?;

        let mut page: ScrapedPage = check_response_json(response).await?;
        if page.url.is_empty() {
            page.url = url.to_string();
        }
        tracing::info!(url, chars = page.text.len(), "Link scraped");
        Ok(page)
    }

    /// Search for PDFs by keyword.
    pub async fn search_pdfs(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        self.search(&self.pdf_url, query).await
    }

    /// Convert a batch of PDF URLs to text.
    pub async fn pdfs_to_text(&self, urls: &[String]) -> Result<Vec<PdfText>, AppError> {
        let response = self
            .http
            .post(format!("{}/convert", self.pdf_url))
            .json(&serde_json::json!({ "urls": urls }))
            .send()
            .await
            .map_err(|e| AppError::Scraper(format!("convert request failed: {}", e)))?;

        let converted: ConvertResponse = check_response_json(response).await?;
        tracing::info!(
            requested = urls.len(),
            converted = converted.documents.len(),
            "PDFs converted"
        );
        Ok(converted.documents)
    }

    /// Search for videos by keyword.
    pub async fn search_videos(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        self.search(&self.video_url, query).await
    }

    async fn search(&self, base_url: &str, query: &str) -> Result<Vec<SearchHit>, AppError> {
        let response = self
            .http
            .get(format!("{}/search", base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| AppError::Scraper(format!("search request failed: {}", e)))?;

        let hits: SearchResponse = check_response_json(response).await?;
        let hits: Vec<SearchHit> = hits.into();
        tracing::debug!(query, hits = hits.len(), "Search completed");
        Ok(hits)
    }
}

async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Scraper(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Scraper(format!("JSON parse error: {}", e)))
}
