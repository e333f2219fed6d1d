// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Plain-text extraction from uploaded documents.
//!
//! Supported formats:
//! - PDF (text layer only, no OCR)
//! - DOCX (`word/document.xml`, one line per paragraph)
//! - Spreadsheets: XLSX, XLS, ODS (one line per row, tab-separated cells)

use std::io::{Cursor, Read};

use crate::error::AppError;

/// Document formats the ingester understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Spreadsheet,
}

/// Errors from document extraction.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("spreadsheet extraction failed: {0}")]
    Spreadsheet(String),

    #[error("document contains no extractable text")]
    Empty,
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Unsupported(_) => AppError::UnsupportedMedia(err.to_string()),
            IngestError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::Ingestion(err.to_string()),
        }
    }
}

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_CONTENT_TYPE: &str = "application/vnd.ms-excel";
const ODS_CONTENT_TYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

impl DocumentKind {
    /// Pick the format from the file extension, falling back to the content type.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self, IngestError> {
        if let Some(kind) = file_name.and_then(Self::from_extension) {
            return Ok(kind);
        }
        if let Some(kind) = content_type.and_then(Self::from_content_type) {
            return Ok(kind);
        }
        Err(IngestError::Unsupported(
            file_name
                .or(content_type)
                .unwrap_or("unknown")
                .to_string(),
        ))
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        match mime {
            "application/pdf" => Some(Self::Pdf),
            DOCX_CONTENT_TYPE => Some(Self::Docx),
            XLSX_CONTENT_TYPE | XLS_CONTENT_TYPE | ODS_CONTENT_TYPE => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Reject uploads over the configured limit.
pub fn check_size(size: usize, limit: usize) -> Result<(), IngestError> {
    if size > limit {
        return Err(IngestError::TooLarge { size, limit });
    }
    Ok(())
}

/// Extract plain text from a document.
///
/// CPU-bound; callers on the async runtime should use [`extract_text_blocking`].
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, IngestError> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::Spreadsheet => extract_spreadsheet(bytes)?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(text)
}

/// Run [`extract_text`] on the blocking thread pool.
pub async fn extract_text_blocking(kind: DocumentKind, bytes: Vec<u8>) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {}", e)))??;

    tracing::debug!(kind = ?kind, chars = text.len(), "Document text extracted");
    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, IngestError> {
    // The PDF parser can panic on malformed input.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| IngestError::Pdf("malformed document".to_string()))?
        .map_err(|e| IngestError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    use quick_xml::events::Event;

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| IngestError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| IngestError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Docx(e.to_string()))?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => lines.push(std::mem::take(&mut line)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => line.push('\t'),
                b"w:br" => line.push('\n'),
                b"w:p" => lines.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| IngestError::Docx(e.to_string()))?;
                line.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Docx(e.to_string())),
            _ => {}
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

fn extract_spreadsheet(bytes: &[u8]) -> Result<String, IngestError> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

    let mut out = String::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

        out.push_str("# ");
        out.push_str(&name);
        out.push('\n');
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }
    Ok(out)
}
