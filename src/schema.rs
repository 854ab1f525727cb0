//! Analysis data types shared by the orchestrator and the presentation layer.

use crate::error::AnalysisError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const PDF_MIME: &str = "application/pdf";

const SUMMARY_HEADER: &str = "Summary:\n";
const FULL_TEXT_MARKER: &str = "\nFull Text:\n";

/// An uploaded file, held for the duration of one request.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// Declared MIME type is `application/pdf` (parameters ignored).
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_MIME))
            .unwrap_or(false)
    }

    /// Hex SHA-256 of the raw bytes, used for log correlation.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }
}

/// Output of one extract → summarize run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub full_text: String,
}

impl AnalysisResult {
    /// Plain-text rendering: `Summary:\n{summary}\n\nFull Text:\n{text}`.
    pub fn to_combined_text(&self) -> String {
        format!(
            "{}{}\n{}{}",
            SUMMARY_HEADER, self.summary, FULL_TEXT_MARKER, self.full_text
        )
    }

    /// Inverse of [`to_combined_text`](Self::to_combined_text). Splits on the
    /// last full-text marker: extracted text is space-joined lines and never
    /// contains a newline, while the summary may quote the marker.
    #[cfg(test)]
    pub fn parse_combined_text(combined: &str) -> Result<Self, AnalysisError> {
        let body = combined.strip_prefix(SUMMARY_HEADER).ok_or_else(|| {
            AnalysisError::MalformedResponse("missing \"Summary:\" header".to_string())
        })?;

        // The marker carries the newline that ends the summary block, so the
        // summary itself ends right before the separating blank line.
        let (summary_part, full_text) = body.rsplit_once(FULL_TEXT_MARKER).ok_or_else(|| {
            AnalysisError::MalformedResponse("missing \"Full Text:\" section".to_string())
        })?;

        let summary = summary_part.strip_suffix('\n').ok_or_else(|| {
            AnalysisError::MalformedResponse("summary block not terminated".to_string())
        })?;

        Ok(Self {
            summary: summary.to_string(),
            full_text: full_text.to_string(),
        })
    }
}

/// What the page shows after a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub summary: String,
    pub extracted_text: String,
    pub file_name: String,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(file_name: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            id: format!("ana_{}", Uuid::new_v4().simple()),
            summary: result.summary,
            extracted_text: result.full_text,
            file_name: file_name.into(),
            completed_at: Utc::now(),
        }
    }
}
