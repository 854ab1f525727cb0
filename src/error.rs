//! Error taxonomy surfaced to the HTTP layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The upload is not declared as `application/pdf`.
    #[error("unsupported file type: {0}")]
    InvalidFileType(String),

    #[error("text extraction failed: {0:#}")]
    Extraction(#[source] anyhow::Error),

    #[error("summarization failed: {0:#}")]
    Summarization(#[source] anyhow::Error),

    /// Combined text rendering is missing its section markers.
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("malformed analysis result: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// True for failures of either remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Summarization(_))
    }
}
