//! PDF analysis pipeline: OCR extraction followed by summarization.

use crate::error::AnalysisError;
use crate::ocr::{self, OcrProvider};
use crate::schema::{AnalysisResult, Document};
use crate::summarizer::Summarizer;
use std::sync::Arc;
use tracing::{error, info};

/// Pipeline orchestrator.
#[derive(Clone)]
pub struct Analyzer {
    ocr: Arc<dyn OcrProvider>,
    summarizer: Summarizer,
}

impl Analyzer {
    pub fn new(ocr: Arc<dyn OcrProvider>, summarizer: Summarizer) -> Self {
        Self { ocr, summarizer }
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Extract the document's text, then summarize it. The document is
    /// assumed to be a PDF already.
    pub async fn analyze(&self, document: &Document) -> Result<AnalysisResult, AnalysisError> {
        info!(
            "Starting analysis for: {} ({} bytes, sha256={}, provider={})",
            document.name,
            document.bytes.len(),
            document.digest(),
            self.ocr.name()
        );

        let full_text = ocr::extract_text(self.ocr.as_ref(), &document.bytes)
            .await
            .map_err(|e| {
                error!("Error analyzing PDF {}: extraction failed: {:#}", document.name, e);
                AnalysisError::Extraction(e)
            })?;

        info!("Extracted {} chars from {}", full_text.len(), document.name);

        let summary = self.summarizer.summarize(&full_text).await.map_err(|e| {
            error!("Error analyzing PDF {}: summarization failed: {:#}", document.name, e);
            AnalysisError::Summarization(e)
        })?;

        info!("Analysis complete for: {}", document.name);

        Ok(AnalysisResult { summary, full_text })
    }
}
