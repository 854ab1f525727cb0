//! Legal-document summarization on top of a [`TextGenerator`].

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub const MAX_TOKENS: u32 = 4096;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 1.0;

/// Text sent by the startup connectivity probe.
pub const PROBE_TEXT: &str = "This is a test document.";

/// Model-agnostic generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// A hosted model that turns a prompt into text.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Embed the document text in the fixed summary instructions.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"Your task is to summarize the following legal document.
Please provide a clear, structured summary that includes:
1. Document type
2. Key parties involved
3. Main terms and conditions
4. Important dates or deadlines
5. Any critical obligations

Document to summarize:
{}

Please format the summary in a clear, organized way."#,
        text
    )
}

#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        let request = GenerationRequest {
            prompt: build_prompt(text),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        };

        debug!("Summarizing {} chars of extracted text", text.len());
        let summary = self.generator.generate(&request).await?;
        info!("Summary generated: {} chars", summary.len());
        Ok(summary)
    }

    /// Round-trip a tiny document to confirm credentials and model access.
    pub async fn probe(&self) -> Result<String> {
        self.summarize(PROBE_TEXT).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeGenerator;
    use super::*;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("Lease between A and B");
        assert!(prompt.contains("Document to summarize:\nLease between A and B\n"));
        assert!(prompt.contains("2. Key parties involved"));
        assert!(prompt.contains("5. Any critical obligations"));
    }

    #[tokio::test]
    async fn test_summarize_uses_fixed_parameters() {
        let generator = Arc::new(FakeGenerator::replying("A lease."));
        let summarizer = Summarizer::new(generator.clone());

        let summary = summarizer.summarize("Lease text").await.unwrap();
        assert_eq!(summary, "A lease.");

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 4096);
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].top_p, 1.0);
        assert_eq!(requests[0].prompt, build_prompt("Lease text"));
    }

    #[tokio::test]
    async fn test_empty_text_still_sends_request() {
        let generator = Arc::new(FakeGenerator::replying("Nothing to summarize."));
        let summarizer = Summarizer::new(generator.clone());

        let summary = summarizer.summarize("").await.unwrap();
        assert_eq!(summary, "Nothing to summarize.");
        assert_eq!(generator.call_count(), 1);

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("Document to summarize:\n\n"));
    }

    #[tokio::test]
    async fn test_generator_error_propagates() {
        let summarizer = Summarizer::new(Arc::new(FakeGenerator::failing()));
        let err = summarizer.summarize("text").await.unwrap_err();
        assert!(err.to_string().contains("AccessDeniedException"));
    }

    #[tokio::test]
    async fn test_probe_sends_fixed_text() {
        let generator = Arc::new(FakeGenerator::replying("ok"));
        let summarizer = Summarizer::new(generator.clone());
        summarizer.probe().await.unwrap();
        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].prompt.contains(PROBE_TEXT));
    }
}
