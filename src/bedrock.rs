//! Bedrock runtime client for Anthropic Claude models.

use crate::summarizer::{GenerationRequest, TextGenerator};
use anyhow::{Context, Result};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_smithy_types::Blob;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock client bound to a single model id.
#[derive(Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockClient {
    pub fn new(config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
            model_id: model_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for BedrockClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = encode_request(request)?;
        debug!(
            "Sending request to Bedrock: model={} ({} bytes)",
            self.model_id,
            body.len()
        );

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Bedrock InvokeModel failed: {}", DisplayErrorContext(&e)))?;

        let parsed = decode_response(response.body().as_ref())?;

        if let Some(usage) = &parsed.usage {
            info!(
                "Bedrock response: {} input tokens, {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(parsed.text())
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    messages: Vec<InvokeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct InvokeMessage<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl InvokeResponse {
    fn text(self) -> String {
        self.content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect()
    }
}

fn encode_request(request: &GenerationRequest) -> Result<Vec<u8>> {
    let payload = InvokeRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        messages: vec![InvokeMessage {
            role: "user",
            content: vec![ContentBlock {
                kind: "text",
                text: &request.prompt,
            }],
        }],
    };
    serde_json::to_vec(&payload).context("Failed to serialize Bedrock request")
}

fn decode_response(body: &[u8]) -> Result<InvokeResponse> {
    serde_json::from_slice(body).context("Failed to parse Bedrock response")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            top_p: 1.0,
        }
    }

    #[test]
    fn test_encode_request_shape() {
        let body = encode_request(&request("Summarize this")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["top_p"], 1.0);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][0]["text"], "Summarize this");
    }

    #[test]
    fn test_encode_empty_prompt() {
        let body = encode_request(&request("")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["text"], "");
    }

    #[test]
    fn test_decode_joins_text_blocks() {
        let body = br#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Summary: "},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "simple agreement."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 5}
        }"#;
        let parsed = decode_response(body).unwrap();
        assert_eq!(parsed.usage.as_ref().unwrap().output_tokens, 5);
        assert_eq!(parsed.text(), "Summary: simple agreement.");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_response(b"not json").is_err());
        assert!(decode_response(br#"{"completion": "legacy"}"#).is_err());
    }
}
