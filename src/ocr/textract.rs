//! AWS Textract provider (synchronous `DetectDocumentText`).

use super::{BlockKind, OcrProvider, TextBlock};
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::types::{Block, BlockType, Document};
use aws_smithy_types::Blob;
use tracing::info;

pub struct TextractProvider {
    client: aws_sdk_textract::Client,
}

impl TextractProvider {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_textract::Client::new(config),
        }
    }
}

#[async_trait::async_trait]
impl OcrProvider for TextractProvider {
    fn name(&self) -> &str {
        "textract"
    }

    async fn detect_blocks(&self, document: &[u8]) -> anyhow::Result<Vec<TextBlock>> {
        info!("TextractProvider: detecting text in {} bytes", document.len());

        let response = self
            .client
            .detect_document_text()
            .document(Document::builder().bytes(Blob::new(document)).build())
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!("Textract DetectDocumentText failed: {}", DisplayErrorContext(&e))
            })?;

        let blocks: Vec<TextBlock> = response.blocks().iter().map(convert_block).collect();

        info!("TextractProvider: received {} blocks", blocks.len());
        Ok(blocks)
    }
}

fn convert_block(block: &Block) -> TextBlock {
    let kind = match block.block_type() {
        Some(BlockType::Page) => BlockKind::Page,
        Some(BlockType::Line) => BlockKind::Line,
        Some(BlockType::Word) => BlockKind::Word,
        Some(other) => BlockKind::from_str(other.as_str()),
        None => BlockKind::Other(String::new()),
    };

    TextBlock {
        kind,
        text: block.text().map(str::to_string),
    }
}
