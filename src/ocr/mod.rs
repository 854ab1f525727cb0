//! OCR provider abstraction.
//!
//! Defines the [`OcrProvider`] trait and the block type shared by backends, so
//! the Textract client can be swapped for an in-process fake in tests.

pub mod textract;

/// Block granularity reported by the OCR endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Page,
    Line,
    Word,
    Other(String),
}

impl BlockKind {
    pub fn from_str(s: &str) -> Self {
        match s {
            "PAGE" => Self::Page,
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One detected block, in the order the endpoint returned it.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: Option<String>,
}

impl TextBlock {
    #[cfg(test)]
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
        }
    }
}

/// Async trait implemented by each OCR backend.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn detect_blocks(&self, document: &[u8]) -> anyhow::Result<Vec<TextBlock>>;
}

/// Run OCR and join the line-level text with single spaces.
pub async fn extract_text(provider: &dyn OcrProvider, document: &[u8]) -> anyhow::Result<String> {
    let blocks = provider.detect_blocks(document).await?;
    let text = join_lines(&blocks);
    tracing::debug!(
        "{}: {} blocks -> {} chars of line text",
        provider.name(),
        blocks.len(),
        text.len()
    );
    Ok(text)
}

/// Keep `LINE` blocks only, preserving endpoint order.
pub fn join_lines(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Line)
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lines_filters_words() {
        let blocks = vec![
            TextBlock::new(BlockKind::Word, "x"),
            TextBlock::new(BlockKind::Line, "Hello"),
            TextBlock::new(BlockKind::Line, "world"),
        ];
        assert_eq!(join_lines(&blocks), "Hello world");
    }

    #[test]
    fn test_join_lines_preserves_order() {
        let blocks = vec![
            TextBlock::new(BlockKind::Page, ""),
            TextBlock::new(BlockKind::Line, "third"),
            TextBlock::new(BlockKind::Word, "third"),
            TextBlock::new(BlockKind::Line, "first"),
            TextBlock::new(BlockKind::Line, "second"),
        ];
        assert_eq!(join_lines(&blocks), "third first second");
    }

    #[test]
    fn test_join_lines_skips_missing_text() {
        let blocks = vec![
            TextBlock {
                kind: BlockKind::Line,
                text: None,
            },
            TextBlock::new(BlockKind::Line, "only"),
        ];
        assert_eq!(join_lines(&blocks), "only");
    }

    #[test]
    fn test_join_lines_empty() {
        assert_eq!(join_lines(&[]), "");
        assert_eq!(join_lines(&[TextBlock::new(BlockKind::Word, "w")]), "");
    }

    #[test]
    fn test_block_kind_from_str() {
        assert_eq!(BlockKind::from_str("LINE"), BlockKind::Line);
        assert_eq!(BlockKind::from_str("WORD"), BlockKind::Word);
        assert_eq!(
            BlockKind::from_str("KEY_VALUE_SET"),
            BlockKind::Other("KEY_VALUE_SET".to_string())
        );
    }
}
