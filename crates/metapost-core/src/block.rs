use crate::DocumentError;

pub const FENCE: &str = "```";

/// The two segments a document splits into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Meta,
    Content,
}

impl BlockKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Content => "content",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits `text` into its trimmed `(meta, content)` segments.
///
/// The text must open with a fence. The meta segment ends at the first
/// closing fence; everything after it, further fences included, is content.
///
/// # Errors
///
/// Returns [`DocumentError::Format`] if the text does not start with a fence
/// or the opening fence is never closed.
pub fn split_blocks(text: &str) -> Result<(&str, &str), DocumentError> {
    let text = text.trim();
    let Some(after_open) = text.strip_prefix(FENCE) else {
        return Err(DocumentError::Format(
            "document must start with a ``` fenced meta block".into(),
        ));
    };
    let Some(close) = after_open.find(FENCE) else {
        return Err(DocumentError::Format("unclosed meta block".into()));
    };

    let meta = after_open[..close].trim();
    let content = after_open[close + FENCE.len()..].trim();
    Ok((meta, content))
}

/// Returns one trimmed segment of `text`.
///
/// # Errors
///
/// Returns [`DocumentError::Format`] if `text` is not a two-segment document.
pub fn extract_block(text: &str, kind: BlockKind) -> Result<&str, DocumentError> {
    let (meta, content) = split_blocks(text)?;
    Ok(match kind {
        BlockKind::Meta => meta,
        BlockKind::Content => content,
    })
}
