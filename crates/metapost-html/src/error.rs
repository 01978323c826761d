#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("unknown markdown extension: {0}")]
    UnknownExtension(String),
}
