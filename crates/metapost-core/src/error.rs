use std::path::PathBuf;

use crate::schema::Datatype;

/// Failures raised while splitting or parsing a single document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid document structure: {0}")]
    Format(String),

    #[error("required meta '{0}' is missing")]
    MissingRequiredField(String),

    #[error("unable to cast '{value}' to {datatype}")]
    Cast { value: String, datatype: Datatype },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("expected a markdown file: {}", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised by [`crate::PostReader`] around path handling and batches.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: {}", .0.display())]
    WrongExtension(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("failed to load document text: {0}")]
    Text(#[source] DocumentError),

    #[error("failed to parse document, filepath: {filepath}: {source}")]
    Parse {
        filepath: String,
        #[source]
        source: DocumentError,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
