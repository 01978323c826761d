use metapost_html::MarkdownExtension;
use serde::{Deserialize, Serialize};

use crate::fs::DEFAULT_FILE_EXTENSION;
use crate::schema::FieldSpec;

fn default_strict() -> bool {
    true
}

fn default_markdown_extensions() -> Vec<MarkdownExtension> {
    vec![MarkdownExtension::Extra]
}

fn default_file_extensions() -> Vec<String> {
    vec![DEFAULT_FILE_EXTENSION.to_owned()]
}

/// Parsing and rendering settings shared by every document of a reader.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReaderConfig {
    /// Keep only schema-declared keys from the meta segment.
    #[serde(default = "default_strict")]
    pub strict: bool,
    #[serde(default = "default_markdown_extensions")]
    pub markdown_extensions: Vec<MarkdownExtension>,
    /// Accepted file extensions, without the dot.
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            markdown_extensions: default_markdown_extensions(),
            file_extensions: default_file_extensions(),
            fields: Vec::new(),
        }
    }
}
