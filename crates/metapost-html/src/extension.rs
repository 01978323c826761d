use std::str::FromStr;

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

use crate::HtmlError;

/// Markdown syntax extensions understood by [`crate::CmarkRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownExtension {
    /// Baseline bundle: tables, footnotes, heading attributes and definition lists.
    Extra,
    Tables,
    Footnotes,
    Strikethrough,
    TaskLists,
    SmartPunctuation,
    HeadingAttributes,
    DefinitionLists,
    /// GitHub flavour: tables, strikethrough, task lists and alert blockquotes.
    Gfm,
}

impl MarkdownExtension {
    pub const ALL: [Self; 9] = [
        Self::Extra,
        Self::Tables,
        Self::Footnotes,
        Self::Strikethrough,
        Self::TaskLists,
        Self::SmartPunctuation,
        Self::HeadingAttributes,
        Self::DefinitionLists,
        Self::Gfm,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extra => "extra",
            Self::Tables => "tables",
            Self::Footnotes => "footnotes",
            Self::Strikethrough => "strikethrough",
            Self::TaskLists => "task_lists",
            Self::SmartPunctuation => "smart_punctuation",
            Self::HeadingAttributes => "heading_attributes",
            Self::DefinitionLists => "definition_lists",
            Self::Gfm => "gfm",
        }
    }

    #[must_use]
    pub fn options(self) -> Options {
        match self {
            Self::Extra => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_FOOTNOTES
                    | Options::ENABLE_HEADING_ATTRIBUTES
                    | Options::ENABLE_DEFINITION_LIST
            }
            Self::Tables => Options::ENABLE_TABLES,
            Self::Footnotes => Options::ENABLE_FOOTNOTES,
            Self::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Self::TaskLists => Options::ENABLE_TASKLISTS,
            Self::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
            Self::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
            Self::DefinitionLists => Options::ENABLE_DEFINITION_LIST,
            Self::Gfm => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_GFM
            }
        }
    }

    /// Union of the parser options of every extension in `extensions`.
    #[must_use]
    pub fn combined(extensions: &[Self]) -> Options {
        extensions
            .iter()
            .fold(Options::empty(), |acc, ext| acc | ext.options())
    }
}

impl std::fmt::Display for MarkdownExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkdownExtension {
    type Err = HtmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|ext| ext.as_str() == name)
            .ok_or_else(|| HtmlError::UnknownExtension(s.to_owned()))
    }
}
