use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use metapost_html::{HtmlRenderer, MarkdownExtension, render_html};
use serde::{Deserialize, Serialize};

use crate::DocumentError;
use crate::block::{BlockKind, extract_block, split_blocks};
use crate::fs::{DEFAULT_FILE_EXTENSION, has_extension, last_update};
use crate::meta::{FILENAME_KEY, FILEPATH_KEY, LAST_UPDATE_KEY, ParsedMeta, parse_meta};
use crate::schema::FieldSpec;

/// Label used in diagnostics for documents that were not read from a file.
pub const TEXT_SOURCE: &str = "<text>";

/// Meta and rendered HTML of one document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostRecord {
    pub meta: ParsedMeta,
    pub html: String,
}

/// One meta/content document, validated at load time.
#[derive(Debug, Clone)]
pub struct Document {
    source_text: String,
    filepath: Option<PathBuf>,
    predefined_meta: BTreeMap<String, String>,
    content_markdown: OnceCell<String>,
}

impl Document {
    /// Builds a document from raw text. No system keys are attached.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Format`] if the text lacks a fenced meta block.
    pub fn from_text(text: &str) -> Result<Self, DocumentError> {
        let source_text = text.trim();
        split_blocks(source_text)?;
        Ok(Self {
            source_text: source_text.to_owned(),
            filepath: None,
            predefined_meta: BTreeMap::new(),
            content_markdown: OnceCell::new(),
        })
    }

    /// Reads a markdown file and attaches its path, name and modification time.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] for a missing file,
    /// [`DocumentError::UnsupportedExtension`] for a non-`.md` path, an IO error
    /// if reading fails, or [`DocumentError::Format`] for malformed content.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }
        if !has_extension(path, &[DEFAULT_FILE_EXTENSION]) {
            return Err(DocumentError::UnsupportedExtension(path.to_path_buf()));
        }
        Self::read_file(path)
    }

    /// Reads `path` without checking its extension.
    pub(crate) fn read_file(path: &Path) -> Result<Self, DocumentError> {
        let raw = std::fs::read_to_string(path)?;
        let source_text = raw.trim();
        split_blocks(source_text)
            .map_err(|e| DocumentError::Format(format!("{}: {e}", path.display())))?;

        let mut predefined_meta = BTreeMap::new();
        predefined_meta.insert(FILEPATH_KEY.to_owned(), path.display().to_string());
        predefined_meta.insert(
            FILENAME_KEY.to_owned(),
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        predefined_meta.insert(LAST_UPDATE_KEY.to_owned(), last_update(path)?);

        tracing::debug!(path = %path.display(), bytes = source_text.len(), "loaded document");
        Ok(Self {
            source_text: source_text.to_owned(),
            filepath: Some(path.to_path_buf()),
            predefined_meta,
            content_markdown: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// File path for diagnostics, or a fixed label for text documents.
    #[must_use]
    pub fn source_label(&self) -> String {
        self.filepath
            .as_ref()
            .map_or_else(|| TEXT_SOURCE.to_owned(), |p| p.display().to_string())
    }

    /// System keys derived from the file this document was read from.
    #[must_use]
    pub fn predefined_meta(&self) -> &BTreeMap<String, String> {
        &self.predefined_meta
    }

    /// The trimmed meta segment.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Format`] if the source no longer splits.
    pub fn meta_block(&self) -> Result<&str, DocumentError> {
        extract_block(&self.source_text, BlockKind::Meta)
    }

    /// The trimmed content segment, computed once and cached.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Format`] if the source no longer splits.
    pub fn content_markdown(&self) -> Result<&str, DocumentError> {
        if let Some(content) = self.content_markdown.get() {
            return Ok(content);
        }
        let content = extract_block(&self.source_text, BlockKind::Content)?.to_owned();
        Ok(self.content_markdown.get_or_init(|| content))
    }

    /// Parses the meta segment against `schema`.
    ///
    /// # Errors
    ///
    /// Propagates [`DocumentError::MissingRequiredField`] and
    /// [`DocumentError::Cast`] from [`parse_meta`].
    pub fn to_meta(&self, schema: &[FieldSpec], strict: bool) -> Result<ParsedMeta, DocumentError> {
        let content = self.content_markdown()?;
        parse_meta(
            self.meta_block()?,
            content,
            &self.predefined_meta,
            schema,
            strict,
        )
    }

    /// Renders the content segment and opens its links in a new tab.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Format`] if the source no longer splits.
    pub fn to_html(
        &self,
        renderer: &dyn HtmlRenderer,
        extensions: &[MarkdownExtension],
    ) -> Result<String, DocumentError> {
        Ok(render_html(self.content_markdown()?, renderer, extensions))
    }

    /// Meta and HTML together.
    ///
    /// # Errors
    ///
    /// See [`Self::to_meta`] and [`Self::to_html`].
    pub fn to_dict(
        &self,
        schema: &[FieldSpec],
        strict: bool,
        renderer: &dyn HtmlRenderer,
        extensions: &[MarkdownExtension],
    ) -> Result<PostRecord, DocumentError> {
        Ok(PostRecord {
            meta: self.to_meta(schema, strict)?,
            html: self.to_html(renderer, extensions)?,
        })
    }

    /// [`Self::to_dict`] serialized as JSON.
    ///
    /// # Errors
    ///
    /// See [`Self::to_dict`]; also fails if serialization fails.
    pub fn to_json(
        &self,
        schema: &[FieldSpec],
        strict: bool,
        renderer: &dyn HtmlRenderer,
        extensions: &[MarkdownExtension],
    ) -> Result<String, DocumentError> {
        let record = self.to_dict(schema, strict, renderer, extensions)?;
        Ok(serde_json::to_string(&record)?)
    }
}
