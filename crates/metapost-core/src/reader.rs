//! Batch loading and export of many documents.

use std::path::{Path, PathBuf};

use metapost_html::{CmarkRenderer, HtmlRenderer, MarkdownExtension};

use crate::config::ReaderConfig;
use crate::document::{Document, PostRecord};
use crate::fs::{check_file, list_files};
use crate::meta::ParsedMeta;
use crate::schema::FieldSpec;
use crate::{DocumentError, ReaderError};

/// An ordered collection of documents sharing one parsing configuration.
///
/// Every `read_*` call is atomic: all of its inputs are checked and parsed
/// before any is added. With `reset` set, only the documents added by that
/// call are kept afterwards.
pub struct PostReader {
    documents: Vec<Document>,
    config: ReaderConfig,
    renderer: Box<dyn HtmlRenderer>,
}

impl std::fmt::Debug for PostReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostReader")
            .field("documents", &self.documents.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PostReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PostReader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            documents: Vec::new(),
            config,
            renderer: Box::new(CmarkRenderer),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Append a field to the schema.
    pub fn add_field(&mut self, field: FieldSpec) -> &mut Self {
        self.config.fields.push(field);
        self
    }

    pub fn set_strict_mode(&mut self, strict: bool) -> &mut Self {
        self.config.strict = strict;
        self
    }

    pub fn set_markdown_extensions(&mut self, extensions: Vec<MarkdownExtension>) -> &mut Self {
        self.config.markdown_extensions = extensions;
        self
    }

    pub fn set_file_extensions(&mut self, extensions: Vec<String>) -> &mut Self {
        self.config.file_extensions = extensions;
        self
    }

    pub fn set_renderer(&mut self, renderer: impl HtmlRenderer + 'static) -> &mut Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Load one document from raw text. Returns the number of documents added.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Text`] if the text is not a valid document.
    pub fn read_text(&mut self, text: &str, reset: bool) -> Result<usize, ReaderError> {
        self.read_texts([text], reset)
    }

    /// Load one document per text.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Text`] for the first invalid text; nothing is added.
    pub fn read_texts<'a>(
        &mut self,
        texts: impl IntoIterator<Item = &'a str>,
        reset: bool,
    ) -> Result<usize, ReaderError> {
        let batch = texts
            .into_iter()
            .map(|text| Document::from_text(text).map_err(ReaderError::Text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.push_batch(batch, reset))
    }

    /// Load one document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::NotFound`] or [`ReaderError::WrongExtension`] before
    /// reading, and [`ReaderError::Load`] if the file is not a valid document.
    pub fn read_file(&mut self, path: impl AsRef<Path>, reset: bool) -> Result<usize, ReaderError> {
        self.read_files([path], reset)
    }

    /// Load one document per file path.
    ///
    /// # Errors
    ///
    /// See [`Self::read_file`]; every path is checked before any file is parsed.
    pub fn read_files<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
        reset: bool,
    ) -> Result<usize, ReaderError> {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        for path in &paths {
            check_file(path, &self.config.file_extensions)?;
        }
        let batch = load_files(&paths)?;
        Ok(self.push_batch(batch, reset))
    }

    /// Load every accepted file in `dir`, recursing into subdirectories when
    /// `walk` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::NotADirectory`] for a missing directory and
    /// [`ReaderError::Load`] for the first invalid file; nothing is added.
    pub fn read_dir(
        &mut self,
        dir: impl AsRef<Path>,
        reset: bool,
        walk: bool,
    ) -> Result<usize, ReaderError> {
        let dir = dir.as_ref();
        let paths = list_files(dir, &self.config.file_extensions, walk)?;
        tracing::info!(dir = %dir.display(), files = paths.len(), walk, "reading directory");
        let batch = load_files(&paths)?;
        Ok(self.push_batch(batch, reset))
    }

    fn push_batch(&mut self, batch: Vec<Document>, reset: bool) -> usize {
        let added = batch.len();
        self.documents.extend(batch);
        if reset {
            self.retain_latest(added);
        }
        tracing::debug!(added, total = self.documents.len(), reset, "documents loaded");
        added
    }

    /// Drop all but the `n` most recently added documents.
    pub fn retain_latest(&mut self, n: usize) {
        let excess = self.documents.len().saturating_sub(n);
        self.documents.drain(..excess);
    }

    /// Parse the meta of every document, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Parse`] naming the first document that fails.
    pub fn to_meta(&self) -> Result<Vec<ParsedMeta>, ReaderError> {
        self.documents
            .iter()
            .map(|doc| {
                doc.to_meta(&self.config.fields, self.config.strict)
                    .map_err(|source| parse_error(doc, source))
            })
            .collect()
    }

    /// Render the content of every document, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Parse`] naming the first document that fails.
    pub fn to_html(&self) -> Result<Vec<String>, ReaderError> {
        self.documents
            .iter()
            .map(|doc| {
                doc.to_html(&*self.renderer, &self.config.markdown_extensions)
                    .map_err(|source| parse_error(doc, source))
            })
            .collect()
    }

    /// Meta and HTML of every document, paired up.
    ///
    /// # Errors
    ///
    /// See [`Self::to_meta`] and [`Self::to_html`].
    pub fn to_dict(&self) -> Result<Vec<PostRecord>, ReaderError> {
        let metas = self.to_meta()?;
        let htmls = self.to_html()?;
        Ok(metas
            .into_iter()
            .zip(htmls)
            .map(|(meta, html)| PostRecord { meta, html })
            .collect())
    }

    /// [`Self::to_dict`] as a compact JSON array.
    ///
    /// # Errors
    ///
    /// See [`Self::to_dict`].
    pub fn to_json(&self) -> Result<String, ReaderError> {
        Ok(serde_json::to_string(&self.to_dict()?)?)
    }

    /// [`Self::to_dict`] as an indented JSON array.
    ///
    /// # Errors
    ///
    /// See [`Self::to_dict`].
    pub fn to_json_pretty(&self) -> Result<String, ReaderError> {
        Ok(serde_json::to_string_pretty(&self.to_dict()?)?)
    }
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<Document>, ReaderError> {
    paths
        .iter()
        .map(|path| {
            Document::read_file(path).map_err(|source| ReaderError::Load {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

fn parse_error(doc: &Document, source: DocumentError) -> ReaderError {
    let filepath = doc.source_label();
    tracing::debug!(%filepath, error = %source, "document export failed");
    ReaderError::Parse { filepath, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{FILENAME_KEY, FILEPATH_KEY, LAST_UPDATE_KEY};
    use crate::schema::{Datatype, MetaValue};

    const TEXT: &str = "```key:val``` some content";
    const POST_1: &str = "```\ntitle: A mock post\nsubtitle: Gossips-01\non_index: true\nindex: 99\n```\n\nsome content\n";
    const POST_2: &str = "```\ntitle: Another post\nindex: 3\n```\n\nSee [docs](http://example.com).\n";

    struct Mocks {
        dir: tempfile::TempDir,
    }

    impl Mocks {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("post_1.md"), POST_1).unwrap();
            std::fs::write(dir.path().join("post_2.md"), POST_2).unwrap();
            std::fs::write(dir.path().join("readme.txt"), "not a post").unwrap();
            let bad = dir.path().join("bad_format");
            std::fs::create_dir(&bad).unwrap();
            std::fs::write(bad.join("post_99.md"), "no fence").unwrap();
            Self { dir }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }
    }

    #[test]
    fn defaults() {
        let reader = PostReader::new();
        assert!(reader.is_empty());
        assert!(reader.config().strict);
        assert_eq!(reader.config().markdown_extensions, vec![MarkdownExtension::Extra]);
    }

    #[test]
    fn setters() {
        let mut reader = PostReader::new();
        reader
            .set_markdown_extensions(Vec::new())
            .set_strict_mode(false)
            .add_field(FieldSpec::required("title", Datatype::Str).with_default("Undefined Post"));
        assert!(reader.config().markdown_extensions.is_empty());
        assert!(!reader.config().strict);
        assert_eq!(
            reader.config().fields,
            vec![FieldSpec::required("title", Datatype::Str).with_default("Undefined Post")]
        );
    }

    #[test]
    fn retain_latest_zero_clears() {
        let mut reader = PostReader::new();
        reader.read_text(TEXT, false).unwrap();
        reader.read_text(TEXT, false).unwrap();
        reader.retain_latest(0);
        assert_eq!(reader.len(), 0);

        for _ in 0..3 {
            reader.read_text(TEXT, false).unwrap();
        }
        reader.retain_latest(2);
        assert_eq!(reader.len(), 2);

        reader.retain_latest(5);
        assert_eq!(reader.len(), 2);
    }

    #[test]
    fn read_text_reset_keeps_last() {
        let mut reader = PostReader::new();
        reader.read_text(TEXT, false).unwrap();
        reader.read_text(TEXT, false).unwrap();
        assert_eq!(reader.len(), 2);
        reader.read_text("```key:last``` x", true).unwrap();
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.documents()[0].source_text(), "```key:last``` x");
    }

    #[test]
    fn read_texts_is_atomic() {
        let mut reader = PostReader::new();
        let err = reader.read_texts([TEXT, "broken", TEXT], false).unwrap_err();
        assert!(matches!(err, ReaderError::Text(DocumentError::Format(_))));
        assert!(reader.is_empty());

        assert_eq!(reader.read_texts([TEXT, TEXT], false).unwrap(), 2);
    }

    #[test]
    fn read_file_and_reset() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        for _ in 0..3 {
            reader.read_file(mocks.path("post_1.md"), false).unwrap();
        }
        assert_eq!(reader.len(), 3);
        reader.read_file(mocks.path("post_1.md"), true).unwrap();
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn read_file_path_checks() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        assert!(matches!(
            reader.read_file(mocks.path("missing.md"), false),
            Err(ReaderError::NotFound(_))
        ));
        assert!(matches!(
            reader.read_file(mocks.path("readme.txt"), false),
            Err(ReaderError::WrongExtension(_))
        ));
        assert!(matches!(
            reader.read_file(mocks.path("bad_format/post_99.md"), false),
            Err(ReaderError::Load { source: DocumentError::Format(_), .. })
        ));
        assert!(reader.is_empty());
    }

    #[test]
    fn read_files_checks_all_paths_first() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        let err = reader
            .read_files([mocks.path("post_1.md"), mocks.path("missing.md")], false)
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(ref p) if p.ends_with("missing.md")));
        assert!(reader.is_empty());
    }

    #[test]
    fn custom_file_extensions() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        reader.set_file_extensions(vec!["txt".into()]);
        assert!(matches!(
            reader.read_file(mocks.path("post_1.md"), false),
            Err(ReaderError::WrongExtension(_))
        ));
    }

    #[test]
    fn read_dir_flat_and_reset() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        reader.read_text(TEXT, false).unwrap();
        reader.read_text(TEXT, false).unwrap();

        assert_eq!(reader.read_dir(mocks.dir.path(), false, false).unwrap(), 2);
        assert_eq!(reader.len(), 4);

        reader.read_dir(mocks.dir.path(), true, false).unwrap();
        assert_eq!(reader.len(), 2);
        assert!(reader.documents().iter().all(|d| d.filepath().is_some()));
    }

    #[test]
    fn read_dir_reset_keeps_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.md", "b.md", "c.md"] {
            std::fs::write(dir.path().join(name), TEXT).unwrap();
        }
        let mut reader = PostReader::new();
        reader.read_text(TEXT, false).unwrap();
        reader.read_dir(dir.path(), true, false).unwrap();
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn read_empty_dir_with_reset_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = PostReader::new();
        reader.read_text(TEXT, false).unwrap();
        assert_eq!(reader.read_dir(dir.path(), true, false).unwrap(), 0);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_dir_walk_is_atomic() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        let err = reader.read_dir(mocks.dir.path(), false, true).unwrap_err();
        assert!(matches!(err, ReaderError::Load { ref path, .. } if path.ends_with("post_99.md")));
        assert!(reader.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn read_dir_walk_survives_link_to_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), TEXT).unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::os::unix::fs::symlink(dir.path(), sub.join("back")).unwrap();

        let mut reader = PostReader::new();
        assert_eq!(reader.read_dir(dir.path(), false, true).unwrap(), 1);
        assert_eq!(reader.documents()[0].filepath(), Some(dir.path().join("a.md").as_path()));
    }

    #[test]
    fn read_missing_dir() {
        let mut reader = PostReader::new();
        assert!(matches!(
            reader.read_dir("/nonexistent/dir", false, false),
            Err(ReaderError::NotADirectory(_))
        ));
    }

    #[test]
    fn to_meta_wraps_filepath() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        reader.add_field(FieldSpec::required("missing_key", Datatype::Str));
        reader.read_file(mocks.path("post_1.md"), false).unwrap();

        let err = reader.to_meta().unwrap_err();
        match err {
            ReaderError::Parse { filepath, source } => {
                assert_eq!(filepath, mocks.path("post_1.md").display().to_string());
                assert!(matches!(source, DocumentError::MissingRequiredField(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn to_meta_text_document_label() {
        let mut reader = PostReader::new();
        reader.add_field(FieldSpec::required("index", Datatype::Int));
        reader.read_text("```index: many``` body", false).unwrap();
        let err = reader.to_meta().unwrap_err();
        assert!(matches!(err, ReaderError::Parse { ref filepath, .. } if filepath == "<text>"));
    }

    #[test]
    fn exports() {
        let mocks = Mocks::new();
        let path = mocks.path("post_1.md");
        let mut reader = PostReader::new();
        reader.add_field(FieldSpec::required("title", Datatype::Str));
        reader.read_file(&path, false).unwrap();

        let metas = reader.to_meta().unwrap();
        assert_eq!(metas.len(), 1);
        let meta = &metas[0];
        assert_eq!(meta["title"], MetaValue::from("A mock post"));
        assert_eq!(meta[FILEPATH_KEY], MetaValue::from(path.display().to_string()));
        assert_eq!(meta[FILENAME_KEY], MetaValue::from("post_1"));
        assert!(meta.contains_key(LAST_UPDATE_KEY));
        assert!(!meta.contains_key("subtitle"));

        assert_eq!(reader.to_html().unwrap(), vec!["<p>some content</p>".to_owned()]);

        let dicts = reader.to_dict().unwrap();
        assert_eq!(
            dicts,
            vec![PostRecord {
                meta: meta.clone(),
                html: "<p>some content</p>".into(),
            }]
        );

        let parsed: Vec<PostRecord> = serde_json::from_str(&reader.to_json().unwrap()).unwrap();
        assert_eq!(parsed, dicts);
        let pretty: Vec<PostRecord> =
            serde_json::from_str(&reader.to_json_pretty().unwrap()).unwrap();
        assert_eq!(pretty, dicts);
    }

    #[test]
    fn html_links_open_in_new_tab() {
        let mocks = Mocks::new();
        let mut reader = PostReader::new();
        reader.read_file(mocks.path("post_2.md"), false).unwrap();
        assert_eq!(
            reader.to_html().unwrap(),
            vec![r#"<p>See <a target="_blank" href="http://example.com">docs</a>.</p>"#.to_owned()]
        );
    }

    #[test]
    fn custom_renderer_is_used() {
        struct Raw;
        impl HtmlRenderer for Raw {
            fn render(&self, markdown: &str, _: &[MarkdownExtension]) -> String {
                markdown.to_owned()
            }
        }

        let mut reader = PostReader::new();
        reader.set_renderer(Raw);
        reader.read_text("```a: b``` *raw*", false).unwrap();
        assert_eq!(reader.to_html().unwrap(), vec!["*raw*".to_owned()]);
    }
}
