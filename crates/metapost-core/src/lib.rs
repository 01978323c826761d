//! Meta/content document parsing and collection management for metapost.

pub mod block;
pub mod config;
pub mod document;
pub mod error;
pub mod fs;
pub mod meta;
pub mod reader;
pub mod schema;

pub use block::{BlockKind, FENCE, extract_block, split_blocks};
pub use config::ReaderConfig;
pub use document::{Document, PostRecord};
pub use error::{DocumentError, ReaderError};
pub use meta::{
    CONTENT_MARKDOWN_KEY, FILENAME_KEY, FILEPATH_KEY, LAST_UPDATE_KEY, ParsedMeta, parse_meta,
};
pub use reader::PostReader;
pub use schema::{Datatype, FieldSpec, MetaValue, cast_named};
