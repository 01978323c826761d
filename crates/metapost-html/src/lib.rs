//! Markdown rendering and HTML postprocessing for metapost documents.

pub mod error;
pub mod extension;
pub mod links;
pub mod render;

pub use error::HtmlError;
pub use extension::MarkdownExtension;
pub use links::add_link_targets;
pub use render::{CmarkRenderer, HtmlRenderer, render_html};
