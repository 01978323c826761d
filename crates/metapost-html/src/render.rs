use pulldown_cmark::{Parser, html};

use crate::MarkdownExtension;
use crate::links::add_link_targets;

/// Turns Markdown into HTML.
///
/// Implementations decide how each [`MarkdownExtension`] maps onto their
/// own feature set; an empty slice asks for plain `CommonMark`.
pub trait HtmlRenderer {
    fn render(&self, markdown: &str, extensions: &[MarkdownExtension]) -> String;
}

/// Default renderer backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkRenderer;

impl HtmlRenderer for CmarkRenderer {
    fn render(&self, markdown: &str, extensions: &[MarkdownExtension]) -> String {
        let options = MarkdownExtension::combined(extensions);
        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
        html::push_html(&mut out, parser);
        out.truncate(out.trim_end().len());
        out
    }
}

impl<R: HtmlRenderer + ?Sized> HtmlRenderer for Box<R> {
    fn render(&self, markdown: &str, extensions: &[MarkdownExtension]) -> String {
        (**self).render(markdown, extensions)
    }
}

/// Renders `markdown` and opens every resulting link in a new tab.
#[must_use]
pub fn render_html<R: HtmlRenderer + ?Sized>(
    markdown: &str,
    renderer: &R,
    extensions: &[MarkdownExtension],
) -> String {
    let html = renderer.render(markdown, extensions);
    tracing::trace!(
        input_bytes = markdown.len(),
        output_bytes = html.len(),
        "rendered markdown"
    );
    add_link_targets(&html)
}
