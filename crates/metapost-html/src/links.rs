use std::sync::LazyLock;

use regex::{Captures, Regex};

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a [^>]*href="[^"]*"[^>]*>.*?</a>"#).unwrap());

const TARGET_BLANK: &str = "target=\"_blank\" ";

/// Inserts `target="_blank"` into every `<a … href="…">…</a>` element.
///
/// The attribute lands right after the leading `<a ` token; the rest of the
/// markup is passed through untouched and unvalidated.
#[must_use]
pub fn add_link_targets(html: &str) -> String {
    ANCHOR_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let anchor = &caps[0];
            let mut out = String::with_capacity(anchor.len() + TARGET_BLANK.len());
            out.push_str(&anchor[..3]);
            out.push_str(TARGET_BLANK);
            out.push_str(&anchor[3..]);
            out
        })
        .into_owned()
}
