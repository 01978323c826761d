//! Schema-driven parsing of the meta segment.
//!
//! Parsing runs in four passes: tokenize `key: value` lines, drop keys the
//! schema does not declare (strict mode only), merge in the system keys, and
//! finally apply the schema's required/default rules and type coercion.

use std::collections::{BTreeMap, HashSet};

use crate::DocumentError;
use crate::schema::{FieldSpec, MetaValue};

pub const FILEPATH_KEY: &str = "_filepath_";
pub const FILENAME_KEY: &str = "_filename_";
pub const LAST_UPDATE_KEY: &str = "_last_update_";
pub const CONTENT_MARKDOWN_KEY: &str = "_content_markdown_";

/// Typed meta of one document, keyed by field name.
pub type ParsedMeta = BTreeMap<String, MetaValue>;

/// Reads `key: value` pairs from the meta segment.
///
/// A line counts when its first colon is directly preceded (spaces allowed)
/// by a run of word characters and followed by a non-blank value. The key is
/// that run, so `- title: x` yields `title`. Other lines are skipped. Later
/// duplicates win.
#[must_use]
pub fn tokenize(meta: &str) -> BTreeMap<String, String> {
    meta.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let (head, value) = line.split_once(':')?;
    let head = head.trim_end();
    let start = head
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word_char(c))
        .last()
        .map(|(i, _)| i)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((head[start..].to_owned(), value.to_owned()))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parses a meta segment against `schema`.
///
/// `predefined` holds the system keys of the owning document; together with
/// `_content_markdown_` (set to `content`) they override raw keys of the same
/// name. Strict filtering runs before that merge, so system keys always
/// survive.
///
/// # Errors
///
/// Returns [`DocumentError::MissingRequiredField`] for an absent required key
/// and [`DocumentError::Cast`] when a present value does not fit its datatype.
pub fn parse_meta(
    meta: &str,
    content: &str,
    predefined: &BTreeMap<String, String>,
    schema: &[FieldSpec],
    strict: bool,
) -> Result<ParsedMeta, DocumentError> {
    let mut raw = tokenize(meta);

    if strict {
        let expected: HashSet<&str> = schema.iter().map(|f| f.key.as_str()).collect();
        raw.retain(|key, _| expected.contains(key.as_str()));
    }

    raw.extend(predefined.iter().map(|(k, v)| (k.clone(), v.clone())));
    raw.insert(CONTENT_MARKDOWN_KEY.to_owned(), content.to_owned());

    let mut result = ParsedMeta::new();
    for field in schema {
        match raw.remove(&field.key) {
            Some(value) => {
                let typed = field.datatype.cast(&value)?;
                result.insert(field.key.clone(), typed);
            }
            None if field.required && !result.contains_key(&field.key) => {
                return Err(DocumentError::MissingRequiredField(field.key.clone()));
            }
            None => {
                if let Some(default) = &field.default
                    && !result.contains_key(&field.key)
                {
                    result.insert(field.key.clone(), default.clone());
                }
            }
        }
    }

    result.extend(raw.into_iter().map(|(k, v)| (k, MetaValue::Str(v))));
    Ok(result)
}
