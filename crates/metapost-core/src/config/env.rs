use metapost_html::MarkdownExtension;

use super::ReaderConfig;

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl ReaderConfig {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("METAPOST_STRICT") {
            match v.parse::<bool>() {
                Ok(strict) => self.strict = strict,
                Err(_) => tracing::warn!("ignoring invalid METAPOST_STRICT value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("METAPOST_MARKDOWN_EXTENSIONS") {
            match split_list(&v)
                .map(str::parse::<MarkdownExtension>)
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(extensions) => self.markdown_extensions = extensions,
                Err(e) => tracing::warn!("ignoring METAPOST_MARKDOWN_EXTENSIONS: {e}"),
            }
        }
        if let Ok(v) = std::env::var("METAPOST_FILE_EXTENSIONS") {
            let extensions: Vec<String> = split_list(&v)
                .map(|s| s.trim_start_matches('.').to_owned())
                .collect();
            if extensions.is_empty() {
                tracing::warn!("ignoring empty METAPOST_FILE_EXTENSIONS");
            } else {
                self.file_extensions = extensions;
            }
        }
    }
}
