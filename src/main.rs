use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use metapost_core::{PostReader, ReaderConfig};

const DEFAULT_CONFIG_PATH: &str = "metapost.toml";

/// Parse meta/content documents and print their meta, HTML, or both.
#[derive(Parser, Debug)]
#[command(name = "metapost", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep meta keys that no schema field declares.
    #[arg(long)]
    lenient: bool,

    /// Recurse into subdirectories of directory arguments.
    #[arg(short, long)]
    walk: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Indent JSON output.
    #[arg(long)]
    pretty: bool,

    /// Files or directories to load, in order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Meta and HTML records.
    Json,
    /// Parsed meta only.
    Meta,
    /// Rendered HTML only, one document per line.
    Html,
}

fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = ReaderConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    if cli.lenient {
        config.strict = false;
    }

    let mut reader = PostReader::with_config(config);
    for path in &cli.paths {
        load_path(&mut reader, path, cli.walk)?;
    }
    tracing::debug!(documents = reader.len(), "all inputs loaded");

    let output = render_output(&reader, cli.format, cli.pretty)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write output")?;
    Ok(())
}

fn load_path(reader: &mut PostReader, path: &Path, walk: bool) -> anyhow::Result<usize> {
    let added = if path.is_dir() {
        reader.read_dir(path, false, walk)
    } else {
        reader.read_file(path, false)
    }
    .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(added)
}

fn render_output(reader: &PostReader, format: Format, pretty: bool) -> anyhow::Result<String> {
    let output = match format {
        Format::Json if pretty => reader.to_json_pretty()?,
        Format::Json => reader.to_json()?,
        Format::Meta => {
            let metas = reader.to_meta()?;
            if pretty {
                serde_json::to_string_pretty(&metas)?
            } else {
                serde_json::to_string(&metas)?
            }
        }
        Format::Html => reader.to_html()?.join("\n"),
    };
    Ok(output)
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("METAPOST_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
