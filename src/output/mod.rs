//! Output module for crawl summaries
//!
//! This module handles:
//! - Merging page results into a single [`CrawlSummary`]
//! - Rendering summaries as JSON or markdown
//! - Writing them to a file or standard output

mod markdown;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use summary::{CrawlSummary, PageOutline};

use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Rendering used for a crawl summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// Renders `summary` in the requested format
pub fn render_summary(summary: &CrawlSummary, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Markdown => Ok(format_markdown_summary(summary)),
    }
}

/// Writes the rendered summary to `path`, or to stdout when `path` is None
///
/// # Arguments
///
/// * `summary` - The merged crawl summary
/// * `format` - JSON or markdown
/// * `path` - Destination file; stdout when absent
pub fn write_summary(
    summary: &CrawlSummary,
    format: OutputFormat,
    path: Option<&Path>,
) -> OutputResult<()> {
    let rendered = render_summary(summary, format)?;

    match path {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!("Summary written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
