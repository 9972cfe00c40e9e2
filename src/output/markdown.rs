//! Markdown summary generation
//!
//! This module renders a human-readable report of a crawl: totals, a table
//! of visited pages, the first page's structured data and the merged content.

use crate::output::summary::CrawlSummary;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown rendering of `summary` to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Gleaner Crawl Summary\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "- **Status**: {}\n",
        if summary.success { "success" } else { "failed" }
    ));
    if let Some(error) = &summary.error_message {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push_str(&format!("- **Total Pages**: {}\n", summary.total_pages));
    md.push_str(&format!(
        "- **Successful Pages**: {}\n",
        summary.successful_pages
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Total Duration**: {} ms\n",
        summary.duration_ms
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    if !summary.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| # | URL | Status | Duration (ms) |\n");
        md.push_str("|---|-----|--------|---------------|\n");
        for (i, page) in summary.pages.iter().enumerate() {
            let status = match (page.success, &page.error_message) {
                (true, _) => "ok".to_string(),
                (false, Some(error)) => format!("failed: {}", error.replace('|', "\\|")),
                (false, None) => "failed".to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                i + 1,
                page.url,
                status,
                page.duration_ms
            ));
        }
        md.push('\n');
    }

    if !summary.structured_data.is_empty() {
        md.push_str("## Structured Data\n\n");
        md.push_str("```json\n");
        let json = serde_json::to_string_pretty(&summary.structured_data)
            .unwrap_or_else(|_| "{}".to_string());
        md.push_str(&json);
        md.push_str("\n```\n\n");
    }

    if !summary.content.is_empty() {
        md.push_str("## Extracted Content\n\n");
        md.push_str(&summary.content);
        md.push_str("\n\n");
    }

    if !summary.links.is_empty() {
        md.push_str("## Links\n\n");
        for link in summary.links.iter().take(50) {
            md.push_str(&format!("- {}\n", link));
        }
        if summary.links.len() > 50 {
            md.push_str(&format!("\n... and {} more\n", summary.links.len() - 50));
        }
        md.push('\n');
    }

    md
}
