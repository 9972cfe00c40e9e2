//! Gleaner main entry point
//!
//! This is the command-line interface for the Gleaner extraction crawler.

use anyhow::{bail, Context};
use clap::Parser;
use gleaner::config::{load_config_with_hash, Config};
use gleaner::output::{write_summary, CrawlSummary, OutputFormat};
use gleaner::url::LinkFilter;
use gleaner::{CrawlConfig, CrawlMode, FetchStrategy, LlmClientFactory, LlmProvider, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Gleaner: LLM-assisted web extraction
///
/// Gleaner fetches a page (or a bounded set of same-site pages), asks a
/// language model to extract what the prompt describes, and prints the
/// merged result as JSON or markdown.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "LLM-assisted web extraction", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Page to start from
    #[arg(long)]
    url: String,

    /// What the model should extract
    #[arg(long)]
    prompt: String,

    /// Crawl mode: smart, deep, search or custom
    #[arg(long, default_value = "smart")]
    mode: CrawlMode,

    /// Maximum link depth for deep crawls
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages for deep crawls
    #[arg(long)]
    max_pages: Option<usize>,

    /// Model provider (overrides the configured default)
    #[arg(long)]
    provider: Option<LlmProvider>,

    /// Render pages in a headless browser before extraction
    #[arg(long)]
    script: bool,

    /// Follow same-site links (always on for deep mode)
    #[arg(long)]
    follow_links: bool,

    /// Regular expression a link must fully match to be followed
    #[arg(long)]
    link_pattern: Option<String>,

    /// Requests per second during deep crawls
    #[arg(long)]
    rate_limit: Option<f64>,

    /// Narrow the text handed to the model to this CSS selector
    #[arg(long)]
    css_selector: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the resolved crawl without running it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let crawl_config = build_crawl_config(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &crawl_config, &config_hash)?;
    } else {
        handle_crawl(&cli, config, crawl_config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the summary
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges CLI flags over the `[crawl]` defaults
fn build_crawl_config(cli: &Cli, config: &Config) -> anyhow::Result<CrawlConfig> {
    if let Err(e) = url::Url::parse(&cli.url) {
        bail!("Invalid --url {}: {}", cli.url, e);
    }

    let defaults = &config.crawl;
    let mut crawl = CrawlConfig::from_defaults(defaults, cli.url.as_str(), cli.prompt.as_str())
        .with_mode(cli.mode)
        .with_budget(
            cli.max_depth.unwrap_or(defaults.max_depth),
            cli.max_pages.unwrap_or(defaults.max_pages),
        );

    if cli.script {
        crawl = crawl.with_strategy(FetchStrategy::ScriptRendering);
    }
    if cli.follow_links || cli.mode == CrawlMode::Deep {
        crawl = crawl.with_follow_links(true);
    }
    if let Some(pattern) = &cli.link_pattern {
        LinkFilter::compile_pattern(pattern)
            .with_context(|| format!("Invalid --link-pattern {}", pattern))?;
        crawl = crawl.with_link_pattern(pattern.as_str());
    }
    if let Some(rate_limit) = cli.rate_limit {
        if !rate_limit.is_finite() {
            bail!("Invalid --rate-limit {}: must be a finite number", rate_limit);
        }
        crawl = crawl.with_rate_limit(rate_limit);
    }
    if let Some(css_selector) = &cli.css_selector {
        crawl.css_selector = Some(css_selector.clone());
    }
    if let Some(provider) = cli.provider {
        crawl = crawl.with_provider(provider);
    }

    Ok(crawl)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, crawl: &CrawlConfig, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Gleaner Dry Run ===\n");

    println!("Crawl:");
    println!("  URL: {}", crawl.url);
    println!("  Mode: {}", crawl.mode);
    println!("  Prompt: {}", crawl.prompt);
    println!("  Max depth: {}", crawl.max_depth);
    println!("  Max pages: {}", crawl.max_pages);
    println!("  Timeout: {}ms", crawl.timeout_ms);
    println!("  Rate limit: {} req/s", crawl.rate_limit);
    println!("  Strategy: {:?}", crawl.strategy);
    println!("  Follow links: {}", crawl.follow_links);
    if let Some(pattern) = &crawl.link_pattern {
        println!("  Link pattern: {}", pattern);
    }
    if let Some(css_selector) = &crawl.css_selector {
        println!("  CSS selector: {}", css_selector);
    }
    println!("  User agent: {}", crawl.user_agent);
    for (name, value) in &crawl.headers {
        println!("  Header: {}: {}", name, value);
    }

    let provider = crawl.provider.unwrap_or(config.llm.default_provider);
    let settings = config.llm.settings(provider);
    println!("\nModel:");
    println!("  Provider: {}", provider);
    println!(
        "  Model: {}",
        if settings.model_name.is_empty() {
            provider.default_model()
        } else {
            settings.model_name.as_str()
        }
    );
    println!(
        "  Base URL: {}",
        settings
            .base_url
            .as_deref()
            .or(provider.default_base_url())
            .unwrap_or("(not set)")
    );
    println!("  Temperature: {}", settings.temperature);
    println!("  Max tokens: {}", settings.max_tokens);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    cli: &Cli,
    config: Config,
    crawl: CrawlConfig,
    config_hash: String,
) -> anyhow::Result<()> {
    let factory = LlmClientFactory::new(config.llm).context("Failed to build model clients")?;
    let orchestrator =
        Orchestrator::new(Arc::new(factory))?.with_defaults(config.crawl);

    let results = orchestrator.crawl(&crawl).await;
    let summary = CrawlSummary::from_results(&results).with_config_hash(config_hash);

    tracing::info!(
        "Crawl finished: {}/{} pages succeeded in {}ms",
        summary.successful_pages,
        summary.total_pages,
        summary.duration_ms
    );

    write_summary(&summary, cli.format, cli.output.as_deref())?;

    Ok(())
}
