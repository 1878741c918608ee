use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{error, info};

use jtwc_archiver::config::parse_header;
use jtwc_archiver::{run, Category, ContentStore, HttpFetcher, ProxyConfig, Settings};

/// Archive JTWC tropical cyclone products. Run it periodically.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the feed snapshot and the product archive
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Feed to poll
    #[arg(long)]
    feed_url: Option<String>,

    /// HTTP proxy as HOST:PORT
    #[arg(long, value_parser = ProxyConfig::parse)]
    proxy: Option<ProxyConfig>,

    /// Extra request header as "Name: value" (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Delete archived files older than this many days
    #[arg(long)]
    retention_days: Option<u64>,

    /// Only archive these categories: text, gif, prog, jmv (repeatable)
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,
}

fn parse_category(input: &str) -> Result<Category, String> {
    Category::from_dir_name(input).ok_or_else(|| {
        format!(
            "unknown category '{}', expected one of: text, gif, prog, jmv",
            input
        )
    })
}

fn settings(cli: Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(feed_url) = cli.feed_url {
        settings.feed_url = feed_url;
    }
    if let Some(proxy) = cli.proxy {
        settings.transport.proxy = Some(proxy);
    }
    settings.transport.headers.extend(cli.headers);
    if let Some(days) = cli.retention_days {
        settings.retention_days = days;
    }
    if !cli.categories.is_empty() {
        settings.categories = cli.categories;
    }

    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = ContentStore::new(&cli.work_dir);
    let settings = settings(cli)?;
    let matchers = settings.matchers()?;
    let fetcher =
        HttpFetcher::new(&settings.transport).context("Failed to configure HTTP client")?;

    match run(&settings, &matchers, &fetcher, &store, Utc::now()) {
        Ok(report) => {
            if report.updated {
                info!(
                    "{} products archived, {} failed, {} old files purged",
                    report.archived(),
                    report.failed(),
                    report.purged.deleted
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Failed to archive.");
            Err(e).context("Archive run failed")
        }
    }
}
