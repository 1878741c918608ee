use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::{Category, ProductMatcher};

pub const DEFAULT_FEED_URL: &str = "https://www.metoc.navy.mil/jtwc/rss/jtwc.rss";
pub const DEFAULT_FEED_FILE: &str = "jtwc.rss";
pub const DEFAULT_PRODUCTS_DIR: &str = "jtwc_products";
pub const DEFAULT_RETENTION_DAYS: u64 = 180;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    /// Parse `host:port`, as given on the command line.
    pub fn parse(input: &str) -> Result<Self, String> {
        let (host, port) = input
            .rsplit_once(':')
            .ok_or_else(|| format!("expected HOST:PORT, got '{}'", input))?;
        if host.is_empty() {
            return Err(format!("missing proxy host in '{}'", input));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("invalid proxy port '{}'", port))?;
        Ok(ProxyConfig {
            host: host.to_string(),
            port,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// How outbound requests are made. Passed by value into the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    pub proxy: Option<ProxyConfig>,
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            proxy: None,
            headers: BTreeMap::new(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

/// Parse a `Name: value` header given on the command line.
pub fn parse_header(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", input))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", input));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feed_url: String,
    /// Last seen feed document, relative to the working directory.
    pub feed_file: String,
    pub products_dir: String,
    pub retention_days: u64,
    pub categories: Vec<Category>,
    /// Regular expressions replacing the built-in matcher of a category,
    /// keyed by category directory name.
    pub patterns: BTreeMap<String, String>,
    pub transport: TransportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_file: DEFAULT_FEED_FILE.to_string(),
            products_dir: DEFAULT_PRODUCTS_DIR.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            categories: Category::ALL.to_vec(),
            patterns: BTreeMap::new(),
            transport: TransportConfig::default(),
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }

    /// One matcher per configured category, in configuration order.
    pub fn matchers(&self) -> Result<Vec<ProductMatcher>> {
        if let Some(unknown) = self
            .patterns
            .keys()
            .find(|name| Category::from_dir_name(name).is_none())
        {
            bail!("Pattern given for unknown category: {}", unknown);
        }

        self.categories
            .iter()
            .map(|category| match self.patterns.get(category.dir_name()) {
                Some(pattern) => ProductMatcher::new(*category, pattern).with_context(|| {
                    format!("Invalid pattern for category {}: {}", category, pattern)
                }),
                None => Ok(ProductMatcher::default_for(*category)),
            })
            .collect()
    }
}
