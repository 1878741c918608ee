use std::path::PathBuf;

use thiserror::Error;

/// Failure to retrieve a single URL.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid transport configuration: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: PathBuf, source: std::io::Error) -> Self {
        StoreError::Io {
            action,
            path,
            source,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeedError {
    #[error("document has no <channel> element")]
    NotAFeed,
}

/// Errors that abort a whole run. Everything else is logged and skipped.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to fetch feed: {0}")]
    FeedFetch(#[from] FetchError),
    #[error("failed to parse feed: {0}")]
    FeedParse(#[from] FeedError),
}
