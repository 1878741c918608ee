pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod retention;
pub mod store;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::archive::{run_stamp, Archiver, CategoryReport};
pub use crate::config::{ProxyConfig, Settings, TransportConfig};
pub use crate::error::{ArchiveError, FeedError, FetchError, StoreError};
pub use crate::extract::{extract, sanitize_filename, Category, ProductMatcher, ProductReference};
pub use crate::feed::{feed_request_url, has_updates, strip_cdata, FeedEntry, FeedSnapshot};
pub use crate::fetch::{Fetch, HttpFetcher};
pub use crate::pipeline::{run, RunReport};
pub use crate::retention::{purge, PurgeReport, RETENTION_WINDOW};
pub use crate::store::{ContentStore, EntryKind, StoreEntry};
