use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::archive::{run_stamp, Archiver, CategoryReport};
use crate::config::Settings;
use crate::error::ArchiveError;
use crate::extract::{extract, Category, ProductMatcher};
use crate::feed::{feed_request_url, has_updates, strip_cdata, FeedSnapshot};
use crate::fetch::Fetch;
use crate::retention::{purge, PurgeReport};
use crate::store::ContentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// False when the feed was unchanged and nothing else ran.
    pub updated: bool,
    pub categories: Vec<(Category, CategoryReport)>,
    pub purged: PurgeReport,
}

impl RunReport {
    pub fn archived(&self) -> usize {
        self.categories.iter().map(|(_, report)| report.archived).sum()
    }

    pub fn failed(&self) -> usize {
        self.categories.iter().map(|(_, report)| report.failed).sum()
    }
}

/// One complete archival sweep.
///
/// Only a feed that cannot be fetched or parsed fails the run; product and
/// storage failures are logged and counted in the report.
pub fn run<F: Fetch>(
    settings: &Settings,
    matchers: &[ProductMatcher],
    fetcher: &F,
    store: &ContentStore,
    now: DateTime<Utc>,
) -> Result<RunReport, ArchiveError> {
    let url = feed_request_url(&settings.feed_url, now);
    info!("Fetching feed {}", url);
    let raw = fetcher.fetch(&url)?;
    let data = strip_cdata(&String::from_utf8_lossy(&raw));

    let current = FeedSnapshot::parse(&data)?;
    for title in current.duplicate_titles() {
        warn!("Feed repeats item '{}', only its last description is compared", title);
    }

    let previous = match store.read(&[settings.feed_file.as_str()]) {
        Ok(Some(bytes)) => {
            match FeedSnapshot::parse(&strip_cdata(&String::from_utf8_lossy(&bytes))) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Ignoring unreadable {}: {}", settings.feed_file, e);
                    None
                }
            }
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", settings.feed_file, e);
            None
        }
    };

    if !has_updates(previous.as_ref(), &current) {
        info!("No updates found.");
        return Ok(RunReport::default());
    }

    // Updates found. The snapshot keeps the feed bytes exactly as served.
    if let Err(e) = store.write(&[settings.feed_file.as_str()], &raw) {
        error!("Failed to save feed snapshot: {}", e);
    }

    let stamp = run_stamp(now);
    info!("Writing for {}", stamp);
    let archiver = Archiver::new(fetcher, store, &settings.products_dir, stamp);

    let mut report = RunReport {
        updated: true,
        ..RunReport::default()
    };
    for matcher in matchers {
        let category = matcher.category();
        let references = extract(matcher, &data);
        report
            .categories
            .push((category, archiver.archive(category, references)));
    }

    report.purged = purge(
        store,
        &[settings.products_dir.as_str()],
        settings.retention_window(),
        now.into(),
    );

    info!("Archiving success.");
    Ok(report)
}
