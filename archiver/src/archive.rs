use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::extract::{Category, ProductReference};
use crate::fetch::Fetch;
use crate::store::ContentStore;

/// Timestamp prefix for snapshots written during a run, e.g. `2024-03-01-1200`.
pub fn run_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H%M").to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryReport {
    /// References written as a new snapshot plus latest file.
    pub archived: usize,
    /// References whose content matched the latest file.
    pub unchanged: usize,
    /// References that failed to download or store.
    pub failed: usize,
}

enum Outcome {
    Archived,
    Unchanged,
    Failed,
}

/// Downloads products and stores the ones whose content changed.
pub struct Archiver<'a, F: Fetch> {
    fetcher: &'a F,
    store: &'a ContentStore,
    products_dir: &'a str,
    stamp: String,
}

impl<'a, F: Fetch> Archiver<'a, F> {
    pub fn new(
        fetcher: &'a F,
        store: &'a ContentStore,
        products_dir: &'a str,
        stamp: String,
    ) -> Self {
        Archiver {
            fetcher,
            store,
            products_dir,
            stamp,
        }
    }

    /// Archive every reference of one category, one after another.
    /// A failing reference is logged and does not stop the others.
    pub fn archive<I>(&self, category: Category, references: I) -> CategoryReport
    where
        I: IntoIterator<Item = ProductReference>,
    {
        let mut report = CategoryReport::default();
        for reference in references {
            match self.archive_one(category, &reference) {
                Outcome::Archived => report.archived += 1,
                Outcome::Unchanged => report.unchanged += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        info!(
            "{}: {} archived, {} unchanged, {} failed",
            category, report.archived, report.unchanged, report.failed
        );
        report
    }

    fn archive_one(&self, category: Category, reference: &ProductReference) -> Outcome {
        let dir = category.dir_name();
        let name = &reference.derived_filename;
        info!("Archiving {} to {}", reference.source_url, name);

        let content = match self.fetcher.fetch(&reference.source_url) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to download {} product: {}", category, e);
                return Outcome::Failed;
            }
        };

        let latest_name = format!("latest-{}", name);
        let latest = [self.products_dir, dir, latest_name.as_str()];
        match self.store.read(&latest) {
            Ok(Some(previous)) if previous == content => {
                info!("Content of {} is identical. Skipping...", name);
                return Outcome::Unchanged;
            }
            Ok(_) => {}
            Err(e) => warn!("Could not read {}, treating it as absent: {}", latest_name, e),
        }

        let snapshot_name = format!("{}-{}", self.stamp, name);
        let snapshot = [self.products_dir, dir, snapshot_name.as_str()];
        // Snapshots are write-once; another URL with the same file name got here first.
        if self.store.exists(&snapshot) {
            warn!(
                "{} already exists for this run, not replacing it with {}",
                snapshot_name, reference.source_url
            );
            return Outcome::Failed;
        }

        if let Err(e) = self.store.write(&snapshot, &content) {
            error!("Failed to save {}: {}", snapshot_name, e);
            return Outcome::Failed;
        }

        if let Err(e) = self.store.write(&latest, &content) {
            error!(
                "Saved {} but failed to update {}: {}",
                snapshot_name, latest_name, e
            );
            return Outcome::Failed;
        }

        Outcome::Archived
    }
}
