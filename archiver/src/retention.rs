use std::time::{Duration, SystemTime};

use log::{error, info, warn};

use crate::error::StoreError;
use crate::store::{ContentStore, EntryKind};

/// Files untouched for longer than this are deleted (180 days).
pub const RETENTION_WINDOW: Duration = Duration::from_secs(180 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failed: usize,
}

impl PurgeReport {
    fn merge(&mut self, other: PurgeReport) {
        self.deleted += other.deleted;
        self.failed += other.failed;
    }
}

/// Recursively delete every file under `segments` older than `window` at `now`.
///
/// Latest files are not special: a product that has not changed within the
/// window loses its latest copy too.
pub fn purge<S: AsRef<str>>(
    store: &ContentStore,
    segments: &[S],
    window: Duration,
    now: SystemTime,
) -> PurgeReport {
    purge_with(store, segments, window, now, &mut |path: &[String]| {
        store.remove(path)
    })
}

/// [`purge`] with the deletion step supplied by the caller.
pub(crate) fn purge_with<S, R>(
    store: &ContentStore,
    segments: &[S],
    window: Duration,
    now: SystemTime,
    remove: &mut R,
) -> PurgeReport
where
    S: AsRef<str>,
    R: FnMut(&[String]) -> Result<(), StoreError>,
{
    let mut report = PurgeReport::default();
    let dir: Vec<String> = segments.iter().map(|s| s.as_ref().to_string()).collect();

    let children = match store.list(&dir) {
        Ok(children) => children,
        Err(e) => {
            error!("Failed to list {}: {}", store.path(&dir).display(), e);
            report.failed += 1;
            return report;
        }
    };

    for child in children {
        let mut path = dir.clone();
        path.push(child.name.clone());

        match child.kind {
            EntryKind::Dir => report.merge(purge_with(store, &path, window, now, remove)),
            EntryKind::File => {
                // Modification times in the future count as brand new.
                let age = now.duration_since(child.modified).unwrap_or_default();
                if age <= window {
                    continue;
                }

                info!(
                    "Deleting {} ({} days old)...",
                    child.name,
                    age.as_secs() / (24 * 60 * 60)
                );
                match remove(path.as_slice()) {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        warn!("Failed to delete {}: {}", child.name, e);
                        report.failed += 1;
                    }
                }
            }
        }
    }

    report
}
