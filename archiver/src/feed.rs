use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
}

/// Title/description pairs of a feed document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub entries: Vec<FeedEntry>,
}

/// Feed URL with a cache-busting query parameter.
pub fn feed_request_url(base: &str, now: DateTime<Utc>) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, now.timestamp_millis())
}

/// Unwrap `<![CDATA[...]]>` sections so the markup inside is parsed and scanned
/// like the rest of the document.
pub fn strip_cdata(raw: &str) -> String {
    static CDATA: OnceLock<Regex> = OnceLock::new();
    let cdata = CDATA.get_or_init(|| {
        Regex::new(r"(?is)<!\[CDATA\[(.+?)\]\]>").expect("CDATA regex is valid")
    });
    cdata.replace_all(raw, "$1").into_owned()
}

impl FeedSnapshot {
    pub fn parse(doc: &str) -> Result<FeedSnapshot, FeedError> {
        let document = Html::parse_document(doc);

        let channel_selector = Selector::parse("channel").unwrap();
        if document.select(&channel_selector).next().is_none() {
            return Err(FeedError::NotAFeed);
        }

        let title_selector = Selector::parse("item title").unwrap();
        let entries = document
            .select(&title_selector)
            .map(|title| FeedEntry {
                title: title.text().collect(),
                description: sibling_descriptions(title),
            })
            .collect();

        Ok(FeedSnapshot { entries })
    }

    /// Title to description, where a repeated title keeps its last description.
    pub fn lookup(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|entry| (entry.title.as_str(), entry.description.as_str()))
            .collect()
    }

    /// Titles that occur more than once, in order of first repetition.
    pub fn duplicate_titles(&self) -> Vec<&str> {
        let mut seen = HashMap::new();
        let mut duplicates = Vec::new();
        for entry in &self.entries {
            let count = seen.entry(entry.title.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(entry.title.as_str());
            }
        }
        duplicates
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sibling_descriptions(title: ElementRef) -> String {
    let Some(parent) = title.parent() else {
        return String::new();
    };

    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "description")
        .flat_map(|element| element.text())
        .collect()
}

/// Whether `current` carries anything `previous` did not.
///
/// No previous snapshot means everything is new. Otherwise an entry is new
/// when its title is unknown or its description changed. Entries that only
/// disappeared do not count.
pub fn has_updates(previous: Option<&FeedSnapshot>, current: &FeedSnapshot) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    let old = previous.lookup();
    current
        .lookup()
        .into_iter()
        .any(|(title, description)| old.get(title) != Some(&description))
}
