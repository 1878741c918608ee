use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::FetchError;
use crate::fetch::Fetch;

pub mod fixtures;
pub mod store_tests;

/// In-memory stand-in for the network. URLs are matched without their query string.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, url: &str, body: impl Into<Vec<u8>>) -> &mut Self {
        self.failing.remove(url);
        self.responses.insert(url.to_string(), body.into());
        self
    }

    pub fn fail(&mut self, url: &str) -> &mut Self {
        self.responses.remove(url);
        self.failing.insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let key = url.split('?').next().unwrap_or(url);

        if self.failing.contains(key) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        self.responses
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// 2024-03-01 12:00 UTC, the run time used throughout the tests.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}
