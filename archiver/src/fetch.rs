use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Proxy;

use crate::config::TransportConfig;
use crate::error::FetchError;

const USER_AGENT: &str = concat!("jtwc-archiver/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw bytes behind a URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher configured from a [`TransportConfig`].
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(transport: &TransportConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &transport.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Config(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::Config(format!("header value for '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let user_agent = transport.user_agent.as_deref().unwrap_or(USER_AGENT);
        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent);

        if let Some(secs) = transport.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(proxy) = &transport.proxy {
            let proxy = Proxy::all(proxy.url())
                .map_err(|e| FetchError::Config(format!("proxy {}: {}", proxy.url(), e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {}", url);
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        Ok(body.to_vec())
    }
}
