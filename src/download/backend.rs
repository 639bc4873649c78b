use std::time::Duration;

use crate::error::{GrabError, Result};

/// Fetches the raw bytes of a media URL.
///
/// The production implementation is [`HttpFetcher`]; tests substitute
/// scripted fetchers to exercise the fallback chain without a network.
pub trait ByteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher with an explicit per-request timeout.
///
/// A stalled CDN connection must fail the attempt and let the fallback
/// chain progress instead of hanging the whole batch.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GrabError::Network(err.to_string()))?;
        Ok(Self { client })
    }
}

impl ByteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GrabError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(GrabError::Network(format!(
                "unexpected status {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| GrabError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// A facility that can take over a transfer when fetching bytes directly
/// fails: a host download manager, or the in-page click-through of
/// [`crate::browser::ClickThroughBackend`].
///
/// Backends are injected at construction time; the downloader never probes
/// for optional capabilities at the call site.
pub trait DownloadBackend: Send + Sync {
    /// Human-readable backend name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Hand the transfer over, URL and target filename as-is
    fn submit(&self, url: &str, filename: &str) -> Result<()>;
}
