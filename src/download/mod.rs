//! Download pipeline.
//!
//! A transfer walks a layered fallback chain: fetch the bytes and write
//! them under the generated filename, then an optional host-provided
//! backend, then the last-resort backend (in practice the in-page
//! click-through). Video URLs first retry the fetch stage across an ordered
//! list of alternate CDN URLs, because the URL visible in the DOM is
//! frequently not the one that serves the bytes. Bulk operations run
//! sequentially with a fixed stagger as self-imposed backpressure.

mod backend;

pub use backend::{ByteFetcher, DownloadBackend, HttpFetcher};

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::error::{GrabError, Result};
use crate::media::{
    alternative_video_urls, extension_from_url, is_video_url, normalize, MediaCollection,
};
use crate::naming::filename_at;
use crate::post::PostContext;

/// One pending transfer. Created per media candidate at download time and
/// discarded after the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub filename: String,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self { url: url.into(), filename: filename.into() }
    }
}

/// Tuning for the download pipeline
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory fetched files are written to
    pub out_dir: PathBuf,

    /// Per-request timeout of the fetch stage
    pub timeout: Duration,

    /// Pause between tasks of a bulk operation
    pub stagger: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            timeout: Duration::from_secs(30),
            stagger: Duration::from_millis(800),
        }
    }
}

impl DownloadConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), ..Self::default() }
    }

    /// Builder method: set the fetch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method: set the bulk stagger
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }
}

/// Outcome counts of a bulk operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Executes transfers through the fallback chain
pub struct Downloader {
    fetcher: Box<dyn ByteFetcher>,
    secondary: Option<Box<dyn DownloadBackend>>,
    last_resort: Option<Box<dyn DownloadBackend>>,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout)?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    /// Construct with an explicit fetch stage
    pub fn with_fetcher(config: DownloadConfig, fetcher: Box<dyn ByteFetcher>) -> Self {
        Self { fetcher, secondary: None, last_resort: None, config }
    }

    /// Builder method: inject a host-provided download facility
    pub fn secondary(mut self, backend: Box<dyn DownloadBackend>) -> Self {
        self.secondary = Some(backend);
        self
    }

    /// Builder method: inject the last-resort backend
    pub fn last_resort(mut self, backend: Box<dyn DownloadBackend>) -> Self {
        self.last_resort = Some(backend);
        self
    }

    /// Run one transfer through the chain.
    ///
    /// Each stage is tried only after the previous one failed; only
    /// exhausting every stage for every candidate URL is an error.
    pub fn download(&self, task: &DownloadTask) -> Result<()> {
        // display decorations must never reach the wire
        let url = normalize(&task.url);

        if is_video_url(&url) {
            let candidates = alternative_video_urls(&url);
            for candidate in &candidates {
                match self.fetch_to_disk(candidate, &task.filename) {
                    Ok(()) => return Ok(()),
                    Err(err) => {
                        log::debug!("fetch failed for candidate {candidate}: {err}");
                    }
                }
            }
            log::warn!(
                "all {} fetch candidates failed for '{}', trying backends",
                candidates.len(),
                task.filename
            );
            return self.submit_to_backends(&candidates[0], &task.filename);
        }

        match self.fetch_to_disk(&url, &task.filename) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("fetch failed for '{}': {err}, trying backends", task.filename);
                self.submit_to_backends(&url, &task.filename)
            }
        }
    }

    /// Bulk transfer with stagger. Per-task failures are logged and
    /// counted; the sequence always runs to completion.
    pub fn download_all(&self, tasks: &[DownloadTask]) -> BulkReport {
        let mut report = BulkReport::default();
        for (i, task) in tasks.iter().enumerate() {
            if i > 0 && !self.config.stagger.is_zero() {
                thread::sleep(self.config.stagger);
            }
            match self.download(task) {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    log::warn!("download failed for '{}': {err}", task.filename);
                    report.failed += 1;
                }
            }
        }
        report
    }

    fn fetch_to_disk(&self, url: &str, filename: &str) -> Result<()> {
        let bytes = self.fetcher.fetch(url)?;
        fs::create_dir_all(&self.config.out_dir)?;
        let path = self.config.out_dir.join(filename);
        fs::write(&path, &bytes)?;
        log::info!("saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn submit_to_backends(&self, url: &str, filename: &str) -> Result<()> {
        for backend in [self.secondary.as_deref(), self.last_resort.as_deref()]
            .into_iter()
            .flatten()
        {
            match backend.submit(url, filename) {
                Ok(()) => {
                    log::info!("handed '{}' to backend '{}'", filename, backend.name());
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("backend '{}' failed for '{}': {err}", backend.name(), filename);
                }
            }
        }
        Err(GrabError::DownloadExhausted { filename: filename.to_string() })
    }
}

/// Build the task list for a collected post: one task per candidate, named
/// in discovery order with the given clock.
pub fn plan_downloads(
    collection: &MediaCollection,
    context: &PostContext,
    now: NaiveDateTime,
) -> Vec<DownloadTask> {
    collection
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let url = normalize(&candidate.url);
            let extension = if candidate.is_video {
                "mp4".to_string()
            } else {
                extension_from_url(&url)
            };
            let filename =
                filename_at(&context.account, &context.post_date, index, &extension, now);
            DownloadTask::new(candidate.url.clone(), filename)
        })
        .collect()
}
