//! # postgrab
//!
//! Collects image and video URLs out of a paginated feed post on a live
//! browser page, and saves the bytes to disk through a layered fallback
//! chain. Driving the page goes through Chrome DevTools Protocol (CDP);
//! the media core (classification, normalization, extraction, slide
//! walking, naming) is pure and runs against owned DOM snapshots, so it is
//! fully testable without a browser.
//!
//! ## What it does
//!
//! - **Extraction**: ordered, independently pure strategies scan a post
//!   snapshot for media URLs (inline images, videos and their posters,
//!   `<source>` elements, script payloads, `data-*` attributes).
//! - **Slide walking**: the post's "next" control is driven with a settle
//!   delay and a convergence rule, merging every slide's media into one
//!   deduplicated, order-preserving collection.
//! - **Normalization**: cache-defeat parameters are stripped, thumbnail
//!   paths upgraded, and alternate CDN URLs synthesized for video assets.
//! - **Download**: bytes are fetched with a timeout and written under a
//!   deterministic filename; failures fall back to an injected host
//!   backend, then to an in-page click-through.
//!
//! ## Collecting a post's media
//!
//! ```rust,no_run
//! use postgrab::{BrowserSession, LaunchOptions, WalkerConfig};
//!
//! # fn main() -> postgrab::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://www.instagram.com/p/Cxyz12/")?;
//! session.wait_for_navigation()?;
//!
//! if let Some(mut post) = session.find_post()? {
//!     let collection = postgrab::collect_media(&mut post, &WalkerConfig::default())?;
//!     println!("found {} media item(s)", collection.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Downloading
//!
//! ```rust,no_run
//! use postgrab::{DownloadConfig, Downloader, DownloadTask};
//!
//! # fn main() -> postgrab::Result<()> {
//! let downloader = Downloader::new(DownloadConfig::new("downloads"))?;
//! downloader.download(&DownloadTask::new(
//!     "https://scontent.cdninstagram.com/abc.jpg",
//!     "account_0101_0101_01.jpg",
//! ))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: browser session management, the live-post handle, the
//!   click-through download backend
//! - [`dom`]: owned DOM snapshot types
//! - [`media`]: URL classification, normalization, the candidate collection
//! - [`extract`]: extraction strategies over a post snapshot
//! - [`walker`]: the slide walk loop and its trait seam
//! - [`post`]: page routing and per-post naming context
//! - [`naming`]: filename generation
//! - [`download`]: the fallback-chain download pipeline
//! - [`error`]: error types and result alias

pub mod browser;
pub mod dom;
pub mod download;
pub mod error;
pub mod extract;
pub mod media;
pub mod naming;
pub mod post;
pub mod walker;

pub use browser::{BrowserSession, ClickThroughBackend, ConnectionOptions, LaunchOptions, LivePost};
pub use dom::ElementNode;
pub use download::{
    plan_downloads, BulkReport, ByteFetcher, DownloadBackend, DownloadConfig, DownloadTask,
    Downloader, HttpFetcher,
};
pub use error::{GrabError, Result};
pub use extract::extract_media;
pub use media::{
    DisplaySet, DisplayableMedia, MediaCandidate, MediaCollection, MediaSource,
};
pub use post::{PageKind, PostContext};
pub use walker::{collect_displayable, collect_media, PostSlides, WalkerConfig};
