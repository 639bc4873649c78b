//! Browser session management and the live-post handle.
//!
//! This is the only module that talks to a real page. Everything it hands
//! to the rest of the crate is an owned value ([`crate::dom::ElementNode`]
//! snapshots), so the core stays testable without a browser.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::{BrowserSession, ClickThroughBackend, LivePost};
