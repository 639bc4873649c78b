//! The slide walker: best-effort enumeration of every slide in a paginated
//! post.
//!
//! The walker repeatedly drives the post's "next" control, waits a settle
//! delay for the renderer to catch up, and re-extracts media, merging
//! results until the control disappears, an iteration stops contributing
//! new candidates, or the step budget runs out. Correctness leans on timing
//! assumptions about a renderer this crate does not control; the protocol is
//! best-effort, never guaranteed-complete, which is why every knob is
//! configuration rather than a constant.

use std::thread;
use std::time::Duration;

use crate::dom::ElementNode;
use crate::error::Result;
use crate::extract::extract_media;
use crate::media::{DisplaySet, MediaCollection};

/// A live post that can be snapshotted and paged through.
///
/// The production implementation drives a real post over CDP
/// ([`crate::browser::LivePost`]); tests script one out of canned
/// snapshots.
pub trait PostSlides {
    /// Snapshot the post's current visual state
    fn snapshot(&mut self) -> Result<ElementNode>;

    /// Trigger the "next" control. `Ok(false)` means the control is absent
    /// or disabled: the terminal slide was reached.
    fn advance(&mut self) -> Result<bool>;

    /// Trigger the "previous" control, mirroring [`PostSlides::advance`]
    fn retreat(&mut self) -> Result<bool>;
}

/// Tuning for the walk loop
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Upper bound on slide transitions per post
    pub max_steps: usize,

    /// How long a slide gets to render after a transition
    pub settle: Duration,

    /// Number of leading iterations exempt from the zero-new-candidates
    /// stop, tolerating slow initial renders
    pub warmup: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_steps: 20,
            settle: Duration::from_millis(600),
            warmup: 2,
        }
    }
}

impl WalkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the step budget
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method: set the settle delay
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Builder method: set the convergence warm-up
    pub fn warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }
}

/// Walk every reachable slide and collect the media of the whole post.
///
/// Terminates within `config.max_steps` transitions regardless of what the
/// post's control reports. The post is wound back to its first slide
/// afterwards so the on-screen state matches what the user was looking at.
pub fn collect_media(
    post: &mut impl PostSlides,
    config: &WalkerConfig,
) -> Result<MediaCollection> {
    let mut collection = extract_media(&post.snapshot()?);
    log::debug!("initial slide: {} candidate(s)", collection.len());

    let mut steps_taken = 0;
    for step in 0..config.max_steps {
        if !post.advance()? {
            log::debug!("next control absent or disabled after {steps_taken} step(s)");
            break;
        }
        steps_taken += 1;
        if !config.settle.is_zero() {
            thread::sleep(config.settle);
        }

        let added = collection.merge(extract_media(&post.snapshot()?));
        if added == 0 && step >= config.warmup {
            log::debug!("no new media at step {steps_taken}, stopping early");
            break;
        }
    }

    rewind(post, steps_taken, config);
    Ok(collection)
}

/// Collect and decorate for rendering in one call: the collaborator surface
/// the surrounding UI consumes.
pub fn collect_displayable(
    post: &mut impl PostSlides,
    config: &WalkerConfig,
    timestamp: i64,
) -> Result<DisplaySet> {
    Ok(collect_media(post, config)?.into_display(timestamp))
}

/// Return to the first slide. Failures here only affect on-screen state,
/// never the already-complete collection, so they degrade to a log line.
fn rewind(post: &mut impl PostSlides, steps: usize, config: &WalkerConfig) {
    for _ in 0..steps {
        match post.retreat() {
            Ok(true) => {
                if !config.settle.is_zero() {
                    thread::sleep(config.settle / 2);
                }
            }
            Ok(false) => break,
            Err(err) => {
                log::debug!("rewind failed: {err}");
                break;
            }
        }
    }
}
