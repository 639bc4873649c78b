//! Media extraction from a post snapshot.
//!
//! `extract_media` runs an ordered list of pure strategies over one
//! [`ElementNode`] subtree and merges their findings into a deduplicated
//! [`MediaCollection`]. It reads the snapshot only; nothing here touches
//! the live page.

mod strategies;

use crate::dom::ElementNode;
use crate::media::MediaCollection;
use strategies::{
    DatasetStrategy, ImgStrategy, ScriptStrategy, SourceStrategy, Strategy, VideoStrategy,
};

/// Extract every media candidate visible in the post's current state
pub fn extract_media(post: &ElementNode) -> MediaCollection {
    let strategies: [&dyn Strategy; 5] = [
        &ImgStrategy,
        &VideoStrategy,
        &SourceStrategy,
        &ScriptStrategy,
        &DatasetStrategy,
    ];

    let mut collection = MediaCollection::new();
    for strategy in strategies {
        let before = collection.len();
        strategy.collect(post, &mut collection);
        let found = collection.len() - before;
        if found > 0 {
            log::debug!("strategy '{}' contributed {} candidate(s)", strategy.name(), found);
        }
    }
    collection
}
