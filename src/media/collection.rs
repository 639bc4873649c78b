use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::media::classify::is_video_url;
use crate::media::normalize::{canonical_key, display_url, normalize};

/// Where in the DOM a candidate URL was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Img,
    Video,
    Script,
    Dataset,
}

/// A URL believed to reference downloadable image or video content.
///
/// Transient: candidates live for one extraction pass and are merged into a
/// [`MediaCollection`]; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    /// The URL as discovered in the DOM (query parameters intact)
    pub url: String,

    /// Syntactic video/image classification
    pub is_video: bool,

    /// Which extraction strategy produced it
    pub source: MediaSource,
}

impl MediaCandidate {
    pub fn new(url: impl Into<String>, source: MediaSource) -> Self {
        let url = url.into();
        let is_video = is_video_url(&url);
        Self { url, is_video, source }
    }

    /// Normalized form of the discovered URL
    pub fn normalized_url(&self) -> String {
        normalize(&self.url)
    }
}

/// Order-preserving set of media candidates, deduplicated by canonical URL.
///
/// Insertion order is discovery order, which maps to on-screen slide order;
/// user-facing indexing depends on it.
#[derive(Debug, Clone, Default)]
pub struct MediaCollection {
    entries: IndexMap<String, MediaCandidate>,
}

impl MediaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Returns true if it was new under its canonical
    /// identity; a later duplicate never displaces an earlier entry.
    pub fn insert(&mut self, candidate: MediaCandidate) -> bool {
        let key = canonical_key(&candidate.url);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, candidate);
        true
    }

    /// Merge another collection in, returning how many entries were new
    pub fn merge(&mut self, other: MediaCollection) -> usize {
        let mut added = 0;
        for candidate in other.entries.into_values() {
            if self.insert(candidate) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &MediaCandidate> {
        self.entries.values()
    }

    /// Canonical identities in discovery order
    pub fn canonical_urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.contains_key(&canonical_key(url))
    }

    /// Decorate the collection for rendering.
    ///
    /// Display URLs carry a cache-defeating timestamp so the page renders
    /// fresh copies; the returned set keeps the mapping back to the
    /// original URLs, which are the ones a transfer must use.
    pub fn into_display(self, timestamp: i64) -> DisplaySet {
        let mut items = Vec::with_capacity(self.entries.len());
        let mut origin = HashMap::with_capacity(self.entries.len());
        for candidate in self.entries.into_values() {
            let display = display_url(&candidate.url, timestamp);
            origin.insert(display.clone(), candidate.url.clone());
            items.push(DisplayableMedia {
                display_url: display,
                is_video: candidate.is_video,
            });
        }
        DisplaySet { items, origin }
    }
}

impl IntoIterator for MediaCollection {
    type Item = MediaCandidate;
    type IntoIter = indexmap::map::IntoValues<String, MediaCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// One renderable media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayableMedia {
    pub display_url: String,
    pub is_video: bool,
}

/// Result of one collect operation: the renderable list plus the lookup
/// from display URL back to the original URL.
///
/// The lookup lives exactly as long as this value; there is no process-wide
/// display-to-original registry.
#[derive(Debug, Clone, Default)]
pub struct DisplaySet {
    items: Vec<DisplayableMedia>,
    origin: HashMap<String, String>,
}

impl DisplaySet {
    pub fn items(&self) -> &[DisplayableMedia] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Original URL for a display URL handed out by this set.
    ///
    /// Falls back to normalizing the display URL when the mapping does not
    /// know it, which strips the appended cache parameter.
    pub fn original_of(&self, display_url: &str) -> String {
        match self.origin.get(display_url) {
            Some(original) => original.clone(),
            None => normalize(display_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_classifies_on_construction() {
        let video = MediaCandidate::new(
            "https://video.fbcdn.net/v/t50.2886-16/123_456_789.mp4",
            MediaSource::Video,
        );
        assert!(video.is_video);

        let image = MediaCandidate::new(
            "https://scontent.cdninstagram.com/photo.jpg",
            MediaSource::Img,
        );
        assert!(!image.is_video);
    }

    #[test]
    fn test_dedup_across_cache_suffixes() {
        let mut collection = MediaCollection::new();
        assert!(collection.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg?_t=1714000000001",
            MediaSource::Img,
        )));
        assert!(!collection.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg?_t=1714000000002",
            MediaSource::Img,
        )));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_dedup_ignores_all_query_params() {
        let mut collection = MediaCollection::new();
        collection.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg?token=1",
            MediaSource::Img,
        ));
        collection.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg?token=2",
            MediaSource::Img,
        ));
        assert_eq!(collection.len(), 1);
        // the first discovery wins
        assert_eq!(
            collection.iter().next().unwrap().url,
            "https://scontent.cdninstagram.com/a.jpg?token=1"
        );
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut collection = MediaCollection::new();
        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            collection.insert(MediaCandidate::new(
                format!("https://scontent.cdninstagram.com/{name}"),
                MediaSource::Img,
            ));
        }
        let order: Vec<&str> = collection.canonical_urls().collect();
        assert_eq!(
            order,
            vec![
                "https://scontent.cdninstagram.com/c.jpg",
                "https://scontent.cdninstagram.com/a.jpg",
                "https://scontent.cdninstagram.com/b.jpg",
            ]
        );
    }

    #[test]
    fn test_merge_counts_new_entries() {
        let mut first = MediaCollection::new();
        first.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg",
            MediaSource::Img,
        ));

        let mut second = MediaCollection::new();
        second.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/a.jpg?x=1",
            MediaSource::Img,
        ));
        second.insert(MediaCandidate::new(
            "https://scontent.cdninstagram.com/b.jpg",
            MediaSource::Img,
        ));

        assert_eq!(first.merge(second), 1);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_display_set_round_trip() {
        let mut collection = MediaCollection::new();
        let original = "https://scontent.cdninstagram.com/a.jpg?token=1";
        collection.insert(MediaCandidate::new(original, MediaSource::Img));

        let set = collection.into_display(1714000000123);
        assert_eq!(set.len(), 1);
        let display = &set.items()[0].display_url;
        assert!(display.contains("_t=1714000000123"));
        assert_eq!(set.original_of(display), original);
    }

    #[test]
    fn test_display_set_unknown_url_falls_back_to_normalize() {
        let set = DisplaySet::default();
        assert_eq!(
            set.original_of("https://scontent.cdninstagram.com/a.jpg?_t=1714000000123"),
            "https://scontent.cdninstagram.com/a.jpg"
        );
    }
}
