//! Syntactic media-URL classification.
//!
//! Classification never touches the network: it is a best-effort decision
//! from the URL text alone, so false positives and negatives are expected
//! and tolerated. Ambiguous URLs classify as images and default to `jpg`.

use url::Url;

/// Extensions that mark a URL as video
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv"];

/// Substrings that mark a URL as a still image on CDN hosts
const IMAGE_MARKERS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Host fragments of the media CDNs the extractor accepts
const MEDIA_CDN_HOSTS: &[&str] = &["cdninstagram", "fbcdn"];

/// Fallback extension when none can be derived
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Whether the URL points at a known media CDN host
pub fn is_media_cdn(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .is_some_and(|host| MEDIA_CDN_HOSTS.iter().any(|cdn| host.contains(cdn))),
        Err(_) => false,
    }
}

/// Decide whether a URL denotes video content.
///
/// Decision order, first match wins:
/// 1. known video extension,
/// 2. video path markers (`/video/`, `/reel/`, CDN video tags),
/// 3. CDN filename heuristics when no image marker is present,
/// 4. query-parameter markers.
pub fn is_video_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    if has_video_extension(url) {
        return true;
    }

    if url.contains("/video/")
        || url.contains("/videos/")
        || url.contains("/reel/")
        || url.contains("/t50.")
    {
        return true;
    }
    // t51 paths carry both stills and clips; stills keep their image extension
    if url.contains("/t51.") && !url.contains(".jpg") && !url.contains(".jpeg") {
        return true;
    }

    if is_media_cdn(url) && !has_image_marker(url) {
        if url.contains("/v/") {
            return true;
        }
        let name = path_filename(url);
        if is_numeric_triplet(name) || is_hex32(name) {
            return true;
        }
    }

    url.contains("video_id=")
        || url.contains("media_type=video")
        || url.contains("video_versions=")
        || url.contains("is_video=true")
}

/// Derive a file extension from a URL. Never returns an empty string.
pub fn extension_from_url(url: &str) -> String {
    if url.is_empty() {
        return DEFAULT_EXTENSION.to_string();
    }
    if url.contains("/video/") {
        return "mp4".to_string();
    }

    let base = strip_query(url);
    if let Some(pos) = base.rfind('.') {
        let ext = &base[pos + 1..];
        if (3..=4).contains(&ext.len()) && ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return ext.to_ascii_lowercase();
        }
    }
    DEFAULT_EXTENSION.to_string()
}

/// Whether the URL path ends in a known video extension
pub(crate) fn has_video_extension(url: &str) -> bool {
    let base = strip_query(url).to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| base.ends_with(&format!(".{ext}")))
}

fn has_image_marker(url: &str) -> bool {
    IMAGE_MARKERS.iter().any(|marker| url.contains(marker))
}

/// URL without its query string or fragment
fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Last path segment of the URL, query and fragment removed
pub(crate) fn path_filename(url: &str) -> &str {
    let base = strip_query(url);
    base.rsplit('/').next().unwrap_or(base)
}

/// CDN video asset names start with three underscore-separated digit runs
pub(crate) fn is_numeric_triplet(name: &str) -> bool {
    let mut parts = name.splitn(3, '_');
    let (Some(first), Some(second), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    !first.is_empty()
        && first.bytes().all(|b| b.is_ascii_digit())
        && !second.is_empty()
        && second.bytes().all(|b| b.is_ascii_digit())
        && rest.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

/// 32 lowercase hex characters, another CDN video asset naming scheme
pub(crate) fn is_hex32(name: &str) -> bool {
    name.len() == 32
        && name
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
