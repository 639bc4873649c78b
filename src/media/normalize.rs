//! URL normalization and candidate synthesis.
//!
//! `normalize` strips the cache-defeat parameters this crate itself appends
//! for display purposes and upgrades known thumbnail paths. Every other
//! query parameter is preserved: CDN URLs carry auth material in the query
//! string and stripping it breaks the transfer.

use std::collections::HashSet;

use url::Url;

use crate::media::classify::{has_video_extension, is_hex32, is_numeric_triplet, path_filename};

/// Thumbnail path segment upgraded to full resolution
const THUMBNAIL_SEGMENT: &str = "/s150x150/";

/// Resolution tiers tried when rewriting a CDN size segment
const RESOLUTION_TIERS: &[&str] = &["h1080", "l1080", "h720", "l720"];

/// Strip cache-defeat parameters and upgrade thumbnail paths.
///
/// Idempotent: applying it twice yields the same string. URLs that do not
/// parse are returned unchanged.
pub fn normalize(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.path().contains(THUMBNAIL_SEGMENT) {
        let upgraded = parsed.path().replace(THUMBNAIL_SEGMENT, "/");
        parsed.set_path(&upgraded);
    }

    let (kept, total) = {
        let mut kept = Vec::new();
        let mut total = 0usize;
        for (name, value) in parsed.query_pairs() {
            total += 1;
            if !is_cache_param(&name, &value) {
                kept.push((name.into_owned(), value.into_owned()));
            }
        }
        (kept, total)
    };
    if kept.len() != total {
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            let mut pairs = parsed.query_pairs_mut();
            pairs.clear();
            for (name, value) in &kept {
                pairs.append_pair(name, value);
            }
        }
    }
    if parsed.query() == Some("") {
        parsed.set_query(None);
    }

    parsed.to_string()
}

/// Query-parameter-insensitive identity of a media URL.
///
/// This is the deduplication key of a media collection: two discoveries of
/// the same asset under different cache-busting or auth suffixes collapse
/// into one entry.
pub fn canonical_key(url: &str) -> String {
    let normalized = normalize(url);
    match Url::parse(&normalized) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => normalized
            .split(['?', '#'])
            .next()
            .unwrap_or(&normalized)
            .to_string(),
    }
}

/// Cache-defeated variant of a URL for on-screen rendering.
///
/// The rendered variant must never be used for the transfer itself; keep the
/// display-to-original mapping from [`crate::media::DisplaySet`] around.
pub fn display_url(url: &str, timestamp: i64) -> String {
    let base = normalize(url);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}_t={timestamp}")
}

fn is_cache_param(name: &str, value: &str) -> bool {
    match name {
        "_t" => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
        "_nocache" | "_retry" => !value.is_empty(),
        _ => false,
    }
}

/// Ordered alternate URLs for a video asset.
///
/// The path that appears in the DOM frequently is not the one that serves
/// the bytes; the downloader walks this list in order. The original URL is
/// always first and the list is deduplicated.
pub fn alternative_video_urls(url: &str) -> Vec<String> {
    let mut candidates = vec![url.to_string()];

    let (base, query) = split_query(url);

    if !has_video_extension(base) {
        candidates.push(format!("{base}.mp4{query}"));
    }

    let video_id = extract_video_id(url);
    if !video_id.is_empty() {
        for path in [
            "v/t50.2886-16",
            "v/t50.16885-16",
            "v/t51.29350-16",
        ] {
            candidates.push(format!(
                "https://scontent.cdninstagram.com/{path}/{video_id}.mp4{query}"
            ));
        }
        for host in ["scontent-ssn1-1", "scontent-nrt1-1"] {
            candidates.push(format!(
                "https://{host}.cdninstagram.com/v/t50.2886-16/{video_id}.mp4{query}"
            ));
        }
    }

    if url.contains("cdninstagram") || url.contains("fbcdn") {
        for tier in RESOLUTION_TIERS {
            if let Some(rewritten) = rewrite_resolution_segment(url, tier) {
                candidates.push(rewritten);
            }
        }
    }

    if url.contains("instagram.com/p/") && url.contains("/video/") {
        if let Some(rest) = url.split("instagram.com/p/").nth(1) {
            let code = rest.split(['/', '?', '#']).next().unwrap_or("");
            if !code.is_empty() {
                candidates.push(format!("https://www.instagram.com/p/{code}/video/"));
                candidates.push(format!("https://www.instagram.com/reel/{code}/video/"));
            }
        }
    }

    dedup(candidates)
}

/// Asset id of a CDN video URL, used to synthesize alternate CDN paths
fn extract_video_id(url: &str) -> String {
    let name = path_filename(url);
    if is_numeric_triplet(name) {
        return name.split('.').next().unwrap_or(name).to_string();
    }
    if is_hex32(name) {
        return name.to_string();
    }
    name.strip_suffix(".mp4")
        .or_else(|| name.strip_suffix(".mov"))
        .unwrap_or(name)
        .to_string()
}

/// Replace the first `<letter><digits>x<digits>` path segment with a tier
fn rewrite_resolution_segment(url: &str, tier: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let segments: Vec<String> = parsed.path_segments()?.map(str::to_string).collect();

    let position = segments.iter().position(|seg| is_resolution_segment(seg))?;
    let rebuilt: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| if i == position { tier } else { seg.as_str() })
        .collect();
    parsed.set_path(&rebuilt.join("/"));
    Some(parsed.to_string())
}

fn is_resolution_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    if bytes.len() < 4 || !bytes[0].is_ascii_lowercase() {
        return false;
    }
    let rest = &segment[1..];
    let Some((width, height)) = rest.split_once('x') else {
        return false;
    };
    !width.is_empty()
        && width.bytes().all(|b| b.is_ascii_digit())
        && !height.is_empty()
        && height.bytes().all(|b| b.is_ascii_digit())
}

fn split_query(url: &str) -> (&str, &str) {
    match url.find('?') {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    }
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for url in urls {
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    out
}
