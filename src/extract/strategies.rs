//! Extraction strategies.
//!
//! Each strategy is a pure scan of an [`ElementNode`] subtree. Strategies
//! run in a fixed order and all of them may contribute; the shared
//! collection deduplicates whatever they find. Keeping them isolated keeps
//! each one testable against a handcrafted subtree.

use crate::dom::ElementNode;
use crate::media::{normalize, MediaCandidate, MediaCollection, MediaSource};
use crate::media::is_media_cdn;

/// Marker attribute value of styled image containers
const STYLED_IMAGE_MARKER: &str = "media-vc-image";

pub(crate) trait Strategy {
    fn name(&self) -> &'static str;
    fn collect(&self, post: &ElementNode, out: &mut MediaCollection);
}

/// A URL is admitted when it is an http(s) URL on a known media CDN and is
/// not a thumbnail variant once normalized. Upgradable `/s150x150/`
/// thumbnails pass because normalization rewrites them to full resolution;
/// URLs that stay thumbnail-marked are rejected.
pub(crate) fn is_acceptable(url: &str) -> bool {
    if !url.starts_with("http") {
        return false;
    }
    if !is_media_cdn(url) {
        return false;
    }
    !normalize(url).contains("s150x150")
}

fn push(out: &mut MediaCollection, url: &str, source: MediaSource) {
    if is_acceptable(url) {
        out.insert(MediaCandidate::new(url, source));
    }
}

/// Inline images: direct source first, lazy-load and source-set fallbacks,
/// plus the styled-container background variant.
pub(crate) struct ImgStrategy;

impl Strategy for ImgStrategy {
    fn name(&self) -> &'static str {
        "img"
    }

    fn collect(&self, post: &ElementNode, out: &mut MediaCollection) {
        for img in post.find_all("img") {
            let src = img
                .attr("src")
                .or_else(|| img.attr("data-src"))
                .or_else(|| img.attr("srcset").and_then(first_srcset_entry))
                .or_else(|| img.attr("data-srcset").and_then(first_srcset_entry));
            if let Some(src) = src {
                push(out, src, MediaSource::Img);
            }
        }

        // full-resolution originals sometimes only appear as a styled
        // background on a marker container
        for node in post.descendants() {
            if node.attr("data-visualcompletion") == Some(STYLED_IMAGE_MARKER) {
                if let Some(url) = node.attr("style").and_then(style_background_url) {
                    push(out, url, MediaSource::Img);
                }
            }
        }
    }
}

/// Video elements: direct source, else the poster frame, plus nested
/// `<source>` children.
pub(crate) struct VideoStrategy;

impl Strategy for VideoStrategy {
    fn name(&self) -> &'static str {
        "video"
    }

    fn collect(&self, post: &ElementNode, out: &mut MediaCollection) {
        for video in post.find_all("video") {
            match video.attr("src") {
                Some(src) if src.starts_with("http") => push(out, src, MediaSource::Video),
                _ => {
                    if let Some(poster) = video.attr("poster") {
                        push(out, poster, MediaSource::Video);
                    }
                }
            }

            for source in video.find_all("source") {
                if let Some(src) = source.attr("src") {
                    push(out, src, MediaSource::Video);
                }
            }
        }
    }
}

/// Standalone `<source>` elements anywhere in the subtree
pub(crate) struct SourceStrategy;

impl Strategy for SourceStrategy {
    fn name(&self) -> &'static str {
        "source"
    }

    fn collect(&self, post: &ElementNode, out: &mut MediaCollection) {
        for source in post.find_all("source") {
            if let Some(src) = source.attr("src") {
                push(out, src, MediaSource::Video);
            }
        }
    }
}

/// Inline script payloads carrying `display_url` / `video_url` JSON fields.
/// No structured schema is assumed; the fields are pattern-matched out.
pub(crate) struct ScriptStrategy;

impl Strategy for ScriptStrategy {
    fn name(&self) -> &'static str {
        "script"
    }

    fn collect(&self, post: &ElementNode, out: &mut MediaCollection) {
        for script in post.find_all("script") {
            let Some(text) = script.text_content.as_deref() else {
                continue;
            };
            if !text.contains("display_url") && !text.contains("video_url") {
                continue;
            }
            for field in ["display_url", "video_url"] {
                if let Some(url) = json_string_field(text, field) {
                    push(out, &url, MediaSource::Script);
                }
            }
        }
    }
}

/// `data-*` attributes whose name mentions a source or URL
pub(crate) struct DatasetStrategy;

impl Strategy for DatasetStrategy {
    fn name(&self) -> &'static str {
        "dataset"
    }

    fn collect(&self, post: &ElementNode, out: &mut MediaCollection) {
        for node in post.descendants() {
            for (name, value) in node.dataset() {
                if (name.contains("src") || name.contains("url")) && value.starts_with("http") {
                    push(out, value, MediaSource::Dataset);
                }
            }
        }
    }
}

/// First URL of a srcset-style attribute
fn first_srcset_entry(srcset: &str) -> Option<&str> {
    srcset.split_whitespace().next()
}

/// `url("...")` value of an inline style
fn style_background_url(style: &str) -> Option<&str> {
    let start = style.find("url(\"")? + 5;
    let rest = &style[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// First string value of a JSON field inside unparsed script text, with the
/// escaped-slash form unescaped
fn json_string_field(text: &str, field: &str) -> Option<String> {
    let marker = format!("\"{field}\":\"");
    let start = text.find(&marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].replace("\\u002F", "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN: &str = "https://scontent.cdninstagram.com";

    fn collect(strategy: &dyn Strategy, post: &ElementNode) -> Vec<String> {
        let mut out = MediaCollection::new();
        strategy.collect(post, &mut out);
        out.into_iter().map(|c| c.url).collect()
    }

    #[test]
    fn test_acceptance_filter() {
        assert!(is_acceptable(&format!("{CDN}/a.jpg")));
        assert!(is_acceptable(&format!("{CDN}/v/s150x150/a.jpg"))); // upgradable
        assert!(!is_acceptable(&format!("{CDN}/a_s150x150.jpg"))); // stays a thumbnail
        assert!(!is_acceptable("https://example.com/a.jpg")); // off-CDN
        assert!(!is_acceptable("data:image/png;base64,AAAA"));
        assert!(!is_acceptable("/relative/a.jpg"));
    }

    #[test]
    fn test_img_strategy_attribute_fallbacks() {
        let post = ElementNode::new("article")
            .with_child(ElementNode::new("img").with_attribute("src", format!("{CDN}/a.jpg")))
            .with_child(
                ElementNode::new("img").with_attribute("data-src", format!("{CDN}/b.jpg")),
            )
            .with_child(ElementNode::new("img").with_attribute(
                "srcset",
                format!("{CDN}/c.jpg 1080w, {CDN}/c-small.jpg 320w"),
            ))
            .with_child(ElementNode::new("img").with_attribute("src", "data:image/png;base64,x"));

        let urls = collect(&ImgStrategy, &post);
        assert_eq!(
            urls,
            vec![
                format!("{CDN}/a.jpg"),
                format!("{CDN}/b.jpg"),
                format!("{CDN}/c.jpg"),
            ]
        );
    }

    #[test]
    fn test_img_strategy_styled_container() {
        let post = ElementNode::new("article").with_child(
            ElementNode::new("div")
                .with_attribute("data-visualcompletion", "media-vc-image")
                .with_attribute(
                    "style",
                    format!("background-image: url(\"{CDN}/full.jpg\");"),
                ),
        );
        assert_eq!(collect(&ImgStrategy, &post), vec![format!("{CDN}/full.jpg")]);
    }

    #[test]
    fn test_video_strategy_prefers_src_over_poster() {
        let post = ElementNode::new("article").with_child(
            ElementNode::new("video")
                .with_attribute("src", format!("{CDN}/clip.mp4"))
                .with_attribute("poster", format!("{CDN}/poster.jpg")),
        );
        assert_eq!(collect(&VideoStrategy, &post), vec![format!("{CDN}/clip.mp4")]);
    }

    #[test]
    fn test_video_strategy_poster_fallback_and_sources() {
        let post = ElementNode::new("article").with_child(
            ElementNode::new("video")
                .with_attribute("poster", format!("{CDN}/poster.jpg"))
                .with_child(
                    ElementNode::new("source").with_attribute("src", format!("{CDN}/v.mp4")),
                ),
        );
        let urls = collect(&VideoStrategy, &post);
        assert_eq!(urls, vec![format!("{CDN}/poster.jpg"), format!("{CDN}/v.mp4")]);
    }

    #[test]
    fn test_video_strategy_blob_src_falls_back_to_poster() {
        let post = ElementNode::new("article").with_child(
            ElementNode::new("video")
                .with_attribute("src", "blob:https://www.instagram.com/abcd")
                .with_attribute("poster", format!("{CDN}/poster.jpg")),
        );
        assert_eq!(
            collect(&VideoStrategy, &post),
            vec![format!("{CDN}/poster.jpg")]
        );
    }

    #[test]
    fn test_script_strategy_extracts_json_fields() {
        let payload = format!(
            r#"{{"display_url":"https://scontent.cdninstagram.com/d.jpg","video_url":"{CDN}/v.mp4","other":1}}"#
        );
        let post = ElementNode::new("article")
            .with_child(ElementNode::new("script").with_text(payload));

        let urls = collect(&ScriptStrategy, &post);
        assert_eq!(
            urls,
            vec![
                format!("{CDN}/d.jpg"),
                format!("{CDN}/v.mp4"),
            ]
        );
    }

    #[test]
    fn test_script_strategy_ignores_unrelated_scripts() {
        let post = ElementNode::new("article")
            .with_child(ElementNode::new("script").with_text("var x = 1;"));
        assert!(collect(&ScriptStrategy, &post).is_empty());
    }

    #[test]
    fn test_dataset_strategy() {
        let post = ElementNode::new("article").with_child(
            ElementNode::new("div")
                .with_attribute("data-media-id", "17900")
                .with_attribute("data-video-url", format!("{CDN}/clip.mp4"))
                .with_attribute("data-src", format!("{CDN}/still.jpg"))
                .with_attribute("data-caption", "not a url"),
        );
        let mut urls = collect(&DatasetStrategy, &post);
        urls.sort();
        assert_eq!(
            urls,
            vec![format!("{CDN}/clip.mp4"), format!("{CDN}/still.jpg")]
        );
    }

    #[test]
    fn test_style_background_url() {
        assert_eq!(
            style_background_url(r#"background-image: url("https://x/y.jpg");"#),
            Some("https://x/y.jpg")
        );
        assert_eq!(style_background_url("color: red"), None);
    }

    #[test]
    fn test_json_string_field_unescapes_slashes() {
        let text = r#"{"display_url":"https://a/b.jpg"}"#;
        assert_eq!(
            json_string_field(text, "display_url").as_deref(),
            Some("https://a/b.jpg")
        );
        assert_eq!(json_string_field(text, "video_url"), None);

        let escaped = r#"{"video_url":"https:\u002F\u002Fa\u002Fb.mp4"}"#;
        assert_eq!(
            json_string_field(escaped, "video_url").as_deref(),
            Some("https://a/b.mp4")
        );
    }
}
