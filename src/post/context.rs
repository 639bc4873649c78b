use crate::dom::ElementNode;
use crate::post::page::PageKind;

/// Account sentinel when no handle can be derived
pub const ACCOUNT_FALLBACK: &str = "instagram";

/// Post-date sentinel when the post carries no usable timestamp
pub const DATE_UNKNOWN: &str = "unknown";

/// Per-post naming context, derived once at collection time.
///
/// Fields are never empty: absence is represented by the sentinel values,
/// so downstream formatting never has to special-case missing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContext {
    pub account: String,
    pub post_date: String,
}

impl PostContext {
    /// Derive the context from a post snapshot, with the page URL as the
    /// final fallback for the account handle.
    pub fn from_post(post: &ElementNode, page_url: Option<&str>) -> Self {
        Self {
            account: extract_account(post, page_url),
            post_date: extract_post_date(post),
        }
    }

    pub fn has_date(&self) -> bool {
        self.post_date != DATE_UNKNOWN
    }
}

impl Default for PostContext {
    fn default() -> Self {
        Self {
            account: ACCOUNT_FALLBACK.to_string(),
            post_date: DATE_UNKNOWN.to_string(),
        }
    }
}

/// Account handle, tried through an ordered list of heuristics until one
/// yields a non-empty value
fn extract_account(post: &ElementNode, page_url: Option<&str>) -> String {
    // 1. header profile link: a single-segment href is the handle
    for header in post.find_all("header") {
        for link in header.find_all("a") {
            if let Some(name) = link.attr("href").and_then(single_path_segment) {
                return name.to_string();
            }
        }
    }

    // 2. profile image alt text
    for img in post.find_all("img") {
        if let Some(alt) = img.attr("alt") {
            if let Some(pos) = alt.find("'s profile picture") {
                let name = alt[..pos].trim();
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }
    }

    // 3. header link text
    for header in post.find_all("header") {
        for link in header.find_all("a") {
            if let Some(text) = link.text_content.as_deref() {
                let text = text.trim();
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    // 4. the page URL itself
    if let Some(url) = page_url {
        if let Some(username) = PageKind::from_url(url).username() {
            return username.to_string();
        }
    }

    ACCOUNT_FALLBACK.to_string()
}

/// Post date as YYMMDD from the first `<time datetime>` in the post
fn extract_post_date(post: &ElementNode) -> String {
    for time in post.find_all("time") {
        if let Some(datetime) = time.attr("datetime") {
            // ISO form: 2025-05-02T09:30:00.000Z -> 250502
            if datetime.len() >= 10 && datetime.is_char_boundary(10) {
                let compact = datetime[2..10].replace('-', "");
                if compact.len() == 6 && compact.bytes().all(|b| b.is_ascii_digit()) {
                    return compact;
                }
            }
        }
    }
    DATE_UNKNOWN.to_string()
}

/// `/name/` or `/name` yields `name`; anything deeper does not
fn single_path_segment(href: &str) -> Option<&str> {
    let trimmed = href.strip_prefix('/')?;
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed.contains('/') {
        return None;
    }
    Some(trimmed)
}
