use url::Url;

/// What kind of page a feed URL routes to.
///
/// Only the path shapes the collector cares about are distinguished; anything
/// else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// `/p/<id>`
    Post { id: String },
    /// `/<username>/p/<id>`
    ProfilePost { username: String, id: String },
    /// `/reel/<id>`
    Reel { id: String },
    /// `/stories/<username>`
    Stories { username: String },
    /// `/<username>`
    Profile { username: String },
    Other,
}

impl PageKind {
    pub fn from_url(url: &str) -> PageKind {
        let Ok(parsed) = Url::parse(url) else {
            return PageKind::Other;
        };
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["p", id, ..] => PageKind::Post { id: (*id).to_string() },
            [username, "p", id, ..] => PageKind::ProfilePost {
                username: (*username).to_string(),
                id: (*id).to_string(),
            },
            ["stories", username, ..] => PageKind::Stories {
                username: (*username).to_string(),
            },
            ["reel", id, ..] => PageKind::Reel { id: (*id).to_string() },
            [username] => PageKind::Profile {
                username: (*username).to_string(),
            },
            _ => PageKind::Other,
        }
    }

    /// Username carried by the URL, when the path shape has one
    pub fn username(&self) -> Option<&str> {
        match self {
            PageKind::ProfilePost { username, .. }
            | PageKind::Stories { username }
            | PageKind::Profile { username } => Some(username),
            _ => None,
        }
    }

    /// Whether the page shows a single post
    pub fn is_post_page(&self) -> bool {
        matches!(
            self,
            PageKind::Post { .. } | PageKind::ProfilePost { .. } | PageKind::Reel { .. }
        )
    }
}
