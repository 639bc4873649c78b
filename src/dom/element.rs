use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owned snapshot of a DOM element and its subtree.
///
/// Produced by the in-page serialization script (see
/// [`crate::browser::LivePost`]) and consumed by the extraction strategies.
/// The snapshot is a plain value: walking it has no effect on the live page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name, lowercased by the snapshot script (e.g. "img", "video")
    pub tag_name: String,

    /// Element attributes as they appeared at snapshot time
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text content, present only for elements that carry any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child elements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
        }
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: add a child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get an attribute value by name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Check tag name, case-insensitively
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Check if the element carries a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }

    /// Iterate over this element and every descendant, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Collect every descendant (including self) with the given tag name
    pub fn find_all(&self, tag: &str) -> Vec<&ElementNode> {
        self.descendants().filter(|node| node.is_tag(tag)).collect()
    }

    /// `data-*` attributes as (suffix, value) pairs.
    ///
    /// The `data-` prefix is stripped: `data-src-large` yields
    /// `("src-large", value)`.
    pub fn dataset(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            key.strip_prefix("data-").map(|name| (name, value.as_str()))
        })
    }

    /// Whether any `data-*` attribute equals the given value
    pub fn has_data_value(&self, value: &str) -> bool {
        self.dataset().any(|(_, v)| v == value)
    }
}

/// Pre-order iterator over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
