//! Owned DOM snapshot types.
//!
//! A post subtree is serialized in-page to JSON and deserialized into
//! [`ElementNode`], the value the extraction strategies walk.

pub mod element;

pub use element::{Descendants, ElementNode};
