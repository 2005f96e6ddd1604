//! Plain-data view of the scoped document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The currently-scoped document against which interactions execute.
///
/// At most one context is active at a time; the frame navigator is the sole
/// owner of transitions. Everything else receives the context as an explicit
/// value instead of reading ambient browser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameContext {
    /// The top-level document.
    #[default]
    Top,
    /// One specific iframe, addressed by its position in document order.
    Frame(usize),
}

impl fmt::Display for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameContext::Top => write!(f, "top"),
            FrameContext::Frame(index) => write!(f, "iframe[{index}]"),
        }
    }
}

/// One element of a document snapshot.
///
/// Snapshots are returned in document order; `node` is an addressable handle
/// valid against the same context until the document changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node: u64,
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: HashMap<String, String>,
    /// Rendered text, trimmed.
    pub text: String,
    pub visible: bool,
}

impl DomNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn is_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.tag == *t)
    }
}
