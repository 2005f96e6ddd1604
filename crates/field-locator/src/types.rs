use std::fmt;

/// The locator strategies, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// `<label>` with exact (folded) text, resolved via `for` or the first
    /// following form control.
    LabelExact,
    /// Keyword substring over `name|id|placeholder|aria-label`.
    AttributeKeyword,
    /// `contenteditable="true"` element whose `aria-label` carries a keyword.
    Contenteditable,
    /// Direct lookup by a caller-supplied element id.
    RawSelector,
}

impl LocatorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::LabelExact => "label-exact",
            LocatorStrategy::AttributeKeyword => "attribute-keyword",
            LocatorStrategy::Contenteditable => "contenteditable",
            LocatorStrategy::RawSelector => "raw-selector",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of control a descriptor should resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Text entry: `input`, `textarea` or a contenteditable surface.
    Input,
    /// A native `<select>`.
    Select,
}

impl TargetKind {
    pub(crate) fn tags(&self) -> &'static [&'static str] {
        match self {
            TargetKind::Input => &["input", "textarea"],
            TargetKind::Select => &["select"],
        }
    }
}

/// A successful resolution: the node handle plus the strategy that won.
#[derive(Debug, Clone, Copy)]
pub struct LocatorResult {
    pub node: u64,
    pub strategy: LocatorStrategy,
}
