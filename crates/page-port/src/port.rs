use async_trait::async_trait;
use checkout_core_types::UiError;

use crate::types::{DomNode, FrameContext};

/// Capabilities the checkout layers need from a browser page.
///
/// All element-addressed methods take a `node` handle obtained from the most
/// recent [`snapshot`](PagePort::snapshot) of the same context. Handles go
/// stale when the document mutates; callers that poll re-snapshot on every
/// tick.
#[async_trait]
pub trait PagePort: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), UiError>;

    async fn current_url(&self) -> Result<String, UiError>;

    /// Number of iframes in the top-level document, in document order.
    async fn frame_count(&self) -> Result<usize, UiError>;

    /// Snapshot of the scoped document, in document order. A frame that is
    /// not scriptable (cross-origin, detached) yields an empty snapshot.
    async fn snapshot(&self, ctx: FrameContext) -> Result<Vec<DomNode>, UiError>;

    async fn is_visible(&self, ctx: FrameContext, node: u64) -> Result<bool, UiError>;

    async fn scroll_into_view(&self, ctx: FrameContext, node: u64) -> Result<(), UiError>;

    async fn click(&self, ctx: FrameContext, node: u64) -> Result<(), UiError>;

    /// Clear the current value of an input, textarea or contenteditable.
    async fn clear(&self, ctx: FrameContext, node: u64) -> Result<(), UiError>;

    /// Append text to the element's current value, firing input events.
    async fn type_text(&self, ctx: FrameContext, node: u64, text: &str) -> Result<(), UiError>;

    /// Native `<select>` selection by exact visible option text. Returns
    /// `Ok(false)` when the element is not a select or no option matches,
    /// so callers can fall through to the custom-dropdown path.
    async fn select_by_visible_text(
        &self,
        ctx: FrameContext,
        node: u64,
        text: &str,
    ) -> Result<bool, UiError>;

    /// Full-page PNG capture.
    async fn screenshot(&self) -> Result<Vec<u8>, UiError>;
}
