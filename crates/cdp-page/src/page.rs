use async_trait::async_trait;
use checkout_core_types::UiError;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use page_port::{DomNode, FrameContext, PagePort};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::js;

/// One Chromium tab, addressed through evaluated JavaScript.
pub struct CdpPage {
    page: Page,
}

#[derive(Deserialize)]
struct SnapshotPayload {
    ok: bool,
    #[serde(default)]
    nodes: Vec<DomNode>,
}

#[derive(Deserialize)]
struct ActionPayload {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    visible: Option<bool>,
    #[serde(default)]
    matched: Option<bool>,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval(&self, script: String) -> Result<Value, UiError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(UiError::browser)?;
        let result = self
            .page
            .evaluate(params)
            .await
            .map_err(|err| UiError::browser(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn run_action(&self, script: String, what: &str) -> Result<ActionPayload, UiError> {
        let value = self.eval(script).await?;
        let payload: ActionPayload = serde_json::from_value(value)
            .map_err(|err| UiError::browser(format!("{what}: malformed result: {err}")))?;
        if !payload.ok {
            let reason = payload.error.as_deref().unwrap_or("unknown");
            return Err(UiError::browser(format!("{what} failed: {reason}")));
        }
        Ok(payload)
    }
}

#[async_trait]
impl PagePort for CdpPage {
    async fn navigate(&self, url: &str) -> Result<(), UiError> {
        debug!(url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|err| UiError::browser(err.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, UiError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| UiError::browser(err.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn frame_count(&self) -> Result<usize, UiError> {
        let value = self.eval(js::frame_count_script()).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn snapshot(&self, ctx: FrameContext) -> Result<Vec<DomNode>, UiError> {
        let value = self.eval(js::snapshot_script(ctx)).await?;
        let payload: SnapshotPayload = serde_json::from_value(value)
            .map_err(|err| UiError::browser(format!("snapshot of {ctx}: {err}")))?;
        if !payload.ok {
            // Cross-origin or detached frame; the scan just moves on.
            trace!(%ctx, "document not scriptable, empty snapshot");
            return Ok(Vec::new());
        }
        Ok(payload.nodes)
    }

    async fn is_visible(&self, ctx: FrameContext, node: u64) -> Result<bool, UiError> {
        let payload = self
            .run_action(js::visible_script(ctx, node), "visibility check")
            .await?;
        Ok(payload.visible.unwrap_or(false))
    }

    async fn scroll_into_view(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        self.run_action(js::scroll_script(ctx, node), "scroll")
            .await?;
        Ok(())
    }

    async fn click(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        self.run_action(js::click_script(ctx, node), "click").await?;
        Ok(())
    }

    async fn clear(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        self.run_action(js::clear_script(ctx, node), "clear").await?;
        Ok(())
    }

    async fn type_text(&self, ctx: FrameContext, node: u64, text: &str) -> Result<(), UiError> {
        self.run_action(js::type_text_script(ctx, node, text), "type")
            .await?;
        Ok(())
    }

    async fn select_by_visible_text(
        &self,
        ctx: FrameContext,
        node: u64,
        text: &str,
    ) -> Result<bool, UiError> {
        let payload = self
            .run_action(js::select_script(ctx, node, text), "select")
            .await?;
        Ok(payload.matched.unwrap_or(false))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, UiError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|err| UiError::browser(err.to_string()))
    }
}
