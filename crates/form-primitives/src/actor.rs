use std::sync::Arc;
use std::time::Duration;

use checkout_core_types::{FieldDescriptor, UiError};
use field_locator::{fold, FieldResolver, ResolverOpts, TargetKind};
use page_port::{wait_until, FrameContext, PagePort, WaitOpts};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::redact;

/// Timing knobs for the primitives.
#[derive(Debug, Clone, Copy)]
pub struct ActorOpts {
    /// Visibility and button waits.
    pub wait: WaitOpts,
    /// Pause after scroll/open before acting, absorbing render animation.
    pub settle: Duration,
    pub resolver: ResolverOpts,
}

impl Default for ActorOpts {
    fn default() -> Self {
        Self {
            wait: WaitOpts::default(),
            settle: Duration::from_millis(200),
            resolver: ResolverOpts::default(),
        }
    }
}

/// Executes form interactions against one page.
///
/// Each primitive is self-contained: resolve, wait for visibility, scroll,
/// act. Errors carry the descriptor's name so the flow controller can decide
/// whether the field was optional.
pub struct FormActor {
    page: Arc<dyn PagePort>,
    resolver: FieldResolver,
    opts: ActorOpts,
}

impl FormActor {
    pub fn new(page: Arc<dyn PagePort>) -> Self {
        Self::with_opts(page, ActorOpts::default())
    }

    pub fn with_opts(page: Arc<dyn PagePort>, opts: ActorOpts) -> Self {
        let resolver = FieldResolver::with_opts(Arc::clone(&page), opts.resolver);
        Self {
            page,
            resolver,
            opts,
        }
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Clear-then-type into the field described by `descriptor`. Idempotent:
    /// repeating the call leaves the field holding exactly the value once.
    pub async fn enter_text(
        &self,
        ctx: FrameContext,
        descriptor: &FieldDescriptor,
    ) -> Result<(), UiError> {
        let hit = self
            .resolver
            .resolve(ctx, descriptor, TargetKind::Input)
            .await?;
        self.prepare(ctx, hit.node, &descriptor.name).await?;
        self.page.clear(ctx, hit.node).await?;
        self.page.type_text(ctx, hit.node, &descriptor.value).await?;
        info!(
            field = %descriptor.name,
            value = %redact::render(descriptor),
            strategy = %hit.strategy,
            %ctx,
            "text entered"
        );
        Ok(())
    }

    /// Clear-then-type addressed by element id, for the split expiry
    /// fallback fields.
    pub async fn enter_text_by_id(
        &self,
        ctx: FrameContext,
        element_id: &str,
        field: &str,
        value: &str,
        sensitive: bool,
    ) -> Result<(), UiError> {
        let hit = self.resolver.resolve_by_id(ctx, element_id, field).await?;
        self.prepare(ctx, hit.node, field).await?;
        self.page.clear(ctx, hit.node).await?;
        self.page.type_text(ctx, hit.node, value).await?;
        let shown = if sensitive {
            redact::mask(value)
        } else {
            value.to_string()
        };
        info!(field, value = %shown, id = element_id, %ctx, "text entered");
        Ok(())
    }

    /// Select `descriptor.value` by visible option text. Native `<select>`
    /// selection first; when that reports no match, the control is treated
    /// as a custom dropdown: click to open, then click the option with
    /// equal (folded) text.
    pub async fn select_option(
        &self,
        ctx: FrameContext,
        descriptor: &FieldDescriptor,
    ) -> Result<(), UiError> {
        let hit = self
            .resolver
            .resolve(ctx, descriptor, TargetKind::Select)
            .await?;
        self.prepare(ctx, hit.node, &descriptor.name).await?;

        if self
            .page
            .select_by_visible_text(ctx, hit.node, &descriptor.value)
            .await?
        {
            info!(
                field = %descriptor.name,
                option = %descriptor.value,
                kind = "native",
                "option selected"
            );
            return Ok(());
        }

        debug!(field = %descriptor.name, "no native option match, opening as custom dropdown");
        self.page.click(ctx, hit.node).await?;
        sleep(self.opts.settle).await;

        let page = self.page.as_ref();
        let want = fold(&descriptor.value);
        let what = format!("option '{}' for {}", descriptor.value, descriptor.name);
        let option = wait_until(&what, self.opts.wait, move || {
            let want = want.clone();
            async move {
                let dom = page.snapshot(ctx).await?;
                Ok(dom
                    .iter()
                    .find(|n| {
                        n.visible
                            && (n.attr("role") == Some("option") || n.is_tag("li"))
                            && fold(&n.text) == want
                    })
                    .map(|n| n.node))
            }
        })
        .await?;

        self.page.scroll_into_view(ctx, option).await?;
        sleep(self.opts.settle).await;
        self.page.click(ctx, option).await?;
        info!(
            field = %descriptor.name,
            option = %descriptor.value,
            kind = "custom",
            "option selected"
        );
        Ok(())
    }

    /// Click the first clickable (visible, not disabled) button or link
    /// whose text contains any of the given synonyms.
    pub async fn click_by_visible_text(
        &self,
        ctx: FrameContext,
        texts: &[&str],
    ) -> Result<(), UiError> {
        let page = self.page.as_ref();
        let what = format!("button with text {texts:?}");
        let node = wait_until(&what, self.opts.wait, move || async move {
            let dom = page.snapshot(ctx).await?;
            Ok(dom
                .iter()
                .find(|n| {
                    n.visible
                        && n.attr("disabled").is_none()
                        && n.is_any_tag(&["button", "a"])
                        && texts.iter().any(|t| n.text.contains(t))
                })
                .map(|n| n.node))
        })
        .await?;

        self.click_prepared(ctx, node).await?;
        info!(texts = ?texts, %ctx, "button clicked");
        Ok(())
    }

    /// Click the first clickable `button`/`input` whose `type` attribute
    /// equals any of the given values. An explicit `timeout` overrides the
    /// default wait budget.
    pub async fn click_by_control_type(
        &self,
        ctx: FrameContext,
        types: &[&str],
        timeout: Option<Duration>,
    ) -> Result<(), UiError> {
        let page = self.page.as_ref();
        let wait = WaitOpts::new(
            self.opts.wait.interval,
            timeout.unwrap_or(self.opts.wait.budget),
        );
        let what = format!("control of type {types:?}");
        let node = wait_until(&what, wait, move || async move {
            let dom = page.snapshot(ctx).await?;
            Ok(dom
                .iter()
                .find(|n| {
                    n.visible
                        && n.attr("disabled").is_none()
                        && n.is_any_tag(&["button", "input"])
                        && n.attr("type").map_or(false, |t| {
                            types.iter().any(|want| t.eq_ignore_ascii_case(want))
                        })
                })
                .map(|n| n.node))
        })
        .await?;

        self.click_prepared(ctx, node).await?;
        info!(types = ?types, %ctx, "control clicked");
        Ok(())
    }

    /// Wait until visible, then scroll into view.
    async fn prepare(&self, ctx: FrameContext, node: u64, field: &str) -> Result<(), UiError> {
        let page = self.page.as_ref();
        let what = format!("{field} to become visible");
        wait_until(&what, self.opts.wait, move || async move {
            Ok(page.is_visible(ctx, node).await?.then_some(()))
        })
        .await?;
        self.page.scroll_into_view(ctx, node).await?;
        Ok(())
    }

    async fn click_prepared(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        self.page.scroll_into_view(ctx, node).await?;
        sleep(self.opts.settle).await;
        self.page.click(ctx, node).await?;
        Ok(())
    }
}
