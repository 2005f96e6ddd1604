//! Sole owner of the active frame context.
//!
//! Payment providers commonly render card fields inside iframes. The
//! navigator scans iframes in document order for the one containing a
//! probed field and hands the resulting [`FrameContext`] to callers; no
//! other component ever switches frames.

use std::sync::Arc;
use std::time::Duration;

use checkout_core_types::{FieldDescriptor, UiError};
use field_locator::{FieldResolver, ResolverOpts, TargetKind};
use page_port::{FrameContext, PagePort};
use tracing::{debug, info};

pub struct FrameNavigator {
    page: Arc<dyn PagePort>,
    resolver: FieldResolver,
    current: FrameContext,
}

impl FrameNavigator {
    pub fn new(page: Arc<dyn PagePort>) -> Self {
        Self::with_resolver_opts(page, ResolverOpts::default())
    }

    pub fn with_resolver_opts(page: Arc<dyn PagePort>, opts: ResolverOpts) -> Self {
        let resolver = FieldResolver::with_opts(Arc::clone(&page), opts);
        Self {
            page,
            resolver,
            current: FrameContext::Top,
        }
    }

    /// The context interactions should currently run against.
    pub fn context(&self) -> FrameContext {
        self.current
    }

    /// Scan iframes in document order for one containing `probe`, giving
    /// each frame up to `timeout` to render the field.
    ///
    /// Always resets to the top-level document first, so repeated calls
    /// behave identically regardless of prior state. Returns whether a
    /// matching frame was entered; `false` leaves the context at top, for
    /// callers whose target may legitimately live in the main document.
    pub async fn enter_frame_containing(
        &mut self,
        probe: &FieldDescriptor,
        timeout: Duration,
    ) -> Result<bool, UiError> {
        self.current = FrameContext::Top;
        let frames = self.page.frame_count().await?;
        debug!(frames, probe = %probe.name, "scanning iframes");

        for index in 0..frames {
            let ctx = FrameContext::Frame(index);
            if self
                .resolver
                .probe(ctx, probe, TargetKind::Input, timeout)
                .await?
            {
                info!(%ctx, probe = %probe.name, "entered iframe");
                self.current = ctx;
                return Ok(true);
            }
            debug!(%ctx, probe = %probe.name, "frame does not contain probe");
        }

        self.current = FrameContext::Top;
        Ok(false)
    }

    /// Like [`enter_frame_containing`](Self::enter_frame_containing) but
    /// treats "no frame found" as fatal.
    pub async fn require_frame_containing(
        &mut self,
        probe: &FieldDescriptor,
        timeout: Duration,
    ) -> Result<(), UiError> {
        if self.enter_frame_containing(probe, timeout).await? {
            Ok(())
        } else {
            Err(UiError::FrameNotFound {
                probe: probe.name.clone(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    /// Return to the top-level document.
    pub fn leave_frame(&mut self) {
        if self.current != FrameContext::Top {
            debug!(from = %self.current, "leaving iframe");
            self.current = FrameContext::Top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_port::fake::{FakeDoc, FakeElement, FakePage};

    fn fast_opts() -> ResolverOpts {
        ResolverOpts {
            strategy_budget: Duration::from_millis(40),
            poll_interval: Duration::from_millis(10),
        }
    }

    fn card_probe() -> FieldDescriptor {
        FieldDescriptor::new(
            "card number",
            vec![],
            vec!["card-number".into(), "cardnumber".into()],
            "4635440000002298",
        )
        .sensitive()
    }

    fn frame_with_card() -> FakeDoc {
        let mut doc = FakeDoc::new();
        doc.push(FakeElement::new("input").attr("id", "card-number"));
        doc
    }

    fn empty_frame() -> FakeDoc {
        let mut doc = FakeDoc::new();
        doc.push(FakeElement::new("div").text("spinner"));
        doc
    }

    #[tokio::test]
    async fn first_matching_frame_in_document_order_wins() {
        let page = Arc::new(FakePage::with_frames(
            FakeDoc::new(),
            vec![empty_frame(), frame_with_card(), frame_with_card()],
        ));
        let mut nav =
            FrameNavigator::with_resolver_opts(page as Arc<dyn PagePort>, fast_opts());

        let entered = nav
            .enter_frame_containing(&card_probe(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(entered);
        assert_eq!(nav.context(), FrameContext::Frame(1));
    }

    #[tokio::test]
    async fn no_match_resets_to_top() {
        let page = Arc::new(FakePage::with_frames(
            FakeDoc::new(),
            vec![empty_frame(), empty_frame()],
        ));
        let mut nav =
            FrameNavigator::with_resolver_opts(page as Arc<dyn PagePort>, fast_opts());

        let entered = nav
            .enter_frame_containing(&card_probe(), Duration::from_millis(30))
            .await
            .unwrap();
        assert!(!entered);
        assert_eq!(nav.context(), FrameContext::Top);
    }

    #[tokio::test]
    async fn repeated_scans_start_from_top() {
        let page = Arc::new(FakePage::with_frames(
            FakeDoc::new(),
            vec![frame_with_card()],
        ));
        let mut nav =
            FrameNavigator::with_resolver_opts(page as Arc<dyn PagePort>, fast_opts());

        for _ in 0..2 {
            let entered = nav
                .enter_frame_containing(&card_probe(), Duration::from_millis(50))
                .await
                .unwrap();
            assert!(entered);
            assert_eq!(nav.context(), FrameContext::Frame(0));
        }
    }

    #[tokio::test]
    async fn require_maps_miss_to_frame_not_found() {
        let page = Arc::new(FakePage::new(FakeDoc::new()));
        let mut nav =
            FrameNavigator::with_resolver_opts(page as Arc<dyn PagePort>, fast_opts());

        let err = nav
            .require_frame_containing(&card_probe(), Duration::from_millis(30))
            .await
            .unwrap_err();
        match err {
            UiError::FrameNotFound { probe, timeout_ms } => {
                assert_eq!(probe, "card number");
                assert_eq!(timeout_ms, 30);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn leave_frame_returns_to_top() {
        let page = Arc::new(FakePage::with_frames(
            FakeDoc::new(),
            vec![frame_with_card()],
        ));
        let mut nav =
            FrameNavigator::with_resolver_opts(page as Arc<dyn PagePort>, fast_opts());

        nav.enter_frame_containing(&card_probe(), Duration::from_millis(50))
            .await
            .unwrap();
        nav.leave_frame();
        assert_eq!(nav.context(), FrameContext::Top);
    }
}
