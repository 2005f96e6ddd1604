//! Drives the strategy chain against a live page.

use std::sync::Arc;
use std::time::Duration;

use checkout_core_types::{FieldDescriptor, UiError};
use page_port::{wait_until, FrameContext, PagePort, WaitOpts};
use tracing::{debug, trace};

use crate::strategies::{default_chain, LocateStrategy};
use crate::types::{LocatorResult, LocatorStrategy, TargetKind};

/// Per-strategy polling budget. Each strategy in the chain gets the full
/// budget before the resolver moves to the next one.
#[derive(Debug, Clone, Copy)]
pub struct ResolverOpts {
    pub strategy_budget: Duration,
    pub poll_interval: Duration,
}

impl Default for ResolverOpts {
    fn default() -> Self {
        Self {
            strategy_budget: Duration::from_secs(3),
            poll_interval: Duration::from_millis(150),
        }
    }
}

/// Resolves [`FieldDescriptor`]s to node handles via the ordered fallback
/// chain. Strategies re-run against a fresh snapshot on every poll tick, so
/// late-rendering controls are picked up within the budget.
pub struct FieldResolver {
    page: Arc<dyn PagePort>,
    strategies: Vec<Box<dyn LocateStrategy>>,
    opts: ResolverOpts,
}

impl FieldResolver {
    pub fn new(page: Arc<dyn PagePort>) -> Self {
        Self::with_opts(page, ResolverOpts::default())
    }

    pub fn with_opts(page: Arc<dyn PagePort>, opts: ResolverOpts) -> Self {
        Self {
            page,
            strategies: default_chain(),
            opts,
        }
    }

    /// Resolve a descriptor in the given context.
    ///
    /// Returns the first strategy hit; [`UiError::ElementNotFound`] only
    /// after the whole chain exhausted its budgets. Browser failures abort
    /// the chain immediately.
    pub async fn resolve(
        &self,
        ctx: FrameContext,
        descriptor: &FieldDescriptor,
        target: TargetKind,
    ) -> Result<LocatorResult, UiError> {
        descriptor.validate()?;
        let page = self.page.as_ref();
        let wait = WaitOpts::new(self.opts.poll_interval, self.opts.strategy_budget);

        for strategy in &self.strategies {
            let strategy: &dyn LocateStrategy = strategy.as_ref();
            let what = format!("{} via {}", descriptor.name, strategy.kind());
            let attempt = wait_until(&what, wait, move || async move {
                let dom = page.snapshot(ctx).await?;
                Ok(strategy.locate(&dom, descriptor, target))
            })
            .await;

            match attempt {
                Ok(node) => {
                    debug!(
                        field = %descriptor.name,
                        strategy = %strategy.kind(),
                        %ctx,
                        node,
                        "field resolved"
                    );
                    return Ok(LocatorResult {
                        node,
                        strategy: strategy.kind(),
                    });
                }
                Err(UiError::InteractionTimeout { .. }) => {
                    trace!(
                        field = %descriptor.name,
                        strategy = %strategy.kind(),
                        "strategy exhausted, falling through"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(UiError::ElementNotFound {
            field: descriptor.name.clone(),
        })
    }

    /// Direct lookup of a visible element by id, bypassing the chain. Used
    /// for the split expiry fallback ids.
    pub async fn resolve_by_id(
        &self,
        ctx: FrameContext,
        element_id: &str,
        field: &str,
    ) -> Result<LocatorResult, UiError> {
        let page = self.page.as_ref();
        let wait = WaitOpts::new(self.opts.poll_interval, self.opts.strategy_budget);
        let what = format!("{field} via raw selector #{element_id}");

        let attempt = wait_until(&what, wait, move || async move {
            let dom = page.snapshot(ctx).await?;
            Ok(dom
                .iter()
                .find(|n| n.attr("id") == Some(element_id) && n.visible)
                .map(|n| n.node))
        })
        .await;

        match attempt {
            Ok(node) => Ok(LocatorResult {
                node,
                strategy: LocatorStrategy::RawSelector,
            }),
            Err(UiError::InteractionTimeout { .. }) => Err(UiError::ElementNotFound {
                field: field.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Cheap presence probe used by the frame navigator: does any strategy
    /// match in this context within `budget`? Visibility-gated like
    /// [`resolve`](Self::resolve), but runs the whole chain on every tick
    /// and never maps expiry to an error.
    pub async fn probe(
        &self,
        ctx: FrameContext,
        descriptor: &FieldDescriptor,
        target: TargetKind,
        budget: Duration,
    ) -> Result<bool, UiError> {
        descriptor.validate()?;
        let page = self.page.as_ref();
        let strategies = &self.strategies;
        let wait = WaitOpts::new(self.opts.poll_interval, budget);
        let what = format!("{} anywhere in {}", descriptor.name, ctx);

        let attempt = wait_until(&what, wait, move || async move {
            let dom = page.snapshot(ctx).await?;
            Ok(strategies
                .iter()
                .find_map(|s| s.locate(&dom, descriptor, target))
                .map(|_| ()))
        })
        .await;

        match attempt {
            Ok(()) => Ok(true),
            Err(UiError::InteractionTimeout { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
