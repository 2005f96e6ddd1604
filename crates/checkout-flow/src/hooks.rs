//! Side-effect hook points exposed to the orchestrating caller.
//!
//! The flow itself never writes files; screenshot capture and similar
//! diagnostics live behind this trait so the caller decides paths and
//! formats. Hooks are best-effort and must not fail the flow.

use async_trait::async_trait;
use checkout_core_types::UiError;

use crate::report::FlowState;

#[async_trait]
pub trait FlowHooks: Send + Sync {
    /// After the customer form was filled and the continue control clicked.
    async fn after_customer_form(&self) {}

    /// After the card form was filled and the pay-now control clicked.
    async fn after_payment_form(&self) {}

    /// On any failure aborting the flow, before the error propagates.
    async fn on_failure(&self, _state: FlowState, _error: &UiError) {}
}

/// Hook implementation that does nothing.
pub struct NoopHooks;

#[async_trait]
impl FlowHooks for NoopHooks {}
