//! Flow states and the per-run report.

use checkout_core_types::Outcome;
use serde::Serialize;
use std::fmt;

/// States of the linear checkout state machine, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Init,
    CustomerFormVisible,
    CustomerFormFilled,
    ContinuedToPayment,
    PaymentFormFilled,
    Submitted,
    OutcomeObserved,
    Done,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Init => "init",
            FlowState::CustomerFormVisible => "customer_form_visible",
            FlowState::CustomerFormFilled => "customer_form_filled",
            FlowState::ContinuedToPayment => "continued_to_payment",
            FlowState::PaymentFormFilled => "payment_form_filled",
            FlowState::Submitted => "submitted",
            FlowState::OutcomeObserved => "outcome_observed",
            FlowState::Done => "done",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reached state plus the time spent getting there.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub state: FlowState,
    pub elapsed_ms: u64,
}

/// Summary of one checkout run, suitable for structured output.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub run_id: String,
    pub steps: Vec<StepRecord>,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
}

impl FlowReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            steps: Vec::new(),
            outcome: None,
            error: None,
        }
    }

    /// The furthest state the run reached.
    pub fn last_state(&self) -> Option<FlowState> {
        self.steps.last().map(|s| s.state)
    }
}
