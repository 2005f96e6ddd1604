//! The checkout flow controller: a linear state machine sequencing the
//! business steps of a hosted payment page (load → customer data →
//! continue → card data → submit → outcome), built on the locator engine,
//! form primitives and frame navigator.

mod controller;
mod fields;
mod hooks;
mod outcome;
mod report;

pub use controller::{CheckoutFlow, FlowOpts};
pub use fields::{
    CheckoutFields, CONTINUE_TEXTS, EXPIRY_MONTH_ID, EXPIRY_YEAR_ID, PAY_NOW_TEXTS,
    SUBMIT_FALLBACK_TEXTS,
};
pub use hooks::{FlowHooks, NoopHooks};
pub use outcome::{OutcomeClassifier, OutcomeOpts};
pub use report::{FlowReport, FlowState, StepRecord};
