//! Orchestration layer of the checkout harness: configuration, the payment
//! API client and the run loop tying REST setup, browser session and the
//! checkout flow together.

pub mod api;
pub mod config;
pub mod runner;
