//! Browser capability surface for the checkout harness.
//!
//! Upper layers (locator engine, form primitives, frame navigator, flow
//! controller) never talk to a browser directly; they see the [`PagePort`]
//! trait plus plain-data DOM snapshots. The CDP-backed implementation lives
//! in the `cdp-page` crate; tests use the in-memory [`fake::FakePage`]
//! behind the `fixtures` feature.

mod port;
mod types;
pub mod waiting;

#[cfg(any(feature = "fixtures", test))]
pub mod fake;

pub use port::PagePort;
pub use types::{DomNode, FrameContext};
pub use waiting::{wait_until, WaitOpts};
