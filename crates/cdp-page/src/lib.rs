//! Chromium-backed [`page_port::PagePort`] implementation.
//!
//! Interactions run as JavaScript evaluated over CDP. Iframe scoping uses
//! `contentDocument`, which restricts frame interactions to same-origin
//! frames; a cross-origin frame simply yields an empty snapshot and is
//! skipped by the frame scan.

mod js;
mod page;
mod session;

pub use page::CdpPage;
pub use session::{detect_chrome_executable, BrowserSession, LaunchOpts};
