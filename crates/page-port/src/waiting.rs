//! Bounded polling shared by every layer that waits on the page.

use std::future::Future;
use std::time::{Duration, Instant};

use checkout_core_types::UiError;
use tokio::time::sleep;
use tracing::trace;

/// Poll cadence and budget for one wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitOpts {
    pub interval: Duration,
    pub budget: Duration,
}

impl WaitOpts {
    pub fn new(interval: Duration, budget: Duration) -> Self {
        Self { interval, budget }
    }
}

impl Default for WaitOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            budget: Duration::from_secs(20),
        }
    }
}

/// Poll `probe` until it yields a value or the budget expires.
///
/// A probe returning `Ok(None)` means "not yet"; a probe error aborts the
/// wait immediately. Expiry maps to [`UiError::InteractionTimeout`] carrying
/// `what` and the elapsed time, which is the single timeout surface the
/// checkout layers report through.
pub async fn wait_until<T, F, Fut>(what: &str, opts: WaitOpts, mut probe: F) -> Result<T, UiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, UiError>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            trace!(what, elapsed_ms = started.elapsed().as_millis() as u64, "wait satisfied");
            return Ok(value);
        }
        if started.elapsed() >= opts.budget {
            return Err(UiError::InteractionTimeout {
                what: what.to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        sleep(opts.interval).await;
    }
}
