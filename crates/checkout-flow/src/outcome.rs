//! Terminal outcome classification: redirect URL first, page text second.

use std::sync::Arc;
use std::time::{Duration, Instant};

use checkout_core_types::{Outcome, UiError};
use page_port::{wait_until, FrameContext, PagePort, WaitOpts};
use tokio::time::sleep;
use tracing::{debug, info};

/// Success/failure vocabulary for the page-text fallback (lowercased).
const STATUS_VOCABULARY: [&str; 4] = ["erfolgreich", "success", "fehlgeschlagen", "failed"];

#[derive(Debug, Clone, Copy)]
pub struct OutcomeOpts {
    /// URL poll cadence.
    pub poll_interval: Duration,
    /// Bounded wait for the page-text fallback after the URL deadline.
    pub text_wait: WaitOpts,
}

impl Default for OutcomeOpts {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            text_wait: WaitOpts::new(Duration::from_millis(200), Duration::from_secs(5)),
        }
    }
}

/// Polls for a terminal signal and classifies it.
///
/// URL-based classification always wins over page text: the URL is checked
/// on every tick and short-circuits, the text fallback only runs once the
/// whole deadline elapsed without a redirect.
pub struct OutcomeClassifier {
    page: Arc<dyn PagePort>,
    opts: OutcomeOpts,
}

impl OutcomeClassifier {
    pub fn new(page: Arc<dyn PagePort>) -> Self {
        Self::with_opts(page, OutcomeOpts::default())
    }

    pub fn with_opts(page: Arc<dyn PagePort>, opts: OutcomeOpts) -> Self {
        Self { page, opts }
    }

    pub async fn classify(&self, deadline: Duration) -> Result<Outcome, UiError> {
        let started = Instant::now();
        while started.elapsed() < deadline {
            let url = self.page.current_url().await?.to_uppercase();
            if url.contains("SUCCESS") {
                info!("redirect matched SUCCESS");
                return Ok(Outcome::SuccessUrl);
            }
            if url.contains("ERROR") {
                info!("redirect matched ERROR");
                return Ok(Outcome::ErrorUrl);
            }
            if url.contains("FAILURE") || url.contains("ABORT") {
                info!("redirect matched FAILURE/ABORT");
                return Ok(Outcome::FailureUrl);
            }
            sleep(self.opts.poll_interval).await;
        }

        debug!("no redirect before deadline, checking page text");
        let page = self.page.as_ref();
        let attempt = wait_until("status message", self.opts.text_wait, move || async move {
            let dom = page.snapshot(FrameContext::Top).await?;
            // Prefer the tightest matching element over containers that
            // merely include it.
            Ok(dom
                .iter()
                .filter(|n| n.visible && !n.text.is_empty())
                .filter(|n| {
                    let text = n.text.to_lowercase();
                    STATUS_VOCABULARY.iter().any(|word| text.contains(word))
                })
                .min_by_key(|n| n.text.len())
                .map(|n| n.text.trim().to_string()))
        })
        .await;

        match attempt {
            Ok(text) => {
                info!(%text, "status message observed");
                Ok(Outcome::MessageText(text))
            }
            Err(UiError::InteractionTimeout { .. }) => Ok(Outcome::Unknown),
            Err(err) => Err(err),
        }
    }
}
