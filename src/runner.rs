//! Ties everything together: REST setup, browser session, checkout flow,
//! screenshot hooks and the final API status check.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use cdp_page::{BrowserSession, CdpPage};
use checkout_core_types::{CardData, CustomerData, Outcome, UiError};
use checkout_flow::{CheckoutFlow, FlowHooks, FlowReport, FlowState};
use page_port::PagePort;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::api::{self, ApiClient, CheckoutSession};
use crate::config::HarnessConfig;

/// Settle time before the post-hoc API status lookup.
const STATUS_LOOKUP_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub transaction_id: String,
    pub outcome: String,
    pub api_status: Option<String>,
    pub report: FlowReport,
}

/// Full-page screenshots at the fixed flow points, written below one
/// directory per run.
struct ScreenshotHooks {
    page: Arc<CdpPage>,
    dir: PathBuf,
}

impl ScreenshotHooks {
    async fn save(&self, name: &str) {
        let png = match self.page.screenshot().await {
            Ok(png) => png,
            Err(err) => {
                warn!(%err, name, "screenshot capture failed");
                return;
            }
        };
        let path = self.dir.join(name);
        match tokio::fs::write(&path, png).await {
            Ok(()) => info!(path = %path.display(), "screenshot saved"),
            Err(err) => warn!(%err, path = %path.display(), "screenshot write failed"),
        }
    }
}

#[async_trait]
impl FlowHooks for ScreenshotHooks {
    async fn after_customer_form(&self) {
        self.save("02_customer_data.png").await;
    }

    async fn after_payment_form(&self) {
        self.save("03_card_data.png").await;
    }

    async fn on_failure(&self, state: FlowState, _error: &UiError) {
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        self.save(&format!("error_{state}_{stamp}.png")).await;
    }
}

/// One complete checkout acceptance run.
pub async fn run_checkout(config: &HarnessConfig) -> anyhow::Result<RunSummary> {
    config.validate()?;
    let customer = config.customer.clone();
    let card = config
        .card
        .to_card_data()
        .context("invalid card configuration")?;

    let mut client = ApiClient::new(config.api.clone())?;
    client.authenticate().await?;
    let session = client.create_transaction().await?;

    let browser = BrowserSession::launch(&config.browser.launch_opts())
        .await
        .context("browser launch failed")?;
    let driven = drive_browser(&browser, config, &session, &customer, &card).await;
    browser.close().await;
    let (outcome, report) = driven?;

    sleep(STATUS_LOOKUP_DELAY).await;
    let status_body = client.transaction_status(&session.transaction_id).await?;
    let api_status = api::extract_status(&status_body).map(str::to_string);
    info!(ui = %outcome, api = ?api_status, "run results");

    Ok(RunSummary {
        run_id: report.run_id.clone(),
        transaction_id: session.transaction_id,
        outcome: outcome.to_string(),
        api_status,
        report,
    })
}

async fn drive_browser(
    browser: &BrowserSession,
    config: &HarnessConfig,
    session: &CheckoutSession,
    customer: &CustomerData,
    card: &CardData,
) -> anyhow::Result<(Outcome, FlowReport)> {
    tokio::fs::create_dir_all(&config.screenshots_dir)
        .await
        .context("cannot create screenshots directory")?;

    let page = Arc::new(browser.open_page(&session.checkout_url).await?);
    let hooks = Arc::new(ScreenshotHooks {
        page: Arc::clone(&page),
        dir: config.screenshots_dir.clone(),
    });

    let mut flow = CheckoutFlow::with_opts(
        page as Arc<dyn PagePort>,
        hooks as Arc<dyn FlowHooks>,
        config.timeouts.flow_opts(),
    );
    let outcome = flow.run(customer, card).await?;
    Ok((outcome, flow.report().clone()))
}
