//! Browser lifecycle: launch, page creation, teardown.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use checkout_core_types::UiError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use which::which;

use crate::page::CdpPage;

#[derive(Debug, Clone)]
pub struct LaunchOpts {
    pub headless: bool,
    /// Explicit browser binary; autodetected when `None`.
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for LaunchOpts {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_data_dir: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the Chromium process and its CDP event loop.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(opts: &LaunchOpts) -> Result<Self, UiError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(opts.request_timeout)
            .launch_timeout(Duration::from_secs(20));

        if !opts.headless {
            builder = builder.with_head();
        }

        let mut args = vec![
            "--disable-notifications",
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
        ];
        if opts.headless {
            args.push("--headless=new");
            args.push("--hide-scrollbars");
            args.push("--mute-audio");
        }
        builder = builder.args(args);

        if let Some(path) = opts.executable.clone().or_else(detect_chrome_executable) {
            builder = builder.chrome_executable(path);
        }
        if let Some(dir) = &opts.user_data_dir {
            builder = builder.user_data_dir(dir.clone());
        }

        let config = builder.build().map_err(UiError::browser)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| UiError::browser(format!("launch failed: {err}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(%err, "cdp handler error");
                }
            }
        });

        info!(headless = opts.headless, "browser launched");
        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a new tab already navigated to `url`.
    pub async fn open_page(&self, url: &str) -> Result<CdpPage, UiError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|err| UiError::browser(format!("new page failed: {err}")))?;
        Ok(CdpPage::new(page))
    }

    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(%err, "browser close failed");
        }
        self.handler_task.abort();
        info!("browser closed");
    }
}

/// Locate a Chromium binary: `CHECKOUT_CHROME` first, then `PATH`.
pub fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("CHECKOUT_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }
    None
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
        ]
    }
}
