//! Harness configuration: TOML file with serde defaults, plus environment
//! overrides for credentials so secrets never need to live in the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use checkout_core_types::{CardData, CustomerData, Salutation, UiError};
use cdp_page::LaunchOpts;
use checkout_flow::{FlowOpts, OutcomeOpts};
use page_port::WaitOpts;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub api: ApiConfig,
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub customer: CustomerData,
    pub card: CardConfig,
    pub screenshots_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            customer: default_customer(),
            card: CardConfig::default(),
            screenshots_dir: PathBuf::from("screenshots"),
        }
    }
}

impl HarnessConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.api.apply_env();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.client_id.is_empty() {
            return Err(ConfigError::Missing("api.client_id / CHECKOUT_CLIENT_ID"));
        }
        if self.api.client_secret.is_empty() {
            return Err(ConfigError::Missing(
                "api.client_secret / CHECKOUT_CLIENT_SECRET",
            ));
        }
        if self.api.contract_id.is_empty() {
            return Err(ConfigError::Missing(
                "api.contract_id / CHECKOUT_CONTRACT_ID",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// General contract the transaction is created under.
    pub contract_id: String,
    pub merchant_ref: String,
    pub checkout_template: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://connect-testing.secuconnect.com".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            contract_id: String::new(),
            merchant_ref: "50001234".to_string(),
            checkout_template: "COT_WD0DE66HN2XWJHW8JM88003YG0NEA2".to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl ApiConfig {
    pub fn auth_endpoint(&self) -> String {
        format!("{}/oauth/token", self.base_url.trim_end_matches('/'))
    }

    pub fn transaction_endpoint(&self) -> String {
        format!(
            "{}/api/v2/Smart/Transactions/",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn apply_env(&mut self) {
        for (var, slot) in [
            ("CHECKOUT_API_BASE_URL", &mut self.base_url),
            ("CHECKOUT_CLIENT_ID", &mut self.client_id),
            ("CHECKOUT_CLIENT_SECRET", &mut self.client_secret),
            ("CHECKOUT_CONTRACT_ID", &mut self.contract_id),
        ] {
            if let Ok(value) = env::var(var) {
                if !value.trim().is_empty() {
                    *slot = value.trim().to_string();
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
        }
    }
}

impl BrowserConfig {
    pub fn launch_opts(&self) -> LaunchOpts {
        LaunchOpts {
            headless: self.headless,
            executable: self.chrome_path.clone(),
            ..LaunchOpts::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Budget for explicit element waits.
    pub explicit_wait_secs: u64,
    /// Per-frame budget while scanning for the card iframe.
    pub frame_probe_secs: u64,
    /// Budget for the typed submit control before the text fallback.
    pub submit_secs: u64,
    /// Overall deadline for the outcome classifier.
    pub outcome_deadline_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            explicit_wait_secs: 20,
            frame_probe_secs: 10,
            submit_secs: 10,
            outcome_deadline_secs: 40,
        }
    }
}

impl TimeoutConfig {
    pub fn flow_opts(&self) -> FlowOpts {
        let wait = WaitOpts::new(
            Duration::from_millis(200),
            Duration::from_secs(self.explicit_wait_secs),
        );
        let mut opts = FlowOpts::default();
        opts.actor.wait = wait;
        opts.form_wait = wait;
        opts.frame_probe_timeout = Duration::from_secs(self.frame_probe_secs);
        opts.submit_timeout = Duration::from_secs(self.submit_secs);
        opts.outcome_deadline = Duration::from_secs(self.outcome_deadline_secs);
        opts.outcome = OutcomeOpts::default();
        opts
    }
}

/// Test card as configured; validated into [`CardData`] before the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub holder: String,
    pub number: String,
    pub cvv: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            holder: "Max Mustermann".to_string(),
            number: "4635440000002298".to_string(),
            cvv: "123".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "2026".to_string(),
        }
    }
}

impl CardConfig {
    pub fn to_card_data(&self) -> Result<CardData, UiError> {
        CardData::new(
            &self.holder,
            &self.number,
            &self.cvv,
            &self.expiry_month,
            &self.expiry_year,
        )
    }
}

fn default_customer() -> CustomerData {
    CustomerData {
        email: "testuser@example.com".to_string(),
        salutation: Some(Salutation::Mr),
        first_name: "Max".to_string(),
        last_name: "Mustermann".to_string(),
        zip_code: "12345".to_string(),
        city: "Berlin".to_string(),
        street: "Teststraße 2".to_string(),
        country_label: Some("Deutschland".to_string()),
    }
}
