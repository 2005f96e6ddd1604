//! Shared primitives for the checkout harness crates.
//!
//! Everything that crosses a crate boundary lives here: the semantic field
//! descriptions consumed by the locator engine, the immutable customer/card
//! value records, the terminal [`Outcome`] classification and the [`UiError`]
//! taxonomy every layer reports through.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error taxonomy shared by the locator engine, interaction primitives,
/// frame navigator and flow controller.
///
/// Primitive-level errors bubble unmodified to the flow controller; only
/// explicitly best-effort steps swallow them.
#[derive(Debug, Error, Clone)]
pub enum UiError {
    /// Every locator strategy exhausted its budget without a visible match.
    #[error("element not found for '{field}': all locator strategies exhausted")]
    ElementNotFound { field: String },

    /// An element was found but never became visible/clickable in time.
    #[error("timed out waiting for {what} after {waited_ms}ms")]
    InteractionTimeout { what: String, waited_ms: u64 },

    /// No iframe contained the probed target within the navigator timeout.
    #[error("no iframe contained '{probe}' within {timeout_ms}ms")]
    FrameNotFound { probe: String, timeout_ms: u64 },

    /// Failure reported by the underlying browser session.
    #[error("browser error: {0}")]
    Browser(String),

    /// Invalid descriptor or configuration data, caught before any
    /// browser interaction.
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl UiError {
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Whether a caller treating the target field as optional may recover.
    pub fn is_recoverable_for_optional_field(&self) -> bool {
        matches!(
            self,
            UiError::ElementNotFound { .. } | UiError::InteractionTimeout { .. }
        )
    }
}

/// Semantic description of one UI field to fill.
///
/// Candidate labels are ordered by priority: earlier entries are preferred
/// even when a later one would also match. Attribute keywords are matched
/// case- and diacritic-insensitively as substrings of
/// `name|id|placeholder|aria-label`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Human-readable field name, used only for diagnostics.
    pub name: String,

    /// Candidate label texts, tried in order.
    pub labels: Vec<String>,

    /// Attribute keyword hints.
    pub keywords: Vec<String>,

    /// The value to enter.
    pub value: String,

    /// Sensitive values (card number, CVV) are masked in diagnostic logs.
    pub sensitive: bool,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        labels: Vec<String>,
        keywords: Vec<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            labels,
            keywords,
            value: value.into(),
            sensitive: false,
        }
    }

    /// Mark the descriptor's value as sensitive for logging purposes.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Invariant check: at least one of {labels, keywords} must be non-empty.
    /// The resolver rejects descriptors that fail this before touching the
    /// browser.
    pub fn validate(&self) -> Result<(), UiError> {
        if self.labels.is_empty() && self.keywords.is_empty() {
            return Err(UiError::invalid(format!(
                "descriptor '{}' has neither label candidates nor attribute keywords",
                self.name
            )));
        }
        Ok(())
    }
}

/// Salutation options offered by the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Salutation {
    Mr,
    Ms,
}

impl Salutation {
    /// The visible option text in the (German) checkout UI.
    pub fn option_text(&self) -> &'static str {
        match self {
            Salutation::Mr => "Herr",
            Salutation::Ms => "Frau",
        }
    }
}

/// Immutable customer record passed into the flow. No behavior beyond
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerData {
    pub email: String,
    pub salutation: Option<Salutation>,
    pub first_name: String,
    pub last_name: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    /// Visible option text of the country entry, e.g. "Deutschland".
    pub country_label: Option<String>,
}

/// Immutable test card record. Construction validates the expiry so the
/// combined `MM/YY` slice used by the payment step is always well-defined;
/// a misconfigured year fails the run before the browser is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardData {
    pub holder: String,
    pub number: String,
    pub cvv: String,
    expiry_month: String,
    expiry_year: String,
}

impl CardData {
    pub fn new(
        holder: impl Into<String>,
        number: impl Into<String>,
        cvv: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
    ) -> Result<Self, UiError> {
        let expiry_month = expiry_month.into();
        let expiry_year = expiry_year.into();

        if expiry_month.len() != 2 || !expiry_month.chars().all(|c| c.is_ascii_digit()) {
            return Err(UiError::invalid(format!(
                "expiry month must be two digits, got '{expiry_month}'"
            )));
        }
        match expiry_month.parse::<u8>() {
            Ok(1..=12) => {}
            _ => {
                return Err(UiError::invalid(format!(
                    "expiry month out of range: '{expiry_month}'"
                )))
            }
        }
        if expiry_year.len() != 4 || !expiry_year.chars().all(|c| c.is_ascii_digit()) {
            return Err(UiError::invalid(format!(
                "expiry year must be four digits, got '{expiry_year}'"
            )));
        }

        Ok(Self {
            holder: holder.into(),
            number: number.into(),
            cvv: cvv.into(),
            expiry_month,
            expiry_year,
        })
    }

    pub fn expiry_month(&self) -> &str {
        &self.expiry_month
    }

    pub fn expiry_year(&self) -> &str {
        &self.expiry_year
    }

    /// Combined expiry in `MM/YY` form, e.g. "12/26".
    pub fn expiry_mm_yy(&self) -> String {
        format!("{}/{}", self.expiry_month, &self.expiry_year[2..])
    }
}

/// Terminal classification of one checkout attempt. Produced exactly once,
/// terminating the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Redirect URL contained "SUCCESS".
    SuccessUrl,
    /// Redirect URL contained "ERROR".
    ErrorUrl,
    /// Redirect URL contained "FAILURE" or "ABORT".
    FailureUrl,
    /// No redirect, but an on-page status element matched; carries its
    /// trimmed text.
    MessageText(String),
    /// Neither redirect nor status text observed before the deadline.
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::SuccessUrl => write!(f, "SUCCESS_URL"),
            Outcome::ErrorUrl => write!(f, "ERROR_URL"),
            Outcome::FailureUrl => write!(f, "FAILURE_URL"),
            Outcome::MessageText(text) => write!(f, "MESSAGE: {text}"),
            Outcome::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
