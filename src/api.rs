//! Client for the payment provider's REST API: OAuth client-credentials
//! auth, Smart Transaction creation and post-hoc status lookup.

use reqwest::Response;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} (expected 2xx) for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("response missing {0}")]
    MissingField(&'static str),
    #[error("malformed response body: {0}")]
    Malformed(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

/// The two values the UI flow consumes from transaction creation.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub transaction_id: String,
    pub checkout_url: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent("checkout-harness/0.1")
            .build()?;
        Ok(Self {
            http,
            config,
            access_token: None,
        })
    }

    /// OAuth client-credentials grant; stores the bearer token for
    /// subsequent calls.
    pub async fn authenticate(&mut self) -> Result<(), ApiError> {
        info!("authenticating against payment API");
        let response = self
            .http
            .post(self.config.auth_endpoint())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;
        let body = ensure_2xx(response).await?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or(ApiError::MissingField("access_token"))?;
        self.access_token = Some(token.to_string());
        info!("authentication succeeded");
        Ok(())
    }

    /// Create a Smart Transaction and extract its id plus the hosted
    /// checkout URL.
    pub async fn create_transaction(&self) -> Result<CheckoutSession, ApiError> {
        let token = self.bearer()?;
        info!("creating transaction");
        let response = self
            .http
            .post(self.config.transaction_endpoint())
            .bearer_auth(token)
            .json(&self.transaction_payload())
            .send()
            .await?;
        let body = ensure_2xx(response).await?;

        let transaction_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ApiError::MissingField("transaction id"))?
            .to_string();
        let checkout_url =
            extract_checkout_url(&body).ok_or(ApiError::MissingField("checkout url"))?;

        info!(%transaction_id, %checkout_url, "transaction created");
        Ok(CheckoutSession {
            transaction_id,
            checkout_url,
        })
    }

    /// Fetch the raw transaction resource for status verification.
    pub async fn transaction_status(&self, transaction_id: &str) -> Result<Value, ApiError> {
        let token = self.bearer()?;
        let url = format!("{}{transaction_id}", self.config.transaction_endpoint());
        let response = self.http.get(url).bearer_auth(token).send().await?;
        ensure_2xx(response).await
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.access_token
            .as_deref()
            .ok_or(ApiError::NotAuthenticated)
    }

    fn transaction_payload(&self) -> Value {
        json!({
            "intent": "sale",
            "is_demo": false,
            "contract": { "object": "general.contracts", "id": self.config.contract_id },
            "basket": {
                "products": [{
                    "id": 1,
                    "parent": null,
                    "item_type": "article",
                    "desc": "Test-Produkt",
                    "articleNumber": "TEST-001",
                    "ean": "",
                    "quantity": 1,
                    "priceOne": 1000,
                    "tax": 19,
                    "reference_id": null,
                    "group": []
                }]
            },
            "basket_info": { "sum": 1000, "currency": "EUR" },
            "transactionRef": "",
            "merchantRef": self.config.merchant_ref,
            "application_context": {
                "return_urls": {
                    "url_success": "https://example.org/SUCCESS",
                    "url_error": "https://example.org/ERROR",
                    "url_abort": "https://example.org/FAILURE"
                },
                "checkout_template": self.config.checkout_template,
                "language": "de"
            },
            "payment_context": {
                "auto_capture": true,
                "payment_methods": null,
                "merchant_initiated": false,
                "accrual": false,
                "creditcard_schemes": ["visa", "mastercard"]
            }
        })
    }
}

async fn ensure_2xx(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url,
            body,
        });
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Malformed(err.to_string()))
}

/// Checkout URL extraction fallback chain over the creation response:
/// `links.checkout.href`, `links.checkout_url`, the per-method
/// `payment_links`, then the flat top-level fields.
fn extract_checkout_url(body: &Value) -> Option<String> {
    let links = body.get("links");
    let from_links = links
        .and_then(|l| l.get("checkout"))
        .and_then(|c| c.get("href"))
        .and_then(Value::as_str)
        .or_else(|| {
            links
                .and_then(|l| l.get("checkout_url"))
                .and_then(Value::as_str)
        });

    let payment_links = body.get("payment_links");
    let from_payment_links = ["creditcard", "general", "prepaid"].iter().find_map(|key| {
        payment_links
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
    });

    from_links
        .or(from_payment_links)
        .or_else(|| body.get("checkout_url").and_then(Value::as_str))
        .or_else(|| body.get("redirect_url").and_then(Value::as_str))
        .or_else(|| body.get("url").and_then(Value::as_str))
        .map(str::to_string)
}

/// Status field of the transaction resource, wherever the API put it.
pub fn extract_status(body: &Value) -> Option<&str> {
    body.get("status")
        .and_then(Value::as_str)
        .or_else(|| body.get("transaction_status").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            client_id: "client".into(),
            client_secret: "secret".into(),
            contract_id: "GCR-123".into(),
            ..ApiConfig::default()
        }
    }

    async fn authenticated_client(server: &MockServer) -> ApiClient {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-1" })),
            )
            .mount(server)
            .await;

        let mut client = ApiClient::new(test_config(server.uri())).unwrap();
        client.authenticate().await.unwrap();
        client
    }

    #[tokio::test]
    async fn authenticate_stores_bearer_token() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;
        assert_eq!(client.bearer().unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn unauthenticated_client_refuses_calls() {
        let client = ApiClient::new(test_config("http://localhost:1".into())).unwrap();
        assert!(matches!(
            client.create_transaction().await.unwrap_err(),
            ApiError::NotAuthenticated
        ));
    }

    #[tokio::test]
    async fn create_transaction_extracts_id_and_url() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v2/Smart/Transactions/"))
            .and(body_string_contains("general.contracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "STX-1",
                "links": { "checkout": { "href": "https://checkout.example/STX-1" } }
            })))
            .mount(&server)
            .await;

        let session = client.create_transaction().await.unwrap();
        assert_eq!(session.transaction_id, "STX-1");
        assert_eq!(session.checkout_url, "https://checkout.example/STX-1");
    }

    #[tokio::test]
    async fn non_2xx_surfaces_status_and_body() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v2/Smart/Transactions/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        match client.create_transaction().await.unwrap_err() {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn transaction_status_fetches_resource() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/Smart/Transactions/STX-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "approved" })),
            )
            .mount(&server)
            .await;

        let body = client.transaction_status("STX-1").await.unwrap();
        assert_eq!(extract_status(&body), Some("approved"));
    }

    #[test]
    fn checkout_url_fallback_chain() {
        let cases = [
            (
                json!({ "links": { "checkout": { "href": "https://a" } }, "url": "https://z" }),
                Some("https://a"),
            ),
            (
                json!({ "links": { "checkout_url": "https://b" } }),
                Some("https://b"),
            ),
            (
                json!({ "payment_links": { "general": "https://c" } }),
                Some("https://c"),
            ),
            (
                json!({ "payment_links": { "creditcard": "https://d", "general": "https://x" } }),
                Some("https://d"),
            ),
            (json!({ "checkout_url": "https://e" }), Some("https://e")),
            (json!({ "redirect_url": "https://f" }), Some("https://f")),
            (json!({ "url": "https://g" }), Some("https://g")),
            (json!({ "id": "STX-1" }), None),
        ];
        for (body, want) in cases {
            assert_eq!(extract_checkout_url(&body).as_deref(), want, "{body}");
        }
    }

    #[test]
    fn status_lookup_checks_both_fields() {
        assert_eq!(
            extract_status(&json!({ "transaction_status": "failed" })),
            Some("failed")
        );
        assert_eq!(extract_status(&json!({})), None);
    }
}
