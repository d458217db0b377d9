//! Payvo API client

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::types::{ClientConfig, CreatePaymentRequest, AUTOPAYMENT_RETURN_URL};
use crate::{PayvoError, Result};

/// Client for the Payvo payment-processing API
///
/// Holds the merchant credentials and, between [`open`](Self::open) and
/// [`close`](Self::close), the HTTP session every operation goes through.
/// Operations take `&self` and may run concurrently; connection pooling is
/// left to the transport. Responses come back as raw JSON values, and no
/// retry is ever performed; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct PayvoClient {
    config: ClientConfig,
    session: Option<Client>,
}

impl PayvoClient {
    /// Create a client against the production API root
    pub fn new(merchant_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(merchant_id, secret_key))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Get the connection configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a session is currently open
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Open the HTTP session, bound to the fixed merchant auth headers.
    ///
    /// Must be called before any network operation. Dropping the client
    /// releases the session on every exit path; [`close`](Self::close) does
    /// so explicitly.
    pub fn open(&mut self) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("merchant-id", header_value(&self.config.merchant_id)?);
        headers.insert("merchant-secret-key", header_value(&self.config.secret_key)?);

        let session = Client::builder().default_headers(headers).build()?;
        self.session = Some(session);
        Ok(())
    }

    /// Close the HTTP session; further operations fail with `SessionClosed`
    pub fn close(&mut self) {
        self.session = None;
    }

    /// Create a payment
    ///
    /// `POST payments` with the deterministic payload built by
    /// [`CreatePaymentRequest::to_body`]; the decoded response is returned
    /// verbatim.
    pub async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<Value> {
        let body = Value::Object(request.to_body()?);
        debug!(payload = %body, "creating payment");
        let result = self.execute(Method::POST, "payments", Some(&body)).await?;
        info!(result = %result, "payment created");
        Ok(result)
    }

    /// Fetch a payment by its identifier
    pub async fn get_payment(&self, payment_uuid: &str) -> Result<Value> {
        debug!(payment_uuid, "fetching payment");
        let result = self
            .execute(Method::GET, &format!("payments/{payment_uuid}"), None)
            .await?;
        info!(result = %result, "payment fetched");
        Ok(result)
    }

    /// Issue a refund against a payment
    ///
    /// The refund amount goes over the wire as given, without minor-unit
    /// scaling; this asymmetry with payments is provider behavior. A missing
    /// description is sent as an explicit `null`.
    pub async fn create_refund(
        &self,
        payment_uuid: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Value> {
        let body = json!({
            "payment_uuid": payment_uuid,
            "amount": amount,
            "description": description,
        });
        debug!(payload = %body, "creating refund");
        let result = self.execute(Method::POST, "refunds", Some(&body)).await?;
        info!(result = %result, "refund created");
        Ok(result)
    }

    /// Fetch a refund by its identifier
    pub async fn get_refund(&self, refund_uuid: &str) -> Result<Value> {
        debug!(refund_uuid, "fetching refund");
        let result = self
            .execute(Method::GET, &format!("refunds/{refund_uuid}"), None)
            .await?;
        info!(result = %result, "refund fetched");
        Ok(result)
    }

    /// Start a recurring charge for a saved customer
    ///
    /// A specialization of [`create_payment`](Self::create_payment) with a
    /// placeholder return URL and `merchant_customer_id` /
    /// `save_payment_method` passed as extension fields. Failures are logged
    /// here as well and surfaced unchanged.
    pub async fn create_autopayment(
        &self,
        customer_id: &str,
        amount: Decimal,
        description: &str,
        save_payment_method: bool,
    ) -> Result<Value> {
        debug!(customer_id, "creating autopayment");
        let request = CreatePaymentRequest::new(amount, description, AUTOPAYMENT_RETURN_URL)
            .with_extra_field("merchant_customer_id", json!(customer_id))
            .with_extra_field("save_payment_method", json!(save_payment_method));

        match self.create_payment(&request).await {
            Ok(payment) => Ok(payment),
            Err(err) => {
                error!(customer_id, error = %err, "autopayment failed");
                Err(err)
            }
        }
    }

    /// Check a webhook payload against the merchant secret.
    ///
    /// A plain equality check on the payload's `secret_key` field: no HMAC,
    /// no timing-safe comparison. Callers needing real webhook authentication
    /// must supply their own mechanism.
    pub fn verify_webhook(payload: &Value, secret_key: &str) -> bool {
        payload.get("secret_key").and_then(Value::as_str) == Some(secret_key)
    }

    /// Shared request/response routine for all operations.
    ///
    /// Classifies every outcome: status >= 400 becomes `Http` with the raw
    /// body text; transport and decode failures keep their own kinds. Each
    /// error is logged exactly once here, then surfaced unchanged.
    async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let session = self.session.as_ref().ok_or(PayvoError::SessionClosed)?;
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = session.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(url = %url, error = %err, "request failed");
                return Err(err.into());
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                error!(url = %url, error = %err, "failed to read response body");
                return Err(err.into());
            }
        };

        if status >= 400 {
            error!(url = %url, status, body = %text, "request rejected");
            return Err(PayvoError::http(status, text));
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(url = %url, error = %err, "failed to decode response body");
                Err(err.into())
            }
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| PayvoError::invalid_argument("credential is not a valid header value"))
}
