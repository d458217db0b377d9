//! Core types for the Payvo API

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{PayvoError, Result};

/// Production root of the Payvo public API
pub const PRODUCTION_URL: &str = "https://api.payvo.ru/public/";

/// Return URL substituted for autopayments, which involve no browser redirect
pub const AUTOPAYMENT_RETURN_URL: &str = "https://example.com/return";

/// Connection configuration for a [`PayvoClient`](crate::PayvoClient)
///
/// Immutable once the client is constructed. Credentials are not validated;
/// an empty merchant id is accepted and will simply be rejected remotely.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Merchant identifier, sent as the `merchant-id` header
    pub merchant_id: String,
    /// Merchant secret key, sent as the `merchant-secret-key` header
    pub secret_key: String,
    /// API root; every request path is appended to this
    pub base_url: String,
}

impl ClientConfig {
    /// Configuration against the production API root
    pub fn new(merchant_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            secret_key: secret_key.into(),
            base_url: PRODUCTION_URL.to_string(),
        }
    }

    /// Point the client at a different API root (staging, a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Convert a major-unit amount to integer minor units (kopecks).
///
/// This is applied exactly once, at the wire boundary, so callers keep working
/// in major units throughout. Half-way values round to even.
pub fn minor_units(amount: Decimal) -> Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| {
            PayvoError::invalid_argument(format!("amount {amount} is not representable in minor units"))
        })
}

/// One line item of a fiscal receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// Human-readable description of the line item
    pub description: String,
    /// Price in major currency units; scaled to minor units on the wire
    pub amount: Decimal,
    /// VAT code as defined by the provider
    pub vat_code: u32,
    /// Number of units
    pub quantity: u32,
}

impl ReceiptItem {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        vat_code: u32,
        quantity: u32,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            vat_code,
            quantity,
        }
    }

    fn to_wire(&self) -> Result<Value> {
        Ok(json!({
            "description": self.description,
            "amount": minor_units(self.amount)?,
            "vat_code": self.vat_code,
            "quantity": self.quantity,
        }))
    }
}

/// Parameters for [`PayvoClient::create_payment`](crate::PayvoClient::create_payment)
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    /// Charge amount in major currency units
    pub amount: Decimal,
    /// Payment description shown to the payer
    pub description: String,
    /// Where the payer is redirected after confirmation; must be non-empty
    pub return_url: String,
    /// Customer email for the fiscal receipt
    pub email: Option<String>,
    /// Fiscal receipt line items
    pub items: Vec<ReceiptItem>,
    /// Preselected payment method token, sent verbatim when present
    pub payment_method_type: Option<String>,
    /// Free-form fields merged into the payload last; colliding keys win
    pub extra: Map<String, Value>,
}

impl CreatePaymentRequest {
    pub fn new(
        amount: Decimal,
        description: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            return_url: return_url.into(),
            email: None,
            items: Vec::new(),
            payment_method_type: None,
            extra: Map::new(),
        }
    }

    /// Set the customer email for the receipt
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the receipt line items
    pub fn with_items(mut self, items: Vec<ReceiptItem>) -> Self {
        self.items = items;
        self
    }

    /// Preselect a payment method type
    pub fn with_payment_method_type(mut self, payment_method_type: impl Into<String>) -> Self {
        self.payment_method_type = Some(payment_method_type.into());
        self
    }

    /// Replace the free-form extension fields
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Add one free-form extension field
    pub fn with_extra_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Build the wire payload for this request.
    ///
    /// Fails with `InvalidArgument` before any network I/O if `return_url`
    /// is empty or the amount does not fit in minor units.
    pub fn to_body(&self) -> Result<Map<String, Value>> {
        if self.return_url.is_empty() {
            return Err(PayvoError::invalid_argument("return_url is required"));
        }

        let mut body = Map::new();
        body.insert("amount".into(), json!(minor_units(self.amount)?));
        body.insert("description".into(), json!(self.description));
        body.insert(
            "confirmation".into(),
            json!({
                "type": "redirect",
                "return_url": self.return_url,
            }),
        );

        if let Some(payment_method_type) =
            self.payment_method_type.as_deref().filter(|t| !t.is_empty())
        {
            body.insert("payment_method_type".into(), json!(payment_method_type));
        }

        // The receipt block needs both a customer email and line items;
        // either one alone drops the block entirely.
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !self.items.is_empty() {
                let items = self
                    .items
                    .iter()
                    .map(ReceiptItem::to_wire)
                    .collect::<Result<Vec<_>>>()?;
                body.insert(
                    "receipt".into(),
                    json!({
                        "customer": { "email": email },
                        "items": items,
                    }),
                );
            }
        }

        // Extension fields merge last and may overwrite anything set above,
        // including amount and confirmation. Intentional pass-through.
        for (key, value) in &self.extra {
            body.insert(key.clone(), value.clone());
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_minor_units_scaling() {
        assert_eq!(minor_units(dec("100.0")).unwrap(), 10000);
        assert_eq!(minor_units(dec("19.99")).unwrap(), 1999);
        assert_eq!(minor_units(dec("0")).unwrap(), 0);
        assert_eq!(minor_units(dec("0.01")).unwrap(), 1);
    }

    #[test]
    fn test_minor_units_overflow() {
        let huge = Decimal::MAX;
        assert!(matches!(
            minor_units(huge),
            Err(PayvoError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_body_minimal() {
        let body = CreatePaymentRequest::new(dec("10.0"), "order", "https://shop.test/ok")
            .to_body()
            .unwrap();
        assert_eq!(body["amount"], json!(1000));
        assert_eq!(body["description"], json!("order"));
        assert_eq!(
            body["confirmation"],
            json!({"type": "redirect", "return_url": "https://shop.test/ok"})
        );
        assert!(!body.contains_key("receipt"));
        assert!(!body.contains_key("payment_method_type"));
    }

    #[test]
    fn test_empty_return_url_rejected() {
        let err = CreatePaymentRequest::new(dec("10.0"), "order", "")
            .to_body()
            .unwrap_err();
        assert!(matches!(err, PayvoError::InvalidArgument { .. }));
    }

    #[test]
    fn test_receipt_requires_both_email_and_items() {
        let email_only = CreatePaymentRequest::new(dec("10.0"), "order", "https://shop.test/ok")
            .with_email("buyer@example.com")
            .to_body()
            .unwrap();
        assert!(!email_only.contains_key("receipt"));

        let items_only = CreatePaymentRequest::new(dec("10.0"), "order", "https://shop.test/ok")
            .with_items(vec![ReceiptItem::new("Item 1", dec("100.0"), 1, 1)])
            .to_body()
            .unwrap();
        assert!(!items_only.contains_key("receipt"));
    }

    #[test]
    fn test_receipt_items_scaled() {
        let body = CreatePaymentRequest::new(dec("100.0"), "order", "https://shop.test/ok")
            .with_email("buyer@example.com")
            .with_items(vec![ReceiptItem::new("Item 1", dec("100.0"), 1, 1)])
            .to_body()
            .unwrap();
        assert_eq!(
            body["receipt"],
            json!({
                "customer": { "email": "buyer@example.com" },
                "items": [
                    { "description": "Item 1", "amount": 10000, "vat_code": 1, "quantity": 1 }
                ]
            })
        );
    }

    #[test]
    fn test_payment_method_type_verbatim() {
        let body = CreatePaymentRequest::new(dec("10.0"), "order", "https://shop.test/ok")
            .with_payment_method_type("bank_card")
            .to_body()
            .unwrap();
        assert_eq!(body["payment_method_type"], json!("bank_card"));
    }

    #[test]
    fn test_extra_overwrites_existing_keys() {
        let body = CreatePaymentRequest::new(dec("10.0"), "order", "https://shop.test/ok")
            .with_extra_field("description", json!("override"))
            .with_extra_field("capture", json!(true))
            .to_body()
            .unwrap();
        assert_eq!(body["description"], json!("override"));
        assert_eq!(body["capture"], json!(true));
        // untouched keys survive the merge
        assert_eq!(body["amount"], json!(1000));
    }

    #[test]
    fn test_config_defaults_to_production() {
        let config = ClientConfig::new("m-1", "sk-1");
        assert_eq!(config.base_url, PRODUCTION_URL);

        let config = config.with_base_url("http://localhost:9000/");
        assert_eq!(config.base_url, "http://localhost:9000/");
    }
}
