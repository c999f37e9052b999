//! Order and payment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::observation::{deserialize_optional_date, deserialize_price};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: String,
    pub product_name: String,
    pub market_name: String,
    pub transaction_id: String,
    pub price: f64,
    pub buyer_name: String,
    pub buyer_email: String,
    pub date: DateTime<Utc>,
}

/// Request for a server-side payment intent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Smallest currency unit
    pub amount: i64,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status.as_deref() == Some("succeeded")
    }

    /// The processor's intent id; the client secret is `<id>_secret_<nonce>`
    pub fn transaction_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self
                .client_secret
                .split("_secret_")
                .next()
                .unwrap_or(&self.client_secret)
                .to_string(),
        }
    }
}

/// Result of the `buy` flow
#[derive(Debug)]
pub struct PurchaseResult {
    pub product_name: String,
    pub amount: f64,
    pub transaction_id: String,
    /// False while the processor still needs client-side confirmation
    pub order_placed: bool,
    /// Present while the payment still has to be confirmed with the processor
    pub client_secret: Option<String>,
}

/// Convert a display price to the smallest currency unit
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_from_secret() {
        let intent: PaymentIntent =
            serde_json::from_str(r#"{"clientSecret": "pi_123_secret_abc"}"#).unwrap();
        assert_eq!(intent.transaction_id(), "pi_123");
        assert!(!intent.is_succeeded());

        let intent: PaymentIntent = serde_json::from_str(
            r#"{"clientSecret": "pi_9_secret_x", "id": "pi_9", "status": "succeeded"}"#,
        )
        .unwrap();
        assert_eq!(intent.transaction_id(), "pi_9");
        assert!(intent.is_succeeded());
    }

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(to_minor_units(45.0), 4500);
        assert_eq!(to_minor_units(19.99), 1999);
    }
}
