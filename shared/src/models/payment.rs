//! Gateway Payment Model

use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Persisted gateway payment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub store_id: i64,
    pub order_id: Option<i64>,
    pub gateway: String,
    pub method: Option<String>,
    pub reference: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_url: Option<String>,
    pub va_number: Option<String>,
    pub qr_string: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Customer details forwarded to the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreate {
    pub store_id: i64,
    pub gateway: String,
    pub order_id: Option<i64>,
    pub amount: f64,
    /// Gateway specific channel, e.g. `BCA`, `OVO`, `PLN`
    pub method: Option<String>,
    #[serde(default)]
    pub customer: PaymentCustomer,
    /// Utility bill customer number (PPOB)
    pub bill_number: Option<String>,
    pub description: Option<String>,
}

/// Verify payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerify {
    pub store_id: i64,
    pub gateway: String,
    pub reference: String,
}

/// Normalized gateway response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub gateway: String,
    pub reference: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub payment_url: Option<String>,
    pub va_number: Option<String>,
    pub qr_string: Option<String>,
    pub expires_at: Option<String>,
    /// Untouched vendor response
    pub raw: serde_json::Value,
}

/// Entry of `GET /api/payment/gateways`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInfo {
    pub name: String,
    pub display_name: String,
    pub methods: Vec<String>,
}
