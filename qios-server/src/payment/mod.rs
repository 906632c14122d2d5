//! Payment gateway integrations via REST API (no SDK dependency)
//!
//! Every gateway is a thin pass-through to the vendor API that normalizes the
//! reply into a [`PaymentSession`]. No retries, no idempotency keys, no
//! webhook reconciliation: status is pulled synchronously on verify.

pub mod bank_va;
pub mod config;
pub mod ewallet;
pub mod factory;
pub mod midtrans;
pub mod ppob;
pub mod xendit;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{PaymentCustomer, PaymentSession};

pub use config::PaymentConfig;
pub use factory::{GatewayFactory, GatewayKind};

/// Xendit REST base URL (shared by invoice, VA and e-wallet gateways)
pub const XENDIT_BASE_URL: &str = "https://api.xendit.co";

/// Normalized create request handed to a gateway
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Our unique reference (external id / order id on the vendor side)
    pub external_id: String,
    pub amount: f64,
    /// Gateway specific channel, already validated against `methods()`
    pub method: Option<String>,
    pub customer: PaymentCustomer,
    pub bill_number: Option<String>,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected gateway response: {0}")]
    Response(String),

    #[error("Unsupported payment method: {0}")]
    InvalidMethod(String),

    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    #[error("Gateway signature mismatch")]
    Signature,
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidMethod(method) => {
                AppError::new(ErrorCode::PaymentInvalidMethod).with_detail("method", method)
            }
            GatewayError::InvalidRequest(msg) => AppError::invalid_request(msg),
            other => {
                tracing::error!(error = %other, "Payment gateway call failed");
                AppError::new(ErrorCode::PaymentGatewayError)
            }
        }
    }
}

/// A payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn kind(&self) -> GatewayKind;

    /// Channels accepted in `ChargeRequest::method` (empty: no channel choice)
    fn methods(&self) -> &'static [&'static str];

    /// Create a payment on the vendor side
    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError>;

    /// Query the current status of a payment by its vendor reference
    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError>;
}

/// Read a vendor JSON reply, turning non-2xx into `GatewayError::Api`
pub(crate) async fn read_json(resp: reqwest::Response) -> Result<serde_json::Value, GatewayError> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;
    if !status.is_success() {
        let message = ["message", "error_message", "status_message", "error_code"]
            .iter()
            .find_map(|k| json_string(&body[*k]))
            .or_else(|| body["error_messages"][0].as_str().map(String::from))
            .unwrap_or_else(|| body.to_string());
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

/// Vendor amounts arrive as numbers or decimal strings ("10000.00")
pub(crate) fn json_amount(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

pub(crate) fn json_string(value: &serde_json::Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(String::from)
}

/// Reject a method the gateway does not support
pub(crate) fn check_method(
    gateway: &dyn PaymentGateway,
    method: Option<&str>,
) -> Result<Option<String>, GatewayError> {
    let Some(method) = method.map(|m| m.trim().to_uppercase()) else {
        return Ok(None);
    };
    if gateway.methods().is_empty() || gateway.methods().contains(&method.as_str()) {
        Ok(Some(method))
    } else {
        Err(GatewayError::InvalidMethod(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_accept_numbers_and_strings() {
        assert_eq!(json_amount(&json!(10000)), Some(10000.0));
        assert_eq!(json_amount(&json!("10000.00")), Some(10000.0));
        assert_eq!(json_amount(&json!(null)), None);
    }

    #[test]
    fn gateway_errors_map_to_app_errors() {
        let app: AppError = GatewayError::InvalidMethod("GOPAY".into()).into();
        assert_eq!(app.code, ErrorCode::PaymentInvalidMethod);

        let app: AppError = GatewayError::Api {
            status: 401,
            message: "unauthorized".into(),
        }
        .into();
        assert_eq!(app.code, ErrorCode::PaymentGatewayError);
        assert_eq!(app.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
