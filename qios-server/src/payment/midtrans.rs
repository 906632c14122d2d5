//! Midtrans: Snap transactions + status API

use async_trait::async_trait;
use serde_json::{Value, json};
use sha2::{Digest, Sha512};
use shared::models::{PaymentSession, PaymentStatus};

use super::config::MidtransConfig;
use super::{ChargeRequest, GatewayError, GatewayKind, PaymentGateway, json_amount, json_string, read_json};

/// Snap `enabled_payments` channels
const METHODS: &[&str] = &[
    "CREDIT_CARD",
    "GOPAY",
    "SHOPEEPAY",
    "QRIS",
    "BCA_VA",
    "BNI_VA",
    "BRI_VA",
    "PERMATA_VA",
    "ECHANNEL",
    "INDOMARET",
    "ALFAMART",
];

pub struct MidtransGateway {
    http: reqwest::Client,
    config: MidtransConfig,
}

impl MidtransGateway {
    pub fn new(http: reqwest::Client, config: MidtransConfig) -> Self {
        Self { http, config }
    }
}

/// Map Midtrans `transaction_status` (+ `fraud_status` for card captures)
pub fn map_status(transaction_status: &str, fraud_status: Option<&str>) -> PaymentStatus {
    match transaction_status {
        "settlement" => PaymentStatus::Paid,
        "capture" => match fraud_status {
            Some("challenge") | Some("deny") => PaymentStatus::Pending,
            _ => PaymentStatus::Paid,
        },
        "expire" => PaymentStatus::Expired,
        "deny" | "cancel" | "failure" => PaymentStatus::Failed,
        "refund" | "partial_refund" | "chargeback" | "partial_chargeback" => {
            PaymentStatus::Refunded
        }
        _ => PaymentStatus::Pending,
    }
}

/// `SHA512(order_id + status_code + gross_amount + server_key)`
pub fn signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify `signature_key` of a status reply when present
pub fn verify_signature(body: &Value, server_key: &str) -> Result<(), GatewayError> {
    let Some(received) = body["signature_key"].as_str() else {
        return Ok(());
    };
    let expected = signature(
        body["order_id"].as_str().unwrap_or_default(),
        body["status_code"].as_str().unwrap_or_default(),
        body["gross_amount"].as_str().unwrap_or_default(),
        server_key,
    );
    if expected.eq_ignore_ascii_case(received) {
        Ok(())
    } else {
        Err(GatewayError::Signature)
    }
}

/// Normalize a Snap create reply (`{token, redirect_url}`)
pub fn session_from_snap(order_id: &str, amount: f64, body: Value) -> Result<PaymentSession, GatewayError> {
    let payment_url = json_string(&body["redirect_url"])
        .ok_or_else(|| GatewayError::Response(format!("Midtrans Snap missing redirect_url: {body}")))?;
    Ok(PaymentSession {
        gateway: GatewayKind::Midtrans.as_str().to_string(),
        reference: order_id.to_string(),
        status: PaymentStatus::Pending,
        amount,
        payment_url: Some(payment_url),
        va_number: None,
        qr_string: None,
        expires_at: None,
        raw: body,
    })
}

/// Normalize a status API reply
pub fn session_from_status(order_id: &str, body: Value) -> PaymentSession {
    let status = map_status(
        body["transaction_status"].as_str().unwrap_or_default(),
        body["fraud_status"].as_str(),
    );
    let va_number = json_string(&body["va_numbers"][0]["va_number"])
        .or_else(|| json_string(&body["permata_va_number"]))
        .or_else(|| json_string(&body["bill_key"]));
    PaymentSession {
        gateway: GatewayKind::Midtrans.as_str().to_string(),
        reference: order_id.to_string(),
        status,
        amount: json_amount(&body["gross_amount"]).unwrap_or_default(),
        payment_url: None,
        va_number,
        qr_string: json_string(&body["qr_string"]),
        expires_at: json_string(&body["expiry_time"]),
        raw: body,
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Midtrans
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError> {
        // Midtrans takes whole Rupiah
        let gross_amount = request.amount.round() as i64;
        let mut payload = json!({
            "transaction_details": {
                "order_id": request.external_id,
                "gross_amount": gross_amount,
            },
            "customer_details": {
                "first_name": request.customer.name,
                "email": request.customer.email,
                "phone": request.customer.phone,
            },
        });
        if let Some(method) = &request.method {
            payload["enabled_payments"] = json!([method.to_lowercase()]);
        }

        let resp = self
            .http
            .post(format!("{}/snap/v1/transactions", self.config.snap_base_url()))
            .basic_auth(&self.config.server_key, Some(""))
            .json(&payload)
            .send()
            .await?;
        let body = read_json(resp).await?;
        session_from_snap(&request.external_id, gross_amount as f64, body)
    }

    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError> {
        let resp = self
            .http
            .get(format!("{}/v2/{reference}/status", self.config.api_base_url()))
            .basic_auth(&self.config.server_key, Some(""))
            .send()
            .await?;
        let body = read_json(resp).await?;
        // Midtrans reports "not found" with HTTP 200 and status_code 404
        if body["status_code"].as_str() == Some("404") {
            return Err(GatewayError::Api {
                status: 404,
                message: json_string(&body["status_message"])
                    .unwrap_or_else(|| "Transaction doesn't exist".into()),
            });
        }
        verify_signature(&body, &self.config.server_key)?;
        Ok(session_from_status(reference, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(map_status("settlement", None), PaymentStatus::Paid);
        assert_eq!(map_status("capture", Some("accept")), PaymentStatus::Paid);
        assert_eq!(map_status("capture", Some("challenge")), PaymentStatus::Pending);
        assert_eq!(map_status("pending", None), PaymentStatus::Pending);
        assert_eq!(map_status("expire", None), PaymentStatus::Expired);
        assert_eq!(map_status("deny", None), PaymentStatus::Failed);
        assert_eq!(map_status("cancel", None), PaymentStatus::Failed);
        assert_eq!(map_status("refund", None), PaymentStatus::Refunded);
        assert_eq!(map_status("something-new", None), PaymentStatus::Pending);
    }

    #[test]
    fn signature_verification() {
        let sig = signature("QIOS-1", "200", "55940.00", "server-key");
        assert_eq!(sig.len(), 128);
        let body = json!({
            "order_id": "QIOS-1",
            "status_code": "200",
            "gross_amount": "55940.00",
            "signature_key": sig,
        });
        assert!(verify_signature(&body, "server-key").is_ok());
        assert!(matches!(
            verify_signature(&body, "other-key"),
            Err(GatewayError::Signature)
        ));
        assert!(verify_signature(&json!({"order_id": "x"}), "k").is_ok());
    }

    #[test]
    fn status_reply_is_normalized() {
        let session = session_from_status(
            "QIOS-1",
            json!({
                "transaction_status": "settlement",
                "gross_amount": "55940.00",
                "va_numbers": [{"bank": "bca", "va_number": "12345678901"}],
                "expiry_time": "2025-03-12 10:00:00",
            }),
        );
        assert_eq!(session.status, PaymentStatus::Paid);
        assert_eq!(session.amount, 55_940.0);
        assert_eq!(session.va_number.as_deref(), Some("12345678901"));
        assert_eq!(session.expires_at.as_deref(), Some("2025-03-12 10:00:00"));
    }

    #[test]
    fn snap_reply_requires_redirect_url() {
        let ok = session_from_snap(
            "QIOS-1",
            10_000.0,
            json!({"token": "t", "redirect_url": "https://app.sandbox.midtrans.com/snap/v4/t"}),
        )
        .unwrap();
        assert_eq!(ok.status, PaymentStatus::Pending);
        assert!(ok.payment_url.is_some());
        assert!(session_from_snap("QIOS-1", 1.0, json!({"token": "t"})).is_err());
    }
}
