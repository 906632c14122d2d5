//! Xendit invoices API

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{PaymentSession, PaymentStatus};

use super::config::XenditConfig;
use super::{
    ChargeRequest, GatewayError, GatewayKind, PaymentGateway, XENDIT_BASE_URL, json_amount,
    json_string, read_json,
};

/// Invoice `payment_methods` channels
const METHODS: &[&str] = &[
    "BCA", "BNI", "BRI", "MANDIRI", "PERMATA", "OVO", "DANA", "LINKAJA", "SHOPEEPAY", "QRIS",
    "CREDIT_CARD",
];

pub struct XenditGateway {
    http: reqwest::Client,
    config: XenditConfig,
}

impl XenditGateway {
    pub fn new(http: reqwest::Client, config: XenditConfig) -> Self {
        Self { http, config }
    }
}

pub fn map_status(status: &str) -> PaymentStatus {
    match status.to_uppercase().as_str() {
        "PAID" | "SETTLED" => PaymentStatus::Paid,
        "EXPIRED" => PaymentStatus::Expired,
        _ => PaymentStatus::Pending,
    }
}

/// Normalize an invoice object (create and get return the same shape)
pub fn session_from_invoice(body: Value) -> Result<PaymentSession, GatewayError> {
    let reference = json_string(&body["id"])
        .ok_or_else(|| GatewayError::Response(format!("Xendit invoice missing id: {body}")))?;
    Ok(PaymentSession {
        gateway: GatewayKind::Xendit.as_str().to_string(),
        reference,
        status: map_status(body["status"].as_str().unwrap_or_default()),
        amount: json_amount(&body["amount"]).unwrap_or_default(),
        payment_url: json_string(&body["invoice_url"]),
        va_number: None,
        qr_string: None,
        expires_at: json_string(&body["expiry_date"]),
        raw: body,
    })
}

#[async_trait]
impl PaymentGateway for XenditGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Xendit
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError> {
        let mut payload = json!({
            "external_id": request.external_id,
            "amount": request.amount,
            "currency": "IDR",
            "description": request.description,
        });
        if let Some(email) = &request.customer.email {
            payload["payer_email"] = json!(email);
        }
        if request.customer.name.is_some() || request.customer.phone.is_some() {
            payload["customer"] = json!({
                "given_names": request.customer.name,
                "email": request.customer.email,
                "mobile_number": request.customer.phone,
            });
        }
        if let Some(method) = &request.method {
            payload["payment_methods"] = json!([method]);
        }

        let resp = self
            .http
            .post(format!("{XENDIT_BASE_URL}/v2/invoices"))
            .basic_auth(&self.config.secret_key, Some(""))
            .json(&payload)
            .send()
            .await?;
        session_from_invoice(read_json(resp).await?)
    }

    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError> {
        let resp = self
            .http
            .get(format!("{XENDIT_BASE_URL}/v2/invoices/{reference}"))
            .basic_auth(&self.config.secret_key, Some(""))
            .send()
            .await?;
        session_from_invoice(read_json(resp).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(map_status("PENDING"), PaymentStatus::Pending);
        assert_eq!(map_status("PAID"), PaymentStatus::Paid);
        assert_eq!(map_status("SETTLED"), PaymentStatus::Paid);
        assert_eq!(map_status("EXPIRED"), PaymentStatus::Expired);
    }

    #[test]
    fn invoice_is_normalized() {
        let session = session_from_invoice(json!({
            "id": "65f1a2b3c4d5",
            "external_id": "QIOS-1",
            "status": "PENDING",
            "amount": 55940,
            "invoice_url": "https://checkout-staging.xendit.co/web/65f1a2b3c4d5",
            "expiry_date": "2025-03-12T10:00:00.000Z",
        }))
        .unwrap();
        assert_eq!(session.reference, "65f1a2b3c4d5");
        assert_eq!(session.gateway, "xendit");
        assert_eq!(session.amount, 55_940.0);
        assert!(session.payment_url.is_some());
        assert!(session_from_invoice(json!({"status": "PENDING"})).is_err());
    }
}
