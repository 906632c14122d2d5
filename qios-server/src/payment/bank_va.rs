//! Bank virtual accounts via Xendit callback virtual accounts

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{PaymentSession, PaymentStatus};

use super::config::XenditConfig;
use super::{
    ChargeRequest, GatewayError, GatewayKind, PaymentGateway, XENDIT_BASE_URL, json_amount,
    json_string, read_json,
};

const METHODS: &[&str] = &["BCA", "BNI", "BRI", "MANDIRI", "PERMATA"];

/// Validity of a new virtual account
const VA_VALIDITY_HOURS: i64 = 24;

pub struct BankVaGateway {
    http: reqwest::Client,
    config: XenditConfig,
}

impl BankVaGateway {
    pub fn new(http: reqwest::Client, config: XenditConfig) -> Self {
        Self { http, config }
    }
}

/// Single-use closed VAs turn INACTIVE once paid or expired.
/// `now` decides between the two.
pub fn map_status(status: &str, expiration: Option<&str>, now: chrono::DateTime<chrono::Utc>) -> PaymentStatus {
    match status.to_uppercase().as_str() {
        "INACTIVE" => {
            let expired = expiration
                .and_then(|e| chrono::DateTime::parse_from_rfc3339(e).ok())
                .is_some_and(|e| e <= now);
            if expired {
                PaymentStatus::Expired
            } else {
                PaymentStatus::Paid
            }
        }
        _ => PaymentStatus::Pending,
    }
}

pub fn session_from_va(body: Value, now: chrono::DateTime<chrono::Utc>) -> Result<PaymentSession, GatewayError> {
    let reference = json_string(&body["id"])
        .ok_or_else(|| GatewayError::Response(format!("Xendit VA missing id: {body}")))?;
    let expires_at = json_string(&body["expiration_date"]);
    Ok(PaymentSession {
        gateway: GatewayKind::BankVa.as_str().to_string(),
        reference,
        status: map_status(
            body["status"].as_str().unwrap_or_default(),
            expires_at.as_deref(),
            now,
        ),
        amount: json_amount(&body["expected_amount"]).unwrap_or_default(),
        payment_url: None,
        va_number: json_string(&body["account_number"]),
        qr_string: None,
        expires_at,
        raw: body,
    })
}

#[async_trait]
impl PaymentGateway for BankVaGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::BankVa
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError> {
        let bank_code = request
            .method
            .clone()
            .ok_or_else(|| GatewayError::InvalidRequest("method (bank code) is required".into()))?;
        let expiration = chrono::Utc::now() + chrono::Duration::hours(VA_VALIDITY_HOURS);
        let payload = json!({
            "external_id": request.external_id,
            "bank_code": bank_code,
            "name": request.customer.name.clone().unwrap_or_else(|| "QIOS Customer".into()),
            "expected_amount": request.amount.round() as i64,
            "is_closed": true,
            "is_single_use": true,
            "expiration_date": expiration.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        });

        let resp = self
            .http
            .post(format!("{XENDIT_BASE_URL}/callback_virtual_accounts"))
            .basic_auth(&self.config.secret_key, Some(""))
            .json(&payload)
            .send()
            .await?;
        session_from_va(read_json(resp).await?, chrono::Utc::now())
    }

    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError> {
        let resp = self
            .http
            .get(format!("{XENDIT_BASE_URL}/callback_virtual_accounts/{reference}"))
            .basic_auth(&self.config.secret_key, Some(""))
            .send()
            .await?;
        session_from_va(read_json(resp).await?, chrono::Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&chrono::Utc)
    }

    #[test]
    fn inactive_means_paid_before_expiry() {
        let now = at("2025-03-11T10:00:00Z");
        assert_eq!(map_status("PENDING", None, now), PaymentStatus::Pending);
        assert_eq!(map_status("ACTIVE", None, now), PaymentStatus::Pending);
        assert_eq!(
            map_status("INACTIVE", Some("2025-03-12T10:00:00.000Z"), now),
            PaymentStatus::Paid
        );
        assert_eq!(
            map_status("INACTIVE", Some("2025-03-10T10:00:00.000Z"), now),
            PaymentStatus::Expired
        );
    }

    #[test]
    fn va_is_normalized() {
        let session = session_from_va(
            json!({
                "id": "va_123",
                "external_id": "QIOS-1",
                "bank_code": "BCA",
                "account_number": "1076612345678",
                "expected_amount": 55940,
                "status": "PENDING",
                "expiration_date": "2025-03-12T10:00:00.000Z",
            }),
            at("2025-03-11T10:00:00Z"),
        )
        .unwrap();
        assert_eq!(session.gateway, "bank_va");
        assert_eq!(session.va_number.as_deref(), Some("1076612345678"));
        assert_eq!(session.status, PaymentStatus::Pending);
        assert_eq!(session.amount, 55_940.0);
    }
}
