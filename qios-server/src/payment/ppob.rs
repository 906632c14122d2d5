//! PPOB bill payments (electricity, water, BPJS, prepaid credit)
//!
//! Talks to a generic PPOB aggregator: every request is signed with
//! `sha256(username + api_key + ref_id)` and the reply wraps the transaction
//! in `data`.

use async_trait::async_trait;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use shared::models::{PaymentSession, PaymentStatus};

use super::config::PpobConfig;
use super::{
    ChargeRequest, GatewayError, GatewayKind, PaymentGateway, json_amount, json_string, read_json,
};

const METHODS: &[&str] = &["PLN", "PDAM", "BPJS", "PULSA"];

pub struct PpobGateway {
    http: reqwest::Client,
    config: PpobConfig,
}

impl PpobGateway {
    pub fn new(http: reqwest::Client, config: PpobConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

pub fn sign(username: &str, api_key: &str, ref_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(ref_id.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn map_status(status: &str) -> PaymentStatus {
    match status.to_lowercase().as_str() {
        "sukses" | "success" => PaymentStatus::Paid,
        "gagal" | "failed" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

pub fn transaction_payload(config: &PpobConfig, request: &ChargeRequest) -> Result<Value, GatewayError> {
    let product = request
        .method
        .as_deref()
        .ok_or_else(|| GatewayError::InvalidRequest("method (bill type) is required".into()))?;
    let customer_no = request
        .bill_number
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest("billNumber is required for PPOB".into()))?;
    Ok(json!({
        "username": config.username,
        "ref_id": request.external_id,
        "customer_no": customer_no,
        "product_code": product.to_lowercase(),
        "amount": request.amount.round() as i64,
        "sign": sign(&config.username, &config.api_key, &request.external_id),
    }))
}

/// The vendor reference is our `ref_id`; the aggregator has no id of its own
pub fn session_from_reply(ref_id: &str, body: Value) -> Result<PaymentSession, GatewayError> {
    let data = &body["data"];
    if !data.is_object() {
        return Err(GatewayError::Response(format!("PPOB reply missing data: {body}")));
    }
    Ok(PaymentSession {
        gateway: GatewayKind::Ppob.as_str().to_string(),
        reference: json_string(&data["ref_id"]).unwrap_or_else(|| ref_id.to_string()),
        status: map_status(data["status"].as_str().unwrap_or_default()),
        amount: json_amount(&data["amount"])
            .or_else(|| json_amount(&data["price"]))
            .unwrap_or_default(),
        payment_url: None,
        va_number: json_string(&data["sn"]),
        qr_string: None,
        expires_at: None,
        raw: body,
    })
}

#[async_trait]
impl PaymentGateway for PpobGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Ppob
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError> {
        let payload = transaction_payload(&self.config, request)?;
        let resp = self
            .http
            .post(self.endpoint("transaction"))
            .json(&payload)
            .send()
            .await?;
        session_from_reply(&request.external_id, read_json(resp).await?)
    }

    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError> {
        let payload = json!({
            "username": self.config.username,
            "ref_id": reference,
            "sign": sign(&self.config.username, &self.config.api_key, reference),
        });
        let resp = self
            .http
            .post(self.endpoint("status"))
            .json(&payload)
            .send()
            .await?;
        session_from_reply(reference, read_json(resp).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentCustomer;

    fn config() -> PpobConfig {
        PpobConfig {
            base_url: "https://ppob.example.id/api/".into(),
            username: "toko".into(),
            api_key: "secret".into(),
        }
    }

    fn request(bill: Option<&str>) -> ChargeRequest {
        ChargeRequest {
            external_id: "QIOS-77".into(),
            amount: 102_500.0,
            method: Some("PLN".into()),
            customer: PaymentCustomer::default(),
            bill_number: bill.map(String::from),
            description: "Token listrik".into(),
        }
    }

    #[test]
    fn sign_is_sha256_hex() {
        let s = sign("toko", "secret", "QIOS-77");
        assert_eq!(s.len(), 64);
        assert_eq!(s, sign("toko", "secret", "QIOS-77"));
        assert_ne!(s, sign("toko", "secret", "QIOS-78"));
    }

    #[test]
    fn bill_number_is_required() {
        assert!(matches!(
            transaction_payload(&config(), &request(None)),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            transaction_payload(&config(), &request(Some("  "))),
            Err(GatewayError::InvalidRequest(_))
        ));
        let body = transaction_payload(&config(), &request(Some("532110012345"))).unwrap();
        assert_eq!(body["customer_no"], "532110012345");
        assert_eq!(body["product_code"], "pln");
        assert_eq!(body["sign"], sign("toko", "secret", "QIOS-77"));
    }

    #[test]
    fn reply_is_normalized() {
        let session = session_from_reply(
            "QIOS-77",
            json!({"data": {"ref_id": "QIOS-77", "status": "Sukses", "price": 102500, "sn": "1234-5678"}}),
        )
        .unwrap();
        assert_eq!(session.status, PaymentStatus::Paid);
        assert_eq!(session.amount, 102_500.0);
        assert_eq!(map_status("Gagal"), PaymentStatus::Failed);
        assert_eq!(map_status("Pending"), PaymentStatus::Pending);
        assert!(session_from_reply("x", json!({"message": "error"})).is_err());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let gw = PpobGateway::new(reqwest::Client::new(), config());
        assert_eq!(gw.endpoint("transaction"), "https://ppob.example.id/api/transaction");
    }
}
