//! E-wallets (OVO, DANA, LinkAja, ShopeePay) via Xendit e-wallet charges

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::models::{PaymentSession, PaymentStatus};

use super::config::XenditConfig;
use super::{
    ChargeRequest, GatewayError, GatewayKind, PaymentGateway, XENDIT_BASE_URL, json_amount,
    json_string, read_json,
};

const METHODS: &[&str] = &["OVO", "DANA", "LINKAJA", "SHOPEEPAY"];

pub struct EwalletGateway {
    http: reqwest::Client,
    config: XenditConfig,
    redirect_url: String,
}

impl EwalletGateway {
    pub fn new(http: reqwest::Client, config: XenditConfig, redirect_url: String) -> Self {
        Self {
            http,
            config,
            redirect_url,
        }
    }
}

/// Xendit channel code for a wallet
pub fn channel_code(method: &str) -> Option<&'static str> {
    match method {
        "OVO" => Some("ID_OVO"),
        "DANA" => Some("ID_DANA"),
        "LINKAJA" => Some("ID_LINKAJA"),
        "SHOPEEPAY" => Some("ID_SHOPEEPAY"),
        _ => None,
    }
}

pub fn map_status(status: &str) -> PaymentStatus {
    match status.to_uppercase().as_str() {
        "SUCCEEDED" => PaymentStatus::Paid,
        "FAILED" | "VOIDED" => PaymentStatus::Failed,
        "REFUNDED" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

/// Build the charge body. OVO pushes to the app by phone number, the others
/// redirect through a checkout URL.
pub fn charge_payload(
    request: &ChargeRequest,
    redirect_url: &str,
) -> Result<Value, GatewayError> {
    let method = request
        .method
        .as_deref()
        .ok_or_else(|| GatewayError::InvalidRequest("method (e-wallet) is required".into()))?;
    let channel = channel_code(method).ok_or_else(|| GatewayError::InvalidMethod(method.into()))?;

    let channel_properties = if method == "OVO" {
        let phone = request.customer.phone.as_deref().ok_or_else(|| {
            GatewayError::InvalidRequest("customer.phone is required for OVO".into())
        })?;
        json!({ "mobile_number": normalize_phone(phone) })
    } else {
        json!({ "success_redirect_url": redirect_url })
    };

    Ok(json!({
        "reference_id": request.external_id,
        "currency": "IDR",
        "amount": request.amount.round() as i64,
        "checkout_method": "ONE_TIME_PAYMENT",
        "channel_code": channel,
        "channel_properties": channel_properties,
    }))
}

/// `08xx` → `+628xx` (E.164, as Xendit expects)
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if let Some(rest) = digits.strip_prefix('0') {
        format!("+62{rest}")
    } else if digits.starts_with("62") {
        format!("+{digits}")
    } else {
        format!("+62{digits}")
    }
}

pub fn session_from_charge(body: Value) -> Result<PaymentSession, GatewayError> {
    let reference = json_string(&body["id"])
        .ok_or_else(|| GatewayError::Response(format!("Xendit e-wallet charge missing id: {body}")))?;
    let actions = &body["actions"];
    let payment_url = json_string(&actions["mobile_web_checkout_url"])
        .or_else(|| json_string(&actions["desktop_web_checkout_url"]))
        .or_else(|| json_string(&actions["mobile_deeplink_checkout_url"]));
    Ok(PaymentSession {
        gateway: GatewayKind::Ewallet.as_str().to_string(),
        reference,
        status: map_status(body["status"].as_str().unwrap_or_default()),
        amount: json_amount(&body["charge_amount"])
            .or_else(|| json_amount(&body["amount"]))
            .unwrap_or_default(),
        payment_url,
        va_number: None,
        qr_string: json_string(&actions["qr_checkout_string"]),
        expires_at: None,
        raw: body,
    })
}

#[async_trait]
impl PaymentGateway for EwalletGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Ewallet
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn create(&self, request: &ChargeRequest) -> Result<PaymentSession, GatewayError> {
        let payload = charge_payload(request, &self.redirect_url)?;
        let resp = self
            .http
            .post(format!("{XENDIT_BASE_URL}/ewallets/charges"))
            .basic_auth(&self.config.secret_key, Some(""))
            .json(&payload)
            .send()
            .await?;
        session_from_charge(read_json(resp).await?)
    }

    async fn status(&self, reference: &str) -> Result<PaymentSession, GatewayError> {
        let resp = self
            .http
            .get(format!("{XENDIT_BASE_URL}/ewallets/charges/{reference}"))
            .basic_auth(&self.config.secret_key, Some(""))
            .send()
            .await?;
        session_from_charge(read_json(resp).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentCustomer;

    fn request(method: &str, phone: Option<&str>) -> ChargeRequest {
        ChargeRequest {
            external_id: "QIOS-1".into(),
            amount: 25_000.0,
            method: Some(method.into()),
            customer: PaymentCustomer {
                name: Some("Budi".into()),
                email: None,
                phone: phone.map(String::from),
            },
            bill_number: None,
            description: "Pesanan INV-1".into(),
        }
    }

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone("0812-3456-789"), "+628123456789");
        assert_eq!(normalize_phone("+62 812 3456 789"), "+628123456789");
        assert_eq!(normalize_phone("8123456789"), "+628123456789");
    }

    #[test]
    fn ovo_requires_phone() {
        let err = charge_payload(&request("OVO", None), "https://x").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));

        let body = charge_payload(&request("OVO", Some("08123456789")), "https://x").unwrap();
        assert_eq!(body["channel_code"], "ID_OVO");
        assert_eq!(body["channel_properties"]["mobile_number"], "+628123456789");
    }

    #[test]
    fn redirect_wallets_use_redirect_url() {
        let body = charge_payload(&request("DANA", None), "https://toko.id/finish").unwrap();
        assert_eq!(body["channel_code"], "ID_DANA");
        assert_eq!(
            body["channel_properties"]["success_redirect_url"],
            "https://toko.id/finish"
        );
        assert_eq!(body["amount"], 25_000);
    }

    #[test]
    fn charge_is_normalized() {
        let session = session_from_charge(json!({
            "id": "ewc_123",
            "status": "SUCCEEDED",
            "charge_amount": 25000,
            "actions": {"mobile_web_checkout_url": "https://link.dana.id/x"},
        }))
        .unwrap();
        assert_eq!(session.status, PaymentStatus::Paid);
        assert_eq!(session.payment_url.as_deref(), Some("https://link.dana.id/x"));
        assert_eq!(map_status("VOIDED"), PaymentStatus::Failed);
    }
}
