//! Gateway selection

use std::fmt;
use std::str::FromStr;

use shared::error::{AppError, ErrorCode};
use shared::models::GatewayInfo;

use super::bank_va::BankVaGateway;
use super::config::PaymentConfig;
use super::ewallet::EwalletGateway;
use super::midtrans::MidtransGateway;
use super::ppob::PpobGateway;
use super::xendit::XenditGateway;
use super::PaymentGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayKind {
    Midtrans,
    Xendit,
    BankVa,
    Ewallet,
    Ppob,
}

impl GatewayKind {
    pub const ALL: [GatewayKind; 5] = [
        GatewayKind::Midtrans,
        GatewayKind::Xendit,
        GatewayKind::BankVa,
        GatewayKind::Ewallet,
        GatewayKind::Ppob,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Midtrans => "midtrans",
            GatewayKind::Xendit => "xendit",
            GatewayKind::BankVa => "bank_va",
            GatewayKind::Ewallet => "ewallet",
            GatewayKind::Ppob => "ppob",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GatewayKind::Midtrans => "Midtrans Snap",
            GatewayKind::Xendit => "Xendit Invoice",
            GatewayKind::BankVa => "Virtual Account Bank",
            GatewayKind::Ewallet => "E-Wallet",
            GatewayKind::Ppob => "PPOB / Tagihan",
        }
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "midtrans" => Ok(GatewayKind::Midtrans),
            "xendit" => Ok(GatewayKind::Xendit),
            "bank_va" | "va" => Ok(GatewayKind::BankVa),
            "ewallet" | "e_wallet" => Ok(GatewayKind::Ewallet),
            "ppob" => Ok(GatewayKind::Ppob),
            _ => Err(unavailable(s)),
        }
    }
}

fn unavailable(name: &str) -> AppError {
    AppError::new(ErrorCode::PaymentGatewayUnavailable).with_detail("gateway", name)
}

/// Builds gateway clients from the payment configuration
#[derive(Clone)]
pub struct GatewayFactory {
    config: PaymentConfig,
    http: reqwest::Client,
}

impl GatewayFactory {
    pub fn new(config: PaymentConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Gateway client for `kind`, or `PaymentGatewayUnavailable` when unconfigured
    pub fn create(&self, kind: GatewayKind) -> Result<Box<dyn PaymentGateway>, AppError> {
        let http = self.http.clone();
        let gateway: Box<dyn PaymentGateway> = match kind {
            GatewayKind::Midtrans => {
                let cfg = self.config.midtrans.clone().ok_or_else(|| unavailable(kind.as_str()))?;
                Box::new(MidtransGateway::new(http, cfg))
            }
            GatewayKind::Xendit => {
                let cfg = self.config.xendit.clone().ok_or_else(|| unavailable(kind.as_str()))?;
                Box::new(XenditGateway::new(http, cfg))
            }
            GatewayKind::BankVa => {
                let cfg = self.config.xendit.clone().ok_or_else(|| unavailable(kind.as_str()))?;
                Box::new(BankVaGateway::new(http, cfg))
            }
            GatewayKind::Ewallet => {
                let cfg = self.config.xendit.clone().ok_or_else(|| unavailable(kind.as_str()))?;
                Box::new(EwalletGateway::new(
                    http,
                    cfg,
                    self.config.redirect_url.clone(),
                ))
            }
            GatewayKind::Ppob => {
                let cfg = self.config.ppob.clone().ok_or_else(|| unavailable(kind.as_str()))?;
                Box::new(PpobGateway::new(http, cfg))
            }
        };
        Ok(gateway)
    }

    /// Parse a gateway name and build its client
    pub fn create_by_name(&self, name: &str) -> Result<Box<dyn PaymentGateway>, AppError> {
        self.create(name.parse()?)
    }

    /// Configured gateways with their channels
    pub fn available(&self) -> Vec<GatewayInfo> {
        GatewayKind::ALL
            .iter()
            .filter_map(|kind| self.create(*kind).ok())
            .map(|gateway| GatewayInfo {
                name: gateway.kind().as_str().to_string(),
                display_name: gateway.kind().display_name().to_string(),
                methods: gateway.methods().iter().map(|m| m.to_string()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::config::{PpobConfig, XenditConfig};

    #[test]
    fn parses_gateway_names() {
        assert_eq!("midtrans".parse::<GatewayKind>().unwrap(), GatewayKind::Midtrans);
        assert_eq!("Bank-VA".parse::<GatewayKind>().unwrap(), GatewayKind::BankVa);
        assert_eq!("ewallet".parse::<GatewayKind>().unwrap(), GatewayKind::Ewallet);
        let err = "paypal".parse::<GatewayKind>().unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentGatewayUnavailable);
    }

    #[test]
    fn unconfigured_gateway_is_unavailable() {
        let factory = GatewayFactory::new(PaymentConfig::default());
        assert!(factory.available().is_empty());
        let err = factory.create(GatewayKind::Midtrans).err().unwrap();
        assert_eq!(err.code, ErrorCode::PaymentGatewayUnavailable);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn xendit_key_enables_three_gateways() {
        let factory = GatewayFactory::new(PaymentConfig {
            xendit: Some(XenditConfig {
                secret_key: "xnd_development_x".into(),
            }),
            ppob: Some(PpobConfig {
                base_url: "https://ppob.example.id".into(),
                username: "toko".into(),
                api_key: "k".into(),
            }),
            ..Default::default()
        });
        let names: Vec<String> = factory.available().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["xendit", "bank_va", "ewallet", "ppob"]);

        let va = factory
            .available()
            .into_iter()
            .find(|g| g.name == "bank_va")
            .unwrap();
        assert!(va.methods.contains(&"BCA".to_string()));
    }
}
