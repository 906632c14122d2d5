//! Gateway credentials, loaded from the environment

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub client_key: Option<String>,
    pub production: bool,
}

impl MidtransConfig {
    pub fn snap_base_url(&self) -> &'static str {
        if self.production {
            "https://app.midtrans.com"
        } else {
            "https://app.sandbox.midtrans.com"
        }
    }

    pub fn api_base_url(&self) -> &'static str {
        if self.production {
            "https://api.midtrans.com"
        } else {
            "https://api.sandbox.midtrans.com"
        }
    }
}

#[derive(Debug, Clone)]
pub struct XenditConfig {
    pub secret_key: String,
}

/// Generic PPOB vendor (utility bills, phone credit)
#[derive(Debug, Clone)]
pub struct PpobConfig {
    pub base_url: String,
    pub username: String,
    pub api_key: String,
}

/// Payment configuration. A gateway is available when its credentials are set.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub midtrans: Option<MidtransConfig>,
    /// Backs the `xendit`, `bank_va` and `ewallet` gateways
    pub xendit: Option<XenditConfig>,
    pub ppob: Option<PpobConfig>,
    /// Where e-wallet checkouts return after payment
    pub redirect_url: String,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        let midtrans = non_empty("MIDTRANS_SERVER_KEY").map(|server_key| MidtransConfig {
            server_key,
            client_key: non_empty("MIDTRANS_CLIENT_KEY"),
            production: std::env::var("MIDTRANS_PRODUCTION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        });

        let xendit = non_empty("XENDIT_SECRET_KEY").map(|secret_key| XenditConfig { secret_key });

        let ppob = match (
            non_empty("PPOB_BASE_URL"),
            non_empty("PPOB_USERNAME"),
            non_empty("PPOB_API_KEY"),
        ) {
            (Some(base_url), Some(username), Some(api_key)) => Some(PpobConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                username,
                api_key,
            }),
            _ => None,
        };

        Self {
            midtrans,
            xendit,
            ppob,
            redirect_url: non_empty("PAYMENT_REDIRECT_URL")
                .unwrap_or_else(|| "http://localhost:3000/payment/finish".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midtrans_urls_follow_environment() {
        let mut cfg = MidtransConfig {
            server_key: "SB-Mid-server-x".into(),
            client_key: None,
            production: false,
        };
        assert_eq!(cfg.snap_base_url(), "https://app.sandbox.midtrans.com");
        assert_eq!(cfg.api_base_url(), "https://api.sandbox.midtrans.com");
        cfg.production = true;
        assert_eq!(cfg.snap_base_url(), "https://app.midtrans.com");
        assert_eq!(cfg.api_base_url(), "https://api.midtrans.com");
    }

    #[test]
    fn default_has_no_gateways() {
        let cfg = PaymentConfig::default();
        assert!(cfg.midtrans.is_none() && cfg.xendit.is_none() && cfg.ppob.is_none());
    }
}
