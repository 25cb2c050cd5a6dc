use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::templates::FormConfig;

const DEFAULT_CONFIG_FILE: &str = "funpay.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub check_interval_seconds: u64,
    pub data_dir: PathBuf,
    pub sellers: SellersConfig,
    pub auth: AuthConfig,
    pub submit: SubmitConfig,
}

/// Seller ids: `own` is the reference catalog (list A), `rival` the comparison catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellersConfig {
    pub own: String,
    pub rival: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub cookies: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub desc_ru: String,
    #[serde(default)]
    pub desc_en: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    pub delay_seconds: u64,
    pub verify_delay_seconds: u64,
}

impl Config {
    /// Defaults, then `funpay.toml` (or the file named by `FUNPAY_CONFIG`),
    /// then `FUNPAY_*` environment variables (`FUNPAY_AUTH__COOKIES`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FUNPAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let settings = config::Config::builder()
            .set_default("base_url", "https://funpay.com")?
            .set_default(
                "user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )?
            .set_default("request_timeout_seconds", 25)?
            .set_default("check_interval_seconds", 10)?
            .set_default("data_dir", "data")?
            .set_default("sellers.own", "3194633")?
            .set_default("sellers.rival", "292020")?
            .set_default("submit.delay_seconds", 5)?
            .set_default("submit.verify_delay_seconds", 3)?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("FUNPAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero check interval or request timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval_seconds == 0 {
            return Err(ConfigError::Zero("check_interval_seconds"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Zero("request_timeout_seconds"));
        }
        Ok(())
    }

    /// Fail closed when the session cookies needed to act as the seller are absent.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.auth.cookies.trim().is_empty() {
            return Err(ConfigError::Missing("auth.cookies"));
        }
        Ok(())
    }

    pub fn form_config(&self, csrf_token: String) -> FormConfig {
        FormConfig {
            csrf_token,
            desc_ru: self.auth.desc_ru.clone(),
            desc_en: self.auth.desc_en.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn seller_url(&self, seller_id: &str) -> String {
        format!("{}/users/{}/", self.base_url.trim_end_matches('/'), seller_id)
    }

    pub fn seller_url_en(&self, seller_id: &str) -> String {
        format!("{}/en/users/{}/", self.base_url.trim_end_matches('/'), seller_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            base_url: "https://funpay.com/".to_string(),
            user_agent: "test".to_string(),
            request_timeout_seconds: 5,
            check_interval_seconds: 10,
            data_dir: PathBuf::from("data"),
            sellers: SellersConfig {
                own: "1".to_string(),
                rival: "2".to_string(),
            },
            auth: AuthConfig::default(),
            submit: SubmitConfig {
                delay_seconds: 0,
                verify_delay_seconds: 0,
            },
        }
    }

    #[test]
    fn empty_cookies_fail_closed() {
        let mut config = sample();
        assert!(matches!(
            config.require_credentials(),
            Err(ConfigError::Missing("auth.cookies"))
        ));

        config.auth.cookies = "golden_key=abc".to_string();
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn zero_check_interval_is_rejected() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.check_interval_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero("check_interval_seconds"))
        ));
    }

    #[test]
    fn seller_urls_are_locale_scoped() {
        let config = sample();
        assert_eq!(config.seller_url("292020"), "https://funpay.com/users/292020/");
        assert_eq!(config.seller_url_en("292020"), "https://funpay.com/en/users/292020/");
    }
}
