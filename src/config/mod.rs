#[cfg(feature = "cli")]
pub mod cli;
pub mod mapping_config;

use crate::adapters::http::ReqwestTransport;
use crate::core::client::{ResourceClient, DEFAULT_BASE_URL};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use mapping_config::MappingConfig;

/// 連線 CHEFS API 所需的設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub form_id: String,
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

impl ClientConfig {
    pub fn new(form_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            form_id: form_id.into(),
            api_key: api_key.into(),
            timeout_seconds: None,
        }
    }

    pub fn build_client(&self) -> ResourceClient<ReqwestTransport> {
        let mut transport = ReqwestTransport::new();
        if let Some(timeout) = self.timeout_seconds {
            transport = transport.with_timeout(Duration::from_secs(timeout));
        }
        ResourceClient::new(transport, self.form_id.clone(), self.api_key.clone())
            .with_base_url(self.base_url.clone())
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_non_empty_string("form_id", &self.form_id)?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        // api_key 允許為空：此時送出未驗證的請求
        if self.api_key.is_empty() {
            tracing::warn!("⚠️ No API key configured, requests will be sent without authentication");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ClientConfig::new("form-1", "key");
        assert_eq!(config.base_url, "https://submit.digital.gov.bc.ca/app/api/v1/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::new("", "key");
        assert!(config.validate().is_err());

        config.form_id = "form-1".to_string();
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = DEFAULT_BASE_URL.to_string();
        config.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_client_uses_base_url() {
        let mut config = ClientConfig::new("form-1", "key");
        config.base_url = "http://localhost:8080/api".to_string();
        let client = config.build_client();
        assert_eq!(client.base_url(), "http://localhost:8080/api/");
    }
}
