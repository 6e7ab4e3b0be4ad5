use crate::domain::model::{Headers, QueryParams};
use crate::domain::ports::Transport;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&QueryParams>,
    ) -> Result<serde_json::Value> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        if let Some(params) = params {
            request = request.query(params);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("📡 Making API request to: {}", url);

        let response = match request.send().await {
            Ok(response) => response,
            // 連線、DNS、逾時等傳輸層失敗一律歸為 RequestError
            Err(e) => {
                tracing::error!("❌ Request failed: {}", e);
                return Err(EtlError::RequestError {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Request failed: {} returned {}", url, status);
            return Err(EtlError::RequestError {
                url: url.to_string(),
                message: if body.is_empty() {
                    format!("API request failed with status: {}", status)
                } else {
                    format!("API request failed with status: {} ({})", status, body)
                },
            });
        }

        let json_data: serde_json::Value = response.json().await?;
        Ok(json_data)
    }
}
