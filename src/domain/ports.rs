use crate::domain::model::{Headers, QueryParams};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單次 GET 的傳輸介面，非 2xx 或網路失敗時回傳錯誤
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&QueryParams>,
    ) -> Result<serde_json::Value>;
}
