use crate::domain::model::{Headers, QueryParams, VersionId};
use crate::domain::ports::Transport;
use crate::utils::error::{EtlError, Result};
use base64::Engine;

pub const DEFAULT_BASE_URL: &str = "https://submit.digital.gov.bc.ca/app/api/v1/";

/// 依帳密產生 Basic auth 標頭；任一為空時回傳空集合
pub fn build_auth_header(identifier: &str, secret: &str) -> Headers {
    let mut headers = Headers::new();
    if !identifier.is_empty() && !secret.is_empty() {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", identifier, secret));
        headers.insert(
            "Authorization".to_string(),
            format!("Basic {}", credentials),
        );
    }
    headers
}

/// CHEFS API 的唯讀客戶端
///
/// 每個方法都經由 [`ResourceClient::fetch`] 發出 GET。「最新版本」不做快取，
/// 每次呼叫都重新解析；需要同一版本時請用 [`ResourceClient::pin_version`]。
pub struct ResourceClient<T: Transport> {
    transport: T,
    base_url: String,
    identifier: String,
    secret: String,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(transport: T, identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch(
        &self,
        endpoint: &str,
        params: Option<&QueryParams>,
    ) -> Result<serde_json::Value> {
        let headers = build_auth_header(&self.identifier, &self.secret);
        let url = format!("{}{}", self.base_url, endpoint);
        self.transport.get(&url, &headers, params).await
    }

    pub async fn get_form_details(&self, form_id: &str) -> Result<serde_json::Value> {
        self.fetch(&format!("forms/{}", form_id), None).await
    }

    /// `versions[0].id`，即 API 回傳的第一個版本，不一定是最大的 id
    pub async fn get_latest_version_id(&self, form_id: &str) -> Result<VersionId> {
        let details = self.get_form_details(form_id).await?;
        let version = details
            .get("versions")
            .and_then(|v| v.as_array())
            .and_then(|versions| versions.first())
            .and_then(|first| first.get("id"))
            .and_then(version_id_of)
            .ok_or_else(|| EtlError::NotFoundError {
                resource: format!("forms/{}", form_id),
                message: "form has no versions".to_string(),
            })?;

        tracing::debug!("📌 Latest version of form {}: {}", form_id, version);
        Ok(version)
    }

    pub async fn version_exists(&self, form_id: &str, version_id: &str) -> Result<bool> {
        let details = self.get_form_details(form_id).await?;
        let exists = details
            .get("versions")
            .and_then(|v| v.as_array())
            .map(|versions| {
                versions.iter().any(|version| {
                    version
                        .get("id")
                        .and_then(version_id_of)
                        .is_some_and(|id| id == version_id)
                })
            })
            .unwrap_or(false);
        Ok(exists)
    }

    pub async fn get_version_fields(
        &self,
        form_id: &str,
        version: Option<&str>,
    ) -> Result<Vec<String>> {
        let version = match version {
            Some(v) => v.to_string(),
            None => self.get_latest_version_id(form_id).await?,
        };
        self.fetch_fields(form_id, &version).await
    }

    /// 不指定版本時打表單層級的 submissions，且不自動帶 fields
    pub async fn list_submissions(
        &self,
        form_id: &str,
        version: Option<&str>,
        fields: &[String],
    ) -> Result<serde_json::Value> {
        match version {
            None => {
                let endpoint = format!("forms/{}/submissions", form_id);
                if fields.is_empty() {
                    self.fetch(&endpoint, None).await
                } else {
                    self.fetch(&endpoint, Some(&fields_param(fields))).await
                }
            }
            Some(version) => {
                let fields = self.fields_or_default(form_id, version, fields).await?;
                self.fetch(
                    &format!("forms/{}/versions/{}/submissions", form_id, version),
                    Some(&fields_param(&fields)),
                )
                .await
            }
        }
    }

    pub async fn get_submission_data(
        &self,
        form_id: &str,
        version: Option<&str>,
        fields: &[String],
    ) -> Result<serde_json::Value> {
        let version = match version {
            Some(v) => v.to_string(),
            None => self.get_latest_version_id(form_id).await?,
        };
        let fields = self.fields_or_default(form_id, &version, fields).await?;
        self.fetch(
            &format!("forms/{}/versions/{}/submissions/discover", form_id, version),
            Some(&fields_param(&fields)),
        )
        .await
    }

    pub async fn get_submission(&self, submission_id: &str) -> Result<serde_json::Value> {
        self.fetch(&format!("submissions/{}", submission_id), None)
            .await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<serde_json::Value> {
        self.fetch(&format!("files/{}", file_id), None).await
    }

    /// 解析一次版本並在後續呼叫中沿用
    pub async fn pin_version(
        &self,
        form_id: &str,
        version: Option<&str>,
    ) -> Result<PinnedForm<'_, T>> {
        let version = match version {
            Some(v) => v.to_string(),
            None => self.get_latest_version_id(form_id).await?,
        };
        tracing::info!("📌 Pinned form {} to version {}", form_id, version);
        Ok(PinnedForm {
            client: self,
            form_id: form_id.to_string(),
            version,
        })
    }

    async fn fetch_fields(&self, form_id: &str, version: &str) -> Result<Vec<String>> {
        let body = self
            .fetch(
                &format!("forms/{}/versions/{}/fields", form_id, version),
                None,
            )
            .await?;
        field_names(body)
    }

    async fn fields_or_default(
        &self,
        form_id: &str,
        version: &str,
        fields: &[String],
    ) -> Result<Vec<String>> {
        if fields.is_empty() {
            self.fetch_fields(form_id, version).await
        } else {
            Ok(fields.to_vec())
        }
    }
}

/// 固定在單一版本的表單視圖
pub struct PinnedForm<'a, T: Transport> {
    client: &'a ResourceClient<T>,
    form_id: String,
    version: VersionId,
}

impl<T: Transport> PinnedForm<'_, T> {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub async fn fields(&self) -> Result<Vec<String>> {
        self.client
            .get_version_fields(&self.form_id, Some(&self.version))
            .await
    }

    pub async fn list_submissions(&self, fields: &[String]) -> Result<serde_json::Value> {
        self.client
            .list_submissions(&self.form_id, Some(&self.version), fields)
            .await
    }

    pub async fn submission_data(&self, fields: &[String]) -> Result<serde_json::Value> {
        self.client
            .get_submission_data(&self.form_id, Some(&self.version), fields)
            .await
    }
}

fn version_id_of(id: &serde_json::Value) -> Option<VersionId> {
    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn fields_param(fields: &[String]) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("fields".to_string(), fields.join(","));
    params
}

fn field_names(body: serde_json::Value) -> Result<Vec<String>> {
    let items = match body {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(EtlError::ValidationError {
                message: format!("expected a list of field names, got {}", other),
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(name) => Ok(name),
            other => Err(EtlError::ValidationError {
                message: format!("field name must be a string, got {}", other),
            }),
        })
        .collect()
}
