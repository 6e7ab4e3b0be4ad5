use crate::core::mapper::{ErrorPolicy, RecordMapper};
use crate::domain::model::{FieldMapping, TransformKind};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 欄位映射設定檔
///
/// TOML 範例：
///
/// ```toml
/// on_error = "abort"
///
/// [mapping]
/// Species_Name = "Species"
/// Count = { target = "Total_count", transform = "to_int" }
/// Observation_date = { target = "Date", transform = { parse_date = "%Y-%m-%d" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub mapping: FieldMapping,
    pub on_error: Option<ErrorPolicy>,
}

impl MappingConfig {
    /// 依副檔名載入 TOML 或 JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(EtlError::IoError)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(EtlError::InvalidConfigValueError {
                field: "mapping_file".to_string(),
                value: path.display().to_string(),
                reason: format!(
                    "Unsupported file extension: {}. Allowed extensions: toml, json",
                    other.unwrap_or("<none>")
                ),
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        serde_json::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("JSON parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TARGET_PREFIX})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.on_error.unwrap_or_default()
    }

    pub fn into_mapper(self) -> RecordMapper {
        let policy = self.error_policy();
        RecordMapper::new(self.mapping).with_policy(policy)
    }
}

impl Validate for MappingConfig {
    fn validate(&self) -> Result<()> {
        if self.mapping.is_empty() {
            return Err(EtlError::ValidationError {
                message: "mapping must declare at least one field".to_string(),
            });
        }

        for (source, spec) in self.mapping.iter() {
            validation::validate_non_empty_string("mapping source", source)?;
            validation::validate_non_empty_string(&format!("mapping.{}", source), spec.target())?;

            if let Some(TransformKind::ParseDate(format)) = spec.transform() {
                if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                    return Err(EtlError::InvalidConfigValueError {
                        field: format!("mapping.{}.transform", source),
                        value: format.clone(),
                        reason: "Invalid date format".to_string(),
                    });
                }
            }
        }

        validation::validate_unique("mapping targets", self.mapping.iter().map(|(_, spec)| spec.target()))
    }
}
