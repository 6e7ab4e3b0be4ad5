use crate::domain::model::{FieldMapping, MappedValue, Record, TargetSpec, TransformedRecord};
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};

/// 批次中遇到錯誤時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// 第一個錯誤就中止整批
    #[default]
    Abort,
    SkipRecord,
    CollectErrors,
}

#[derive(Debug, Default)]
pub struct MapOutcome {
    pub records: Vec<TransformedRecord>,
    pub errors: Vec<EtlError>,
}

impl MapOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    mapping: FieldMapping,
    policy: ErrorPolicy,
}

impl RecordMapper {
    pub fn new(mapping: FieldMapping) -> Self {
        Self {
            mapping,
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// 依目前的 policy 轉換整批記錄
    ///
    /// `Abort` 時第一個錯誤直接回傳 `Err`；`SkipRecord` 丟棄失敗的記錄，
    /// `CollectErrors` 同樣丟棄但把錯誤收進 [`MapOutcome::errors`]。
    pub fn map(&self, records: &[Record]) -> Result<MapOutcome> {
        let mut outcome = MapOutcome::default();

        for (index, record) in records.iter().enumerate() {
            match map_record(index, record, &self.mapping) {
                Ok(mapped) => outcome.records.push(mapped),
                Err(e) => match self.policy {
                    ErrorPolicy::Abort => return Err(e),
                    ErrorPolicy::SkipRecord => {
                        tracing::warn!("⚠️ Skipping record {}: {}", index, e);
                    }
                    ErrorPolicy::CollectErrors => {
                        tracing::warn!("⚠️ Record {} failed: {}", index, e);
                        outcome.errors.push(e);
                    }
                },
            }
        }

        tracing::info!(
            "🔄 Mapped {}/{} records ({} errors collected)",
            outcome.records.len(),
            records.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }
}

/// fail-fast：第一個錯誤就中止整批
pub fn map_records(records: &[Record], mapping: &FieldMapping) -> Result<Vec<TransformedRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| map_record(index, record, mapping))
        .collect()
}

pub fn map_records_with_policy(
    records: &[Record],
    mapping: &FieldMapping,
    policy: ErrorPolicy,
) -> Result<MapOutcome> {
    RecordMapper::new(mapping.clone()).with_policy(policy).map(records)
}

fn map_record(index: usize, record: &Record, mapping: &FieldMapping) -> Result<TransformedRecord> {
    let mut output = TransformedRecord::default();

    for (source, spec) in mapping.iter() {
        let value = record
            .data
            .get(source)
            .ok_or_else(|| EtlError::MissingFieldError {
                field: source.to_string(),
                record_index: index,
            })?;

        let mapped = match spec {
            TargetSpec::Rename(_) => MappedValue::Json(value.clone()),
            TargetSpec::Transform { transform, .. } => {
                transform
                    .apply(value)
                    .map_err(|source_err| EtlError::TransformError {
                        field: source.to_string(),
                        record_index: index,
                        source: source_err,
                    })?
            }
        };

        output.fields.insert(spec.target().to_string(), mapped);
    }

    Ok(output)
}

#[derive(Serialize)]
struct Envelope<'a> {
    data: &'a [TransformedRecord],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<RecordFailure>,
}

#[derive(Serialize)]
struct RecordFailure {
    record: Option<usize>,
    message: String,
}

/// 輸出 `{"data": [...]}`，兩格縮排
pub fn serialize(records: &[TransformedRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Envelope {
        data: records,
        errors: Vec::new(),
    })?)
}

/// 同 [`serialize`]，有收集到錯誤時多一個 `"errors"` 陣列
pub fn serialize_outcome(outcome: &MapOutcome) -> Result<String> {
    let errors = outcome
        .errors
        .iter()
        .map(|e| RecordFailure {
            record: e.record_index(),
            message: e.to_string(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&Envelope {
        data: &outcome.records,
        errors,
    })?)
}

/// 解析 `{"data": [...]}` 文件
pub fn parse_payload(text: &str) -> Result<Vec<Record>> {
    let document: serde_json::Value = serde_json::from_str(text)?;
    let items = match document {
        serde_json::Value::Object(mut obj) => match obj.remove("data") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(EtlError::ValidationError {
                    message: "document has no \"data\" array".to_string(),
                })
            }
        },
        _ => {
            return Err(EtlError::ValidationError {
                message: "document must be a JSON object".to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(obj) => Ok(Record::from(obj)),
            other => Err(EtlError::ValidationError {
                message: format!("data[{}] is not an object: {}", index, other),
            }),
        })
        .collect()
}

/// [`process`] 的結果：輸出文件與 `CollectErrors` 收集到的錯誤
#[derive(Debug)]
pub struct ProcessReport {
    pub output: String,
    pub errors: Vec<EtlError>,
}

/// 解析、轉換、輸出一次完成
pub fn process(text: &str, mapper: &RecordMapper) -> Result<ProcessReport> {
    let records = parse_payload(text)?;
    tracing::info!("📥 Parsed {} records", records.len());
    let outcome = mapper.map(&records)?;
    let output = serialize_outcome(&outcome)?;
    Ok(ProcessReport {
        output,
        errors: outcome.errors,
    })
}
