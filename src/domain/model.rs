use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// ISO-8601，不含時區
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub type Headers = HashMap<String, String>;
pub type QueryParams = HashMap<String, String>;

/// 表單版本 id，API 可能回傳數字或字串
pub type VersionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

/// 欄位轉換後的值
#[derive(Debug, Clone, PartialEq)]
pub enum MappedValue {
    Json(serde_json::Value),
    Timestamp(NaiveDateTime),
}

impl MappedValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            MappedValue::Json(v) => v.clone(),
            MappedValue::Timestamp(ts) => {
                serde_json::Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
            }
        }
    }
}

impl Serialize for MappedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MappedValue::Json(v) => v.serialize(serializer),
            MappedValue::Timestamp(ts) => {
                serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
            }
        }
    }
}

impl From<serde_json::Value> for MappedValue {
    fn from(value: serde_json::Value) -> Self {
        MappedValue::Json(value)
    }
}

/// 依照 FieldMapping 宣告順序排列的輸出記錄
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransformedRecord {
    pub fields: IndexMap<String, MappedValue>,
}

impl TransformedRecord {
    pub fn get(&self, field: &str) -> Option<&MappedValue> {
        self.fields.get(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 轉回一般記錄，時間值會變成 ISO-8601 字串
    pub fn into_record(self) -> Record {
        Record {
            data: self
                .fields
                .into_iter()
                .map(|(k, v)| (k, v.to_json()))
                .collect(),
        }
    }
}

/// 封閉的轉換種類清單
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    ToInt,
    ToFloat,
    ToString,
    Trim,
    /// chrono strftime 格式，例如 `%Y-%m-%d`
    ParseDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Rename(String),
    Transform {
        target: String,
        transform: TransformKind,
    },
}

impl TargetSpec {
    pub fn target(&self) -> &str {
        match self {
            TargetSpec::Rename(target) => target,
            TargetSpec::Transform { target, .. } => target,
        }
    }

    pub fn transform(&self) -> Option<&TransformKind> {
        match self {
            TargetSpec::Rename(_) => None,
            TargetSpec::Transform { transform, .. } => Some(transform),
        }
    }
}

/// 來源欄位 -> 目標規格，保留插入順序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: IndexMap<String, TargetSpec>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries
            .insert(source.into(), TargetSpec::Rename(target.into()));
        self
    }

    pub fn transform(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        transform: TransformKind,
    ) -> Self {
        self.entries.insert(
            source.into(),
            TargetSpec::Transform {
                target: target.into(),
                transform,
            },
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TargetSpec)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (String, TargetSpec)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_serializes_as_iso8601() {
        let ts = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let json = serde_json::to_string(&MappedValue::Timestamp(ts)).unwrap();
        assert_eq!(json, "\"2023-01-01T00:00:00\"");
    }

    #[test]
    fn test_field_mapping_keeps_declaration_order() {
        let mapping = FieldMapping::new()
            .rename("z", "last")
            .transform("a", "first", TransformKind::ToInt)
            .rename("m", "middle");

        let sources: Vec<&str> = mapping.iter().map(|(s, _)| s).collect();
        assert_eq!(sources, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_target_spec_from_json() {
        let mapping: FieldMapping = serde_json::from_str(
            r#"{
                "Name": "Individual_Name",
                "Count": {"target": "Total_count", "transform": "to_int"},
                "Observation_date": {"target": "Date", "transform": {"parse_date": "%Y-%m-%d"}}
            }"#,
        )
        .unwrap();

        let entries: Vec<(&str, &TargetSpec)> = mapping.iter().collect();
        assert_eq!(entries[0].1, &TargetSpec::Rename("Individual_Name".to_string()));
        assert_eq!(entries[1].1.transform(), Some(&TransformKind::ToInt));
        assert_eq!(
            entries[2].1.transform(),
            Some(&TransformKind::ParseDate("%Y-%m-%d".to_string()))
        );
        assert_eq!(entries[2].1.target(), "Date");
    }
}
