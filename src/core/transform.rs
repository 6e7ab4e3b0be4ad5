use crate::domain::model::{MappedValue, TransformKind};
use crate::utils::error::ConversionError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

impl TransformKind {
    pub fn apply(&self, value: &Value) -> Result<MappedValue, ConversionError> {
        match self {
            TransformKind::ToInt => to_int(value).map(|n| MappedValue::Json(Value::from(n))),
            TransformKind::ToFloat => to_float(value).map(|f| MappedValue::Json(Value::from(f))),
            TransformKind::ToString => Ok(MappedValue::Json(Value::String(stringify(value)))),
            TransformKind::Trim => match value {
                Value::String(s) => Ok(MappedValue::Json(Value::String(s.trim().to_string()))),
                other => Err(ConversionError::NotAString {
                    value: other.to_string(),
                }),
            },
            TransformKind::ParseDate(format) => parse_date(value, format).map(MappedValue::Timestamp),
        }
    }
}

fn to_int(value: &Value) -> Result<i64, ConversionError> {
    let not_an_integer = || ConversionError::NotAnInteger {
        value: value.to_string(),
    };

    match value {
        // 超出 i64 範圍的數字視為失敗，不做飽和截斷
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .map(f64::trunc)
                    .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(not_an_integer),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_an_integer()),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(not_an_integer()),
    }
}

fn to_float(value: &Value) -> Result<f64, ConversionError> {
    let not_a_float = || ConversionError::NotAFloat {
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(not_a_float),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(not_a_float),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(not_a_float()),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 格式只有日期時補上 00:00:00，錯誤來源取自日期解析
fn parse_date(value: &Value, format: &str) -> Result<NaiveDateTime, ConversionError> {
    let text = match value {
        Value::String(s) => s.as_str(),
        other => {
            return Err(ConversionError::NotAString {
                value: other.to_string(),
            })
        }
    };

    NaiveDateTime::parse_from_str(text, format).or_else(|_| {
        NaiveDate::parse_from_str(text, format)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|source| ConversionError::InvalidDate {
                value: text.to_string(),
                format: format.to_string(),
                source,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_int() {
        let kind = TransformKind::ToInt;
        assert_eq!(kind.apply(&json!("1")).unwrap(), MappedValue::Json(json!(1)));
        assert_eq!(kind.apply(&json!(" -42 ")).unwrap(), MappedValue::Json(json!(-42)));
        assert_eq!(kind.apply(&json!(14)).unwrap(), MappedValue::Json(json!(14)));
        assert_eq!(kind.apply(&json!(3.9)).unwrap(), MappedValue::Json(json!(3)));
        assert_eq!(kind.apply(&json!(true)).unwrap(), MappedValue::Json(json!(1)));
        assert!(matches!(
            kind.apply(&json!("abc")),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert!(kind.apply(&json!("1.5")).is_err());
        assert!(kind.apply(&json!(null)).is_err());
    }

    #[test]
    fn test_to_int_out_of_range() {
        let kind = TransformKind::ToInt;
        assert!(matches!(
            kind.apply(&json!(18446744073709551615u64)),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert!(matches!(
            kind.apply(&json!(1e300)),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert!(matches!(
            kind.apply(&json!(-1e300)),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert_eq!(
            kind.apply(&json!(i64::MAX)).unwrap(),
            MappedValue::Json(json!(i64::MAX))
        );
        assert!(kind.apply(&json!(-9.5e18)).is_err());
    }

    #[test]
    fn test_to_float() {
        let kind = TransformKind::ToFloat;
        assert_eq!(kind.apply(&json!("2.5")).unwrap(), MappedValue::Json(json!(2.5)));
        assert_eq!(kind.apply(&json!(4)).unwrap(), MappedValue::Json(json!(4.0)));
        assert!(kind.apply(&json!("NaN")).is_err());
        assert!(kind.apply(&json!("twelve")).is_err());
    }

    #[test]
    fn test_to_string_and_trim() {
        assert_eq!(
            TransformKind::ToString.apply(&json!(14)).unwrap(),
            MappedValue::Json(json!("14"))
        );
        assert_eq!(
            TransformKind::ToString.apply(&json!("moose")).unwrap(),
            MappedValue::Json(json!("moose"))
        );
        assert_eq!(
            TransformKind::Trim.apply(&json!("  Big Moose ")).unwrap(),
            MappedValue::Json(json!("Big Moose"))
        );
        assert!(TransformKind::Trim.apply(&json!(1)).is_err());
    }

    #[test]
    fn test_parse_date() {
        let kind = TransformKind::ParseDate("%Y-%m-%d".to_string());
        let expected = NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            kind.apply(&json!("2023-02-01")).unwrap(),
            MappedValue::Timestamp(expected)
        );

        let with_time = TransformKind::ParseDate("%Y-%m-%d %H:%M".to_string());
        let expected = NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(
            with_time.apply(&json!("2023-02-01 13:45")).unwrap(),
            MappedValue::Timestamp(expected)
        );
    }

    #[test]
    fn test_parse_date_mismatch() {
        let kind = TransformKind::ParseDate("%Y-%m-%d".to_string());
        assert!(matches!(
            kind.apply(&json!("01/02/2023")),
            Err(ConversionError::InvalidDate { .. })
        ));
        assert!(matches!(
            kind.apply(&json!(20230201)),
            Err(ConversionError::NotAString { .. })
        ));
    }

    #[test]
    fn test_parse_date_impossible_day_reports_out_of_range() {
        let kind = TransformKind::ParseDate("%Y-%m-%d".to_string());
        for text in ["2023-02-30", "2023-13-01"] {
            match kind.apply(&json!(text)) {
                Err(ConversionError::InvalidDate { source, .. }) => {
                    assert_eq!(source.kind(), chrono::format::ParseErrorKind::OutOfRange);
                }
                other => panic!("unexpected result for {}: {:?}", text, other),
            }
        }
    }
}
