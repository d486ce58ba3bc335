use crate::json::RecordJson;
use bytes::Bytes;
use indexmap::IndexMap;
use num::BigInt;
use ordered_float::OrderedFloat;
use serde::ser::{SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A materialized row: declared field name to value, in schema order
pub type Record = IndexMap<Arc<str>, ParquetValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParquetValue {
    // Numeric types
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float16(OrderedFloat<f32>), // f16 widened to f32
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),

    // Basic types
    Boolean(bool),
    String(Arc<str>),
    Bytes(Bytes),

    // Date/Time types
    Date32(i32), // Days since epoch
    Date64(i64), // Milliseconds since epoch

    // Decimal types: unscaled value, scale
    Decimal128(i128, i8),
    Decimal256(BigInt, i8),

    // Timestamps since epoch in the named unit, with the column timezone if any
    TimestampSecond(i64, Option<Arc<str>>),
    TimestampMillis(i64, Option<Arc<str>>),
    TimestampMicros(i64, Option<Arc<str>>),
    TimestampNanos(i64, Option<Arc<str>>),

    // Time of day since midnight
    TimeMillis(i32),
    TimeMicros(i64),
    TimeNanos(i64),

    // Complex types
    List(Vec<ParquetValue>),
    Map(Vec<(ParquetValue, ParquetValue)>), // entry order as stored
    Record(Record),

    Null,
}

impl ParquetValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParquetValue::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParquetValue::Int8(_) => "Int8",
            ParquetValue::Int16(_) => "Int16",
            ParquetValue::Int32(_) => "Int32",
            ParquetValue::Int64(_) => "Int64",
            ParquetValue::UInt8(_) => "UInt8",
            ParquetValue::UInt16(_) => "UInt16",
            ParquetValue::UInt32(_) => "UInt32",
            ParquetValue::UInt64(_) => "UInt64",
            ParquetValue::Float16(_) => "Float16",
            ParquetValue::Float32(_) => "Float32",
            ParquetValue::Float64(_) => "Float64",
            ParquetValue::Boolean(_) => "Boolean",
            ParquetValue::String(_) => "String",
            ParquetValue::Bytes(_) => "Bytes",
            ParquetValue::Date32(_) => "Date32",
            ParquetValue::Date64(_) => "Date64",
            ParquetValue::Decimal128(_, _) => "Decimal128",
            ParquetValue::Decimal256(_, _) => "Decimal256",
            ParquetValue::TimestampSecond(_, _) => "TimestampSecond",
            ParquetValue::TimestampMillis(_, _) => "TimestampMillis",
            ParquetValue::TimestampMicros(_, _) => "TimestampMicros",
            ParquetValue::TimestampNanos(_, _) => "TimestampNanos",
            ParquetValue::TimeMillis(_) => "TimeMillis",
            ParquetValue::TimeMicros(_) => "TimeMicros",
            ParquetValue::TimeNanos(_) => "TimeNanos",
            ParquetValue::List(_) => "List",
            ParquetValue::Map(_) => "Map",
            ParquetValue::Record(_) => "Record",
            ParquetValue::Null => "Null",
        }
    }

    /// Borrow the nested record, if this is one
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            ParquetValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<&str> for ParquetValue {
    fn from(s: &str) -> Self {
        ParquetValue::String(Arc::from(s))
    }
}

impl From<i64> for ParquetValue {
    fn from(v: i64) -> Self {
        ParquetValue::Int64(v)
    }
}

impl From<bool> for ParquetValue {
    fn from(v: bool) -> Self {
        ParquetValue::Boolean(v)
    }
}

/// Render an unscaled integer as a decimal string with `scale` fractional digits
pub(crate) fn format_decimal(unscaled: &str, scale: i8) -> String {
    let (sign, digits) = match unscaled.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", unscaled),
    };

    if scale <= 0 {
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        if digits == "0" {
            return "0".to_string();
        }
        return format!("{}{}{}", sign, digits, zeros);
    }

    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits.to_string()
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    format!("{}{}.{}", sign, int_part, frac_part)
}

/// Render nanoseconds since midnight as `HH:MM:SS[.fraction]`
pub(crate) fn format_time_of_day(nanos: i64) -> String {
    const NANOS_PER_SECOND: i64 = 1_000_000_000;
    let total_seconds = nanos.div_euclid(NANOS_PER_SECOND);
    let fraction = nanos.rem_euclid(NANOS_PER_SECOND);
    let (hours, minutes, seconds) = (
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60,
    );

    if fraction == 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        let frac = format!("{:09}", fraction);
        format!(
            "{:02}:{:02}:{:02}.{}",
            hours,
            minutes,
            seconds,
            frac.trim_end_matches('0')
        )
    }
}

fn timestamp_string(ts: std::result::Result<jiff::Timestamp, jiff::Error>) -> Option<String> {
    ts.ok().map(|ts| ts.to_string())
}

fn date_string(ts: std::result::Result<jiff::Timestamp, jiff::Error>) -> Option<String> {
    ts.ok().map(|ts| ts.strftime("%Y-%m-%d").to_string())
}

impl Serialize for ParquetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use ParquetValue::*;

        match self {
            Null => serializer.serialize_none(),
            Boolean(b) => serializer.serialize_bool(*b),
            Int8(v) => serializer.serialize_i8(*v),
            Int16(v) => serializer.serialize_i16(*v),
            Int32(v) => serializer.serialize_i32(*v),
            Int64(v) => serializer.serialize_i64(*v),
            UInt8(v) => serializer.serialize_u8(*v),
            UInt16(v) => serializer.serialize_u16(*v),
            UInt32(v) => serializer.serialize_u32(*v),
            UInt64(v) => serializer.serialize_u64(*v),
            Float16(v) | Float32(v) => serializer.serialize_f32(v.into_inner()),
            Float64(v) => serializer.serialize_f64(v.into_inner()),
            String(s) => serializer.serialize_str(s),
            Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => serializer.serialize_str(s),
                Err(_) => serializer.serialize_bytes(b),
            },
            Date32(days) => {
                match date_string(jiff::Timestamp::from_second(i64::from(*days) * 86_400)) {
                    Some(s) => serializer.serialize_str(&s),
                    None => serializer.serialize_i32(*days),
                }
            }
            Date64(millis) => match date_string(jiff::Timestamp::from_millisecond(*millis)) {
                Some(s) => serializer.serialize_str(&s),
                None => serializer.serialize_i64(*millis),
            },
            Decimal128(v, scale) => serializer.serialize_str(&format_decimal(&v.to_string(), *scale)),
            Decimal256(v, scale) => serializer.serialize_str(&format_decimal(&v.to_string(), *scale)),
            TimestampSecond(v, _) => serialize_timestamp(serializer, *v, jiff::Timestamp::from_second(*v)),
            TimestampMillis(v, _) => {
                serialize_timestamp(serializer, *v, jiff::Timestamp::from_millisecond(*v))
            }
            TimestampMicros(v, _) => {
                serialize_timestamp(serializer, *v, jiff::Timestamp::from_microsecond(*v))
            }
            TimestampNanos(v, _) => {
                serialize_timestamp(serializer, *v, jiff::Timestamp::from_nanosecond(i128::from(*v)))
            }
            TimeMillis(v) => serializer.serialize_str(&format_time_of_day(i64::from(*v) * 1_000_000)),
            TimeMicros(v) => serializer.serialize_str(&format_time_of_day(v.saturating_mul(1_000))),
            TimeNanos(v) => serializer.serialize_str(&format_time_of_day(*v)),
            List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Map(entries) => {
                let string_keys = entries
                    .iter()
                    .all(|(k, _)| matches!(k, ParquetValue::String(_)));
                if string_keys {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (k, v) in entries {
                        map.serialize_entry(k, v)?;
                    }
                    map.end()
                } else {
                    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                    for (k, v) in entries {
                        seq.serialize_element(&MapEntry(k, v))?;
                    }
                    seq.end()
                }
            }
            Record(fields) => RecordJson(fields).serialize(serializer),
        }
    }
}

fn serialize_timestamp<S: Serializer>(
    serializer: S,
    raw: i64,
    ts: std::result::Result<jiff::Timestamp, jiff::Error>,
) -> std::result::Result<S::Ok, S::Error> {
    match timestamp_string(ts) {
        Some(s) => serializer.serialize_str(&s),
        None => serializer.serialize_i64(raw),
    }
}

/// A non-string-keyed map entry rendered as a `[key, value]` pair
struct MapEntry<'a>(&'a ParquetValue, &'a ParquetValue);

impl Serialize for MapEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.0)?;
        tuple.serialize_element(self.1)?;
        tuple.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(value: &ParquetValue) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_value_creation() {
        let v = ParquetValue::Int32(42);
        assert_eq!(v, ParquetValue::Int32(42));
        assert!(!v.is_null());
        assert_eq!(v.type_name(), "Int32");
        assert!(ParquetValue::Null.is_null());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal("12345", 2), "123.45");
        assert_eq!(format_decimal("-5", 3), "-0.005");
        assert_eq!(format_decimal("0", 2), "0.00");
        assert_eq!(format_decimal("42", 0), "42");
        assert_eq!(format_decimal("42", -2), "4200");
    }

    #[test]
    fn test_format_time_of_day() {
        assert_eq!(format_time_of_day(0), "00:00:00");
        assert_eq!(format_time_of_day(3_723_000_000_000), "01:02:03");
        assert_eq!(format_time_of_day(3_723_500_000_000), "01:02:03.5");
    }

    #[test]
    fn test_scalar_json() {
        assert_eq!(to_json(&ParquetValue::Int64(-7)), json!(-7));
        assert_eq!(to_json(&ParquetValue::UInt64(u64::MAX)), json!(u64::MAX));
        assert_eq!(to_json(&ParquetValue::Boolean(true)), json!(true));
        assert_eq!(to_json(&ParquetValue::Null), json!(null));
        assert_eq!(to_json(&ParquetValue::from("hi")), json!("hi"));
        assert_eq!(
            to_json(&ParquetValue::Float64(OrderedFloat(f64::NAN))),
            json!(null)
        );
        assert_eq!(
            to_json(&ParquetValue::Decimal128(-12345, 2)),
            json!("-123.45")
        );
    }

    #[test]
    fn test_temporal_json() {
        assert_eq!(to_json(&ParquetValue::Date32(0)), json!("1970-01-01"));
        assert_eq!(to_json(&ParquetValue::Date32(19_723)), json!("2024-01-01"));
        assert_eq!(
            to_json(&ParquetValue::TimestampMillis(1_704_067_200_000, None)),
            json!("2024-01-01T00:00:00Z")
        );
        assert_eq!(
            to_json(&ParquetValue::TimeMicros(45_296_000_000)),
            json!("12:34:56")
        );
    }

    #[test]
    fn test_bytes_json() {
        assert_eq!(
            to_json(&ParquetValue::Bytes(Bytes::from_static(b"abc"))),
            json!("abc")
        );
        assert_eq!(
            to_json(&ParquetValue::Bytes(Bytes::from_static(&[0xff, 0x00]))),
            json!([255, 0])
        );
    }

    #[test]
    fn test_nested_json_preserves_order_and_case() {
        let mut inner = Record::new();
        inner.insert(Arc::from("City"), ParquetValue::from("Oslo"));
        inner.insert(Arc::from("zip"), ParquetValue::Null);

        let mut record = Record::new();
        record.insert(Arc::from("Name"), ParquetValue::from("Ada"));
        record.insert(Arc::from("Address"), ParquetValue::Record(inner));
        record.insert(
            Arc::from("tags"),
            ParquetValue::List(vec![ParquetValue::from("a"), ParquetValue::from("b")]),
        );

        let text = serde_json::to_string(&ParquetValue::Record(record)).unwrap();
        assert_eq!(
            text,
            r#"{"Name":"Ada","Address":{"City":"Oslo","zip":null},"tags":["a","b"]}"#
        );
    }

    #[test]
    fn test_map_json() {
        let string_keyed = ParquetValue::Map(vec![(ParquetValue::from("k"), ParquetValue::Int32(1))]);
        assert_eq!(to_json(&string_keyed), json!({"k": 1}));

        let int_keyed = ParquetValue::Map(vec![(ParquetValue::Int32(1), ParquetValue::from("v"))]);
        assert_eq!(to_json(&int_keyed), json!([[1, "v"]]));
    }
}
