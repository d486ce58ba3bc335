//! Conversion between Arrow arrays and `ParquetValue`
//!
//! The read side turns a single cell of any decoded column into a
//! `ParquetValue`, recursing through lists, maps and structs. The write side
//! turns a column of values back into an Arrow array for the row writer.

use crate::{ParquetValue, PqError, Record, Result};
use arrow_array::builder::*;
use arrow_array::cast::AsArray;
use arrow_array::types::*;
use arrow_array::{
    Array, ArrayRef, BinaryArray, BinaryViewArray, BooleanArray, Decimal128Array, Decimal256Array,
    FixedSizeBinaryArray, FixedSizeListArray, LargeBinaryArray, LargeListArray, LargeStringArray,
    ListArray, MapArray, PrimitiveArray, StringArray, StringViewArray, StructArray,
};
use arrow_buffer::{i256, BooleanBufferBuilder, NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field, Fields, TimeUnit};
use bytes::Bytes;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Helper function to downcast an array with better error messages
fn downcast_array<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        PqError::conversion(format!("Failed to cast to {}", std::any::type_name::<T>()))
    })
}

fn primitive_value<T: ArrowPrimitiveType>(array: &dyn Array, index: usize) -> Result<T::Native> {
    Ok(downcast_array::<PrimitiveArray<T>>(array)?.value(index))
}

/// Convert a single value from an Arrow array at the given index to a ParquetValue
pub fn arrow_to_parquet_value(array: &dyn Array, index: usize) -> Result<ParquetValue> {
    if index >= array.len() {
        return Err(PqError::conversion(format!(
            "Index {} out of bounds for array of length {}",
            index,
            array.len()
        )));
    }

    if array.is_null(index) {
        return Ok(ParquetValue::Null);
    }

    let value = match array.data_type() {
        DataType::Null => ParquetValue::Null,
        DataType::Boolean => {
            ParquetValue::Boolean(downcast_array::<BooleanArray>(array)?.value(index))
        }

        DataType::Int8 => ParquetValue::Int8(primitive_value::<Int8Type>(array, index)?),
        DataType::Int16 => ParquetValue::Int16(primitive_value::<Int16Type>(array, index)?),
        DataType::Int32 => ParquetValue::Int32(primitive_value::<Int32Type>(array, index)?),
        DataType::Int64 => ParquetValue::Int64(primitive_value::<Int64Type>(array, index)?),
        DataType::UInt8 => ParquetValue::UInt8(primitive_value::<UInt8Type>(array, index)?),
        DataType::UInt16 => ParquetValue::UInt16(primitive_value::<UInt16Type>(array, index)?),
        DataType::UInt32 => ParquetValue::UInt32(primitive_value::<UInt32Type>(array, index)?),
        DataType::UInt64 => ParquetValue::UInt64(primitive_value::<UInt64Type>(array, index)?),
        DataType::Float16 => ParquetValue::Float16(OrderedFloat(
            primitive_value::<Float16Type>(array, index)?.to_f32(),
        )),
        DataType::Float32 => {
            ParquetValue::Float32(OrderedFloat(primitive_value::<Float32Type>(array, index)?))
        }
        DataType::Float64 => {
            ParquetValue::Float64(OrderedFloat(primitive_value::<Float64Type>(array, index)?))
        }

        DataType::Utf8 => {
            ParquetValue::String(Arc::from(downcast_array::<StringArray>(array)?.value(index)))
        }
        DataType::LargeUtf8 => ParquetValue::String(Arc::from(
            downcast_array::<LargeStringArray>(array)?.value(index),
        )),
        DataType::Utf8View => ParquetValue::String(Arc::from(
            downcast_array::<StringViewArray>(array)?.value(index),
        )),
        DataType::Binary => ParquetValue::Bytes(Bytes::copy_from_slice(
            downcast_array::<BinaryArray>(array)?.value(index),
        )),
        DataType::LargeBinary => ParquetValue::Bytes(Bytes::copy_from_slice(
            downcast_array::<LargeBinaryArray>(array)?.value(index),
        )),
        DataType::BinaryView => ParquetValue::Bytes(Bytes::copy_from_slice(
            downcast_array::<BinaryViewArray>(array)?.value(index),
        )),
        DataType::FixedSizeBinary(_) => ParquetValue::Bytes(Bytes::copy_from_slice(
            downcast_array::<FixedSizeBinaryArray>(array)?.value(index),
        )),

        DataType::Date32 => ParquetValue::Date32(primitive_value::<Date32Type>(array, index)?),
        DataType::Date64 => ParquetValue::Date64(primitive_value::<Date64Type>(array, index)?),

        DataType::Timestamp(unit, timezone) => {
            let tz = timezone.as_ref().map(|s| Arc::from(s.as_ref()));
            match unit {
                TimeUnit::Second => ParquetValue::TimestampSecond(
                    primitive_value::<TimestampSecondType>(array, index)?,
                    tz,
                ),
                TimeUnit::Millisecond => ParquetValue::TimestampMillis(
                    primitive_value::<TimestampMillisecondType>(array, index)?,
                    tz,
                ),
                TimeUnit::Microsecond => ParquetValue::TimestampMicros(
                    primitive_value::<TimestampMicrosecondType>(array, index)?,
                    tz,
                ),
                TimeUnit::Nanosecond => ParquetValue::TimestampNanos(
                    primitive_value::<TimestampNanosecondType>(array, index)?,
                    tz,
                ),
            }
        }

        DataType::Time32(TimeUnit::Second) => ParquetValue::TimeMillis(
            primitive_value::<Time32SecondType>(array, index)?.saturating_mul(1000),
        ),
        DataType::Time32(TimeUnit::Millisecond) => {
            ParquetValue::TimeMillis(primitive_value::<Time32MillisecondType>(array, index)?)
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            ParquetValue::TimeMicros(primitive_value::<Time64MicrosecondType>(array, index)?)
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            ParquetValue::TimeNanos(primitive_value::<Time64NanosecondType>(array, index)?)
        }

        DataType::Decimal128(_, scale) => {
            ParquetValue::Decimal128(downcast_array::<Decimal128Array>(array)?.value(index), *scale)
        }
        DataType::Decimal256(_, scale) => {
            let value = downcast_array::<Decimal256Array>(array)?.value(index);
            ParquetValue::Decimal256(bigint_from_i256(value), *scale)
        }

        DataType::List(_) => {
            list_values(&downcast_array::<ListArray>(array)?.value(index))?
        }
        DataType::LargeList(_) => {
            list_values(&downcast_array::<LargeListArray>(array)?.value(index))?
        }
        DataType::FixedSizeList(_, _) => {
            list_values(&downcast_array::<FixedSizeListArray>(array)?.value(index))?
        }
        DataType::Map(_, _) => {
            let entries = downcast_array::<MapArray>(array)?.value(index);
            let (keys, values) = (entries.column(0), entries.column(1));
            let mut pairs = Vec::with_capacity(keys.len());
            for i in 0..keys.len() {
                pairs.push((
                    arrow_to_parquet_value(keys, i)?,
                    arrow_to_parquet_value(values, i)?,
                ));
            }
            ParquetValue::Map(pairs)
        }
        DataType::Struct(_) => {
            let array = downcast_array::<StructArray>(array)?;
            let mut record = Record::with_capacity(array.num_columns());
            for (field, column) in array.fields().iter().zip(array.columns()) {
                record.insert(
                    Arc::from(field.name().as_str()),
                    arrow_to_parquet_value(column, index)?,
                );
            }
            ParquetValue::Record(record)
        }
        DataType::Dictionary(_, _) => {
            let dictionary = array.as_any_dictionary_opt().ok_or_else(|| {
                PqError::conversion("Failed to cast dictionary-encoded column")
            })?;
            let key = dictionary.normalized_keys()[index];
            arrow_to_parquet_value(dictionary.values().as_ref(), key)?
        }

        dt => {
            return Err(PqError::conversion(format!(
                "Unsupported data type for conversion: {:?}",
                dt
            )))
        }
    };

    Ok(value)
}

fn list_values(items: &ArrayRef) -> Result<ParquetValue> {
    let mut values = Vec::with_capacity(items.len());
    for i in 0..items.len() {
        values.push(arrow_to_parquet_value(items.as_ref(), i)?);
    }
    Ok(ParquetValue::List(values))
}

fn bigint_from_i256(value: i256) -> num::BigInt {
    num::BigInt::from_signed_bytes_le(&value.to_le_bytes())
}

fn i256_from_bigint(value: &num::BigInt) -> Result<i256> {
    let bytes = value.to_signed_bytes_le();
    if bytes.len() > 32 {
        return Err(PqError::conversion("Decimal256 value too large"));
    }
    let fill = if value.sign() == num::bigint::Sign::Minus {
        0xff
    } else {
        0x00
    };
    let mut buf = [fill; 32];
    buf[..bytes.len()].copy_from_slice(&bytes);
    Ok(i256::from_le_bytes(buf))
}

fn mismatch(expected: &str, value: &ParquetValue) -> PqError {
    PqError::conversion(format!("Expected {}, got {}", expected, value.type_name()))
}

/// Build a primitive column; `extract` returns `None` for values of the wrong type
fn build_primitive<T, F>(values: Vec<ParquetValue>, expected: &str, extract: F) -> Result<PrimitiveArray<T>>
where
    T: ArrowPrimitiveType,
    F: Fn(&ParquetValue) -> Option<T::Native>,
{
    let mut builder = PrimitiveBuilder::<T>::with_capacity(values.len());
    for value in &values {
        match value {
            ParquetValue::Null => builder.append_null(),
            other => builder.append_value(extract(other).ok_or_else(|| mismatch(expected, other))?),
        }
    }
    Ok(builder.finish())
}

/// Convert a vector of ParquetValues to an Arrow array matching `field`
pub fn parquet_values_to_arrow_array(values: Vec<ParquetValue>, field: &Field) -> Result<ArrayRef> {
    use ParquetValue as V;

    let array: ArrayRef = match field.data_type() {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(values.len());
            for value in &values {
                match value {
                    V::Boolean(b) => builder.append_value(*b),
                    V::Null => builder.append_null(),
                    other => return Err(mismatch("Boolean", other)),
                }
            }
            Arc::new(builder.finish())
        }

        // Narrower signed integers widen into wider columns
        DataType::Int8 => Arc::new(build_primitive::<Int8Type, _>(values, "Int8", |v| match v {
            V::Int8(i) => Some(*i),
            _ => None,
        })?),
        DataType::Int16 => Arc::new(build_primitive::<Int16Type, _>(values, "Int16", |v| match v {
            V::Int16(i) => Some(*i),
            V::Int8(i) => Some(i16::from(*i)),
            _ => None,
        })?),
        DataType::Int32 => Arc::new(build_primitive::<Int32Type, _>(values, "Int32", |v| match v {
            V::Int32(i) => Some(*i),
            V::Int16(i) => Some(i32::from(*i)),
            V::Int8(i) => Some(i32::from(*i)),
            _ => None,
        })?),
        DataType::Int64 => Arc::new(build_primitive::<Int64Type, _>(values, "Int64", |v| match v {
            V::Int64(i) => Some(*i),
            V::Int32(i) => Some(i64::from(*i)),
            V::Int16(i) => Some(i64::from(*i)),
            V::Int8(i) => Some(i64::from(*i)),
            _ => None,
        })?),
        DataType::UInt8 => Arc::new(build_primitive::<UInt8Type, _>(values, "UInt8", |v| match v {
            V::UInt8(i) => Some(*i),
            _ => None,
        })?),
        DataType::UInt16 => {
            Arc::new(build_primitive::<UInt16Type, _>(values, "UInt16", |v| match v {
                V::UInt16(i) => Some(*i),
                V::UInt8(i) => Some(u16::from(*i)),
                _ => None,
            })?)
        }
        DataType::UInt32 => {
            Arc::new(build_primitive::<UInt32Type, _>(values, "UInt32", |v| match v {
                V::UInt32(i) => Some(*i),
                V::UInt16(i) => Some(u32::from(*i)),
                V::UInt8(i) => Some(u32::from(*i)),
                _ => None,
            })?)
        }
        DataType::UInt64 => {
            Arc::new(build_primitive::<UInt64Type, _>(values, "UInt64", |v| match v {
                V::UInt64(i) => Some(*i),
                V::UInt32(i) => Some(u64::from(*i)),
                V::UInt16(i) => Some(u64::from(*i)),
                V::UInt8(i) => Some(u64::from(*i)),
                _ => None,
            })?)
        }
        DataType::Float32 => {
            Arc::new(build_primitive::<Float32Type, _>(values, "Float32", |v| match v {
                V::Float32(f) | V::Float16(f) => Some(f.into_inner()),
                _ => None,
            })?)
        }
        DataType::Float64 => {
            Arc::new(build_primitive::<Float64Type, _>(values, "Float64", |v| match v {
                V::Float64(f) => Some(f.into_inner()),
                V::Float32(f) | V::Float16(f) => Some(f64::from(f.into_inner())),
                _ => None,
            })?)
        }

        DataType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(values.len(), 0);
            for value in &values {
                match value {
                    V::String(s) => builder.append_value(s),
                    V::Null => builder.append_null(),
                    other => return Err(mismatch("String", other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Binary => {
            let mut builder = BinaryBuilder::with_capacity(values.len(), 0);
            for value in &values {
                match value {
                    V::Bytes(b) => builder.append_value(b),
                    V::String(s) => builder.append_value(s.as_bytes()),
                    V::Null => builder.append_null(),
                    other => return Err(mismatch("Bytes", other)),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::FixedSizeBinary(size) => {
            let mut builder = FixedSizeBinaryBuilder::with_capacity(values.len(), *size);
            for value in &values {
                match value {
                    V::Bytes(b) => builder.append_value(b)?,
                    V::Null => builder.append_null(),
                    other => return Err(mismatch("Bytes", other)),
                }
            }
            Arc::new(builder.finish())
        }

        DataType::Date32 => Arc::new(build_primitive::<Date32Type, _>(values, "Date32", |v| match v {
            V::Date32(d) => Some(*d),
            _ => None,
        })?),
        DataType::Date64 => Arc::new(build_primitive::<Date64Type, _>(values, "Date64", |v| match v {
            V::Date64(d) => Some(*d),
            _ => None,
        })?),
        DataType::Time32(TimeUnit::Millisecond) => Arc::new(build_primitive::<Time32MillisecondType, _>(
            values,
            "TimeMillis",
            |v| match v {
                V::TimeMillis(t) => Some(*t),
                _ => None,
            },
        )?),
        DataType::Time64(TimeUnit::Microsecond) => Arc::new(build_primitive::<Time64MicrosecondType, _>(
            values,
            "TimeMicros",
            |v| match v {
                V::TimeMicros(t) => Some(*t),
                _ => None,
            },
        )?),
        DataType::Time64(TimeUnit::Nanosecond) => Arc::new(build_primitive::<Time64NanosecondType, _>(
            values,
            "TimeNanos",
            |v| match v {
                V::TimeNanos(t) => Some(*t),
                _ => None,
            },
        )?),

        DataType::Timestamp(unit, tz) => {
            let tz = tz.clone();
            match unit {
                TimeUnit::Second => Arc::new(
                    build_primitive::<TimestampSecondType, _>(values, "TimestampSecond", |v| match v {
                        V::TimestampSecond(t, _) => Some(*t),
                        _ => None,
                    })?
                    .with_timezone_opt(tz),
                ),
                TimeUnit::Millisecond => Arc::new(
                    build_primitive::<TimestampMillisecondType, _>(values, "TimestampMillis", |v| {
                        match v {
                            V::TimestampMillis(t, _) => Some(*t),
                            _ => None,
                        }
                    })?
                    .with_timezone_opt(tz),
                ),
                TimeUnit::Microsecond => Arc::new(
                    build_primitive::<TimestampMicrosecondType, _>(values, "TimestampMicros", |v| {
                        match v {
                            V::TimestampMicros(t, _) => Some(*t),
                            _ => None,
                        }
                    })?
                    .with_timezone_opt(tz),
                ),
                TimeUnit::Nanosecond => Arc::new(
                    build_primitive::<TimestampNanosecondType, _>(values, "TimestampNanos", |v| {
                        match v {
                            V::TimestampNanos(t, _) => Some(*t),
                            _ => None,
                        }
                    })?
                    .with_timezone_opt(tz),
                ),
            }
        }

        DataType::Decimal128(precision, scale) => Arc::new(
            build_primitive::<Decimal128Type, _>(values, "Decimal128", |v| match v {
                V::Decimal128(d, _) => Some(*d),
                _ => None,
            })?
            .with_precision_and_scale(*precision, *scale)?,
        ),
        DataType::Decimal256(precision, scale) => {
            let mut builder = Decimal256Builder::with_capacity(values.len());
            for value in &values {
                match value {
                    V::Decimal256(d, _) => builder.append_value(i256_from_bigint(d)?),
                    V::Decimal128(d, _) => builder.append_value(i256::from_i128(*d)),
                    V::Null => builder.append_null(),
                    other => return Err(mismatch("Decimal256", other)),
                }
            }
            Arc::new(builder.finish().with_precision_and_scale(*precision, *scale)?)
        }

        DataType::List(item_field) => build_list_array(values, item_field)?,
        DataType::Map(entries_field, sorted) => build_map_array(values, entries_field, *sorted)?,
        DataType::Struct(fields) => build_struct_array(values, fields)?,

        dt => {
            return Err(PqError::conversion(format!(
                "Unsupported data type for conversion: {:?}",
                dt
            )))
        }
    };

    Ok(array)
}

/// Flatten parent values into child values plus offsets and validity
fn flatten_offsets<T, F>(
    values: Vec<ParquetValue>,
    expected: &str,
    mut explode: F,
) -> Result<(Vec<T>, OffsetBuffer<i32>, NullBuffer)>
where
    F: FnMut(ParquetValue, &mut Vec<T>) -> Option<ParquetValue>,
{
    let mut children = Vec::new();
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut validity = BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        if value.is_null() {
            validity.append(false);
        } else if let Some(unexpected) = explode(value, &mut children) {
            return Err(mismatch(expected, &unexpected));
        } else {
            validity.append(true);
        }
        let end = i32::try_from(children.len())
            .map_err(|_| PqError::conversion("Nested column exceeds i32 offsets"))?;
        offsets.push(end);
    }

    Ok((
        children,
        OffsetBuffer::new(offsets.into()),
        NullBuffer::new(validity.finish()),
    ))
}

fn build_list_array(values: Vec<ParquetValue>, item_field: &Arc<Field>) -> Result<ArrayRef> {
    let (items, offsets, nulls) = flatten_offsets(values, "List", |value, items| match value {
        ParquetValue::List(list) => {
            items.extend(list);
            None
        }
        other => Some(other),
    })?;

    let item_array = parquet_values_to_arrow_array(items, item_field)?;
    Ok(Arc::new(ListArray::try_new(
        item_field.clone(),
        offsets,
        item_array,
        Some(nulls),
    )?))
}

fn build_map_array(
    values: Vec<ParquetValue>,
    entries_field: &Arc<Field>,
    sorted: bool,
) -> Result<ArrayRef> {
    let entry_fields = match entries_field.data_type() {
        DataType::Struct(fields) if fields.len() == 2 => fields.clone(),
        _ => {
            return Err(PqError::conversion(
                "Map entries field must be a struct with exactly 2 fields",
            ))
        }
    };

    let (pairs, offsets, nulls) = flatten_offsets(values, "Map", |value, pairs| match value {
        ParquetValue::Map(entries) => {
            pairs.extend(entries);
            None
        }
        other => Some(other),
    })?;

    let (keys, vals): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
    let key_array = parquet_values_to_arrow_array(keys, &entry_fields[0])?;
    let value_array = parquet_values_to_arrow_array(vals, &entry_fields[1])?;
    let entries = StructArray::try_new(entry_fields, vec![key_array, value_array], None)?;

    Ok(Arc::new(MapArray::try_new(
        entries_field.clone(),
        offsets,
        entries,
        Some(nulls),
        sorted,
    )?))
}

fn build_struct_array(values: Vec<ParquetValue>, fields: &Fields) -> Result<ArrayRef> {
    let mut validity = BooleanBufferBuilder::new(values.len());
    let mut columns: Vec<Vec<ParquetValue>> = vec![Vec::with_capacity(values.len()); fields.len()];

    for value in values {
        match value {
            ParquetValue::Record(mut record) => {
                validity.append(true);
                for (column, field) in columns.iter_mut().zip(fields.iter()) {
                    let v = record
                        .shift_remove(field.name().as_str())
                        .unwrap_or(ParquetValue::Null);
                    column.push(v);
                }
            }
            ParquetValue::Null => {
                validity.append(false);
                for column in columns.iter_mut() {
                    column.push(ParquetValue::Null);
                }
            }
            other => return Err(mismatch("Record", &other)),
        }
    }

    let arrays = columns
        .into_iter()
        .zip(fields.iter())
        .map(|(column, field)| parquet_values_to_arrow_array(column, field))
        .collect::<Result<Vec<_>>>()?;

    Ok(Arc::new(StructArray::try_new(
        fields.clone(),
        arrays,
        Some(NullBuffer::new(validity.finish())),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Int32Array, Int64Array};
    use indexmap::IndexMap;

    #[test]
    fn test_primitive_conversion_roundtrip() {
        let values = vec![
            ParquetValue::Int32(1),
            ParquetValue::Null,
            ParquetValue::Int32(3),
        ];
        let field = Field::new("n", DataType::Int32, true);
        let array = parquet_values_to_arrow_array(values.clone(), &field).unwrap();

        assert_eq!(array.len(), 3);
        for (i, expected) in values.iter().enumerate() {
            assert_eq!(&arrow_to_parquet_value(array.as_ref(), i).unwrap(), expected);
        }
    }

    #[test]
    fn test_integer_upcasting() {
        let values = vec![ParquetValue::Int8(1), ParquetValue::Int32(2)];
        let field = Field::new("n", DataType::Int64, false);
        let array = parquet_values_to_arrow_array(values, &field).unwrap();
        let ints = array.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ints.values().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let field = Field::new("n", DataType::Int32, false);
        let err = parquet_values_to_arrow_array(vec![ParquetValue::from("x")], &field).unwrap_err();
        assert!(err.to_string().contains("Expected Int32, got String"));
    }

    #[test]
    fn test_out_of_bounds_index() {
        let array = Int32Array::from(vec![1, 2]);
        assert!(arrow_to_parquet_value(&array, 5).is_err());
    }

    #[test]
    fn test_struct_roundtrip_keeps_field_names() {
        let fields = Fields::from(vec![
            Field::new("FirstName", DataType::Utf8, true),
            Field::new("age", DataType::Int32, true),
        ]);
        let field = Field::new("person", DataType::Struct(fields), true);

        let mut person = IndexMap::new();
        person.insert(Arc::from("FirstName"), ParquetValue::from("Ada"));
        person.insert(Arc::from("age"), ParquetValue::Int32(36));
        let values = vec![ParquetValue::Record(person.clone()), ParquetValue::Null];

        let array = parquet_values_to_arrow_array(values, &field).unwrap();
        assert_eq!(
            arrow_to_parquet_value(array.as_ref(), 0).unwrap(),
            ParquetValue::Record(person)
        );
        assert_eq!(arrow_to_parquet_value(array.as_ref(), 1).unwrap(), ParquetValue::Null);
    }

    #[test]
    fn test_list_and_map_roundtrip() {
        let list_field = Field::new(
            "scores",
            DataType::List(Arc::new(Field::new("item", DataType::Int64, true))),
            true,
        );
        let lists = vec![
            ParquetValue::List(vec![ParquetValue::Int64(1), ParquetValue::Int64(2)]),
            ParquetValue::Null,
            ParquetValue::List(vec![]),
        ];
        let array = parquet_values_to_arrow_array(lists.clone(), &list_field).unwrap();
        for (i, expected) in lists.iter().enumerate() {
            assert_eq!(&arrow_to_parquet_value(array.as_ref(), i).unwrap(), expected);
        }

        let entries = Field::new(
            "entries",
            DataType::Struct(Fields::from(vec![
                Field::new("key", DataType::Utf8, false),
                Field::new("value", DataType::Int32, true),
            ])),
            false,
        );
        let map_field = Field::new("attrs", DataType::Map(Arc::new(entries), false), true);
        let maps = vec![ParquetValue::Map(vec![
            (ParquetValue::from("a"), ParquetValue::Int32(1)),
            (ParquetValue::from("b"), ParquetValue::Null),
        ])];
        let array = parquet_values_to_arrow_array(maps.clone(), &map_field).unwrap();
        assert_eq!(arrow_to_parquet_value(array.as_ref(), 0).unwrap(), maps[0]);
    }

    #[test]
    fn test_decimal256_sign_handling() {
        let field = Field::new("d", DataType::Decimal256(40, 2), true);
        let values = vec![
            ParquetValue::Decimal256(num::BigInt::from(-12345), 2),
            ParquetValue::Decimal256(num::BigInt::from(987654321), 2),
        ];
        let array = parquet_values_to_arrow_array(values.clone(), &field).unwrap();
        for (i, expected) in values.iter().enumerate() {
            assert_eq!(&arrow_to_parquet_value(array.as_ref(), i).unwrap(), expected);
        }
    }

    #[test]
    fn test_dictionary_column_is_resolved() {
        use arrow_array::DictionaryArray;

        let dict: DictionaryArray<Int32Type> = vec!["x", "y", "x"].into_iter().collect();
        assert_eq!(
            arrow_to_parquet_value(&dict, 2).unwrap(),
            ParquetValue::from("x")
        );
    }
}
