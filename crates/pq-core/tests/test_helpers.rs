#![allow(dead_code)]

use arrow_schema::{DataType, Field, Fields, Schema as ArrowSchema, SchemaRef};
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use pq_core::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schema with mixed-case names, a nested struct and a list
pub fn people_schema() -> SchemaRef {
    Arc::new(ArrowSchema::new(vec![
        Field::new("UserID", DataType::Int64, false),
        Field::new("displayName", DataType::Utf8, true),
        Field::new(
            "address",
            DataType::Struct(Fields::from(vec![
                Field::new("City", DataType::Utf8, true),
                Field::new("zip", DataType::Int32, true),
            ])),
            true,
        ),
        Field::new(
            "tags",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
    ]))
}

/// Row `i` of the people fixture
pub fn person(i: i64) -> Record {
    let mut address = Record::new();
    address.insert(Arc::from("City"), ParquetValue::from(format!("city_{}", i % 7).as_str()));
    address.insert(Arc::from("zip"), ParquetValue::Int32(10_000 + i as i32));

    let display_name = if i % 5 == 4 {
        ParquetValue::Null
    } else {
        ParquetValue::from(format!("user_{}", i).as_str())
    };

    let tags = (0..(i % 3))
        .map(|t| ParquetValue::from(format!("tag_{}", t).as_str()))
        .collect();

    let mut record = Record::new();
    record.insert(Arc::from("UserID"), ParquetValue::Int64(i));
    record.insert(Arc::from("displayName"), display_name);
    record.insert(Arc::from("address"), ParquetValue::Record(address));
    record.insert(Arc::from("tags"), ParquetValue::List(tags));
    record
}

/// Write `rows` people to `path` with at most `row_group_size` rows per row
/// group
pub fn write_people(path: &Path, rows: u64, row_group_size: usize) -> PathBuf {
    write_people_with(path, rows, row_group_size, Compression::SNAPPY)
}

pub fn write_people_with(
    path: &Path,
    rows: u64,
    row_group_size: usize,
    compression: Compression,
) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut writer = WriterBuilder::new()
        .with_batch_size(7)
        .with_max_row_group_size(row_group_size)
        .with_compression(compression)
        .with_root_name("spark_schema")
        .build(file, people_schema())
        .unwrap();

    writer
        .write_records((0..rows as i64).map(person))
        .unwrap();
    assert_eq!(writer.close().unwrap(), rows);
    path.to_path_buf()
}

/// The `UserID` of every record
pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|record| match &record["UserID"] {
            ParquetValue::Int64(id) => *id,
            other => panic!("unexpected UserID value: {:?}", other),
        })
        .collect()
}

/// Every record of the file at `path`
pub fn read_all(path: &Path) -> Vec<Record> {
    let file = ParquetFile::open(path).unwrap();
    let total = file.count().unwrap();
    file.read_window(RowWindow::all(total)).unwrap()
}

/// Overwrite the page header at the start of every column chunk of
/// `row_group`, leaving the footer intact
pub fn corrupt_row_group(path: &Path, row_group: usize) {
    let ranges: Vec<(u64, u64)> = {
        let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
        reader
            .metadata()
            .row_group(row_group)
            .columns()
            .iter()
            .map(|column| column.byte_range())
            .collect()
    };

    let mut bytes = fs::read(path).unwrap();
    for (start, len) in ranges {
        let start = start as usize;
        let end = start + (len as usize).min(32);
        bytes[start..end].fill(0xFF);
    }
    fs::write(path, bytes).unwrap();
}
