//! Core Parquet writing functionality

use crate::{arrow_conversion::parquet_values_to_arrow_array, ParquetValue, PqError, Record, Result};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, SchemaRef};
use parquet::arrow::arrow_writer::ArrowWriterOptions;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rand::Rng;

// Default configuration constants
const DEFAULT_BATCH_SIZE: usize = 1000;
const DEFAULT_MEMORY_THRESHOLD: usize = 100 * 1024 * 1024; // 100MB
const DEFAULT_SAMPLE_SIZE: usize = 100;
const MIN_BATCH_SIZE: usize = 10;
const MIN_SAMPLES_FOR_ESTIMATE: usize = 10;

/// Builder for creating a configured Writer
pub struct WriterBuilder {
    compression: Compression,
    batch_size: Option<usize>,
    memory_threshold: usize,
    sample_size: usize,
    max_row_group_size: Option<usize>,
    root_name: Option<String>,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            batch_size: None,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_row_group_size: None,
            root_name: None,
        }
    }
}

impl WriterBuilder {
    /// Create a new WriterBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression algorithm
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set a fixed batch size (disables dynamic sizing)
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size.max(1));
        self
    }

    /// Set the memory threshold for flushing
    pub fn with_memory_threshold(mut self, threshold: usize) -> Self {
        self.memory_threshold = threshold;
        self
    }

    /// Set the sample size for row size estimation
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Cap the number of rows per row group
    pub fn with_max_row_group_size(mut self, rows: usize) -> Self {
        self.max_row_group_size = Some(rows.max(1));
        self
    }

    /// Name of the schema root written to the footer
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Build a Writer with the configured settings
    pub fn build<W: std::io::Write + Send>(self, writer: W, schema: SchemaRef) -> Result<Writer<W>> {
        if schema.fields().is_empty() {
            return Err(PqError::schema("cannot write a file with no fields"));
        }

        let mut props = WriterProperties::builder().set_compression(self.compression);
        if let Some(rows) = self.max_row_group_size {
            props = props.set_max_row_group_size(rows);
        }

        let mut options = ArrowWriterOptions::new().with_properties(props.build());
        if let Some(root) = self.root_name {
            options = options.with_schema_root(root);
        }

        let arrow_writer = ArrowWriter::try_new_with_options(writer, schema.clone(), options)?;

        Ok(Writer {
            arrow_writer: Some(arrow_writer),
            arrow_schema: schema,
            buffered_rows: Vec::new(),
            current_batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            memory_threshold: self.memory_threshold,
            sample_size: self.sample_size,
            size_samples: Vec::with_capacity(self.sample_size),
            total_rows_written: 0,
            fixed_batch_size: self.batch_size,
        })
    }
}

/// Parquet writer over any `Write` sink
///
/// Accepts either keyed records, which are buffered and flushed as columnar
/// batches, or already decoded `RecordBatch`es.
pub struct Writer<W: std::io::Write + Send> {
    arrow_writer: Option<ArrowWriter<W>>,
    arrow_schema: SchemaRef,
    buffered_rows: Vec<Vec<ParquetValue>>,
    current_batch_size: usize,
    memory_threshold: usize,
    sample_size: usize,
    size_samples: Vec<usize>,
    total_rows_written: u64,
    fixed_batch_size: Option<usize>,
}

impl<W> Writer<W>
where
    W: std::io::Write + Send,
{
    /// Create a new writer with default settings
    pub fn new(writer: W, schema: SchemaRef) -> Result<Self> {
        WriterBuilder::new().build(writer, schema)
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.arrow_schema
    }

    /// Rows handed to the encoder so far, excluding still-buffered rows
    pub fn rows_written(&self) -> u64 {
        self.total_rows_written
    }

    /// Write every record of `records`
    pub fn write_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Write a single record
    ///
    /// Keys must name schema fields. A missing nullable field is written as
    /// null; a missing required field is an error.
    pub fn write_record(&mut self, mut record: Record) -> Result<()> {
        if let Some(unknown) = record
            .keys()
            .find(|key| self.arrow_schema.index_of(key).is_err())
        {
            return Err(PqError::schema(format!("unknown field '{}'", unknown)));
        }

        let mut row = Vec::with_capacity(self.arrow_schema.fields().len());
        for field in self.arrow_schema.fields() {
            let value = match record.swap_remove(field.name().as_str()) {
                Some(value) => value,
                None if field.is_nullable() => ParquetValue::Null,
                None => {
                    return Err(PqError::schema(format!(
                        "Required field '{}' is missing",
                        field.name()
                    )))
                }
            };
            validate_value_against_field(&value, field, field.name())?;
            row.push(value);
        }

        // Sample row size for dynamic batch sizing
        if self.fixed_batch_size.is_none() {
            self.sample_row_size(&row);
        }

        self.buffered_rows.push(row);

        if self.buffered_rows.len() >= self.current_batch_size {
            self.flush_buffered_rows()?;
        }

        Ok(())
    }

    /// Write a decoded batch as is. Buffered records are flushed first so
    /// row order is kept.
    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        if batch.schema().fields() != self.arrow_schema.fields() {
            return Err(PqError::schema(
                "batch schema does not match the writer schema",
            ));
        }

        self.flush_buffered_rows()?;
        self.write_to_encoder(batch)
    }

    /// Sample row size for dynamic batch sizing using reservoir sampling
    fn sample_row_size(&mut self, row: &[ParquetValue]) {
        let row_size = self.estimate_row_size(row);

        if self.size_samples.len() < self.sample_size {
            self.size_samples.push(row_size);
        } else {
            let seen = self.total_rows_written as usize + self.buffered_rows.len();
            let mut rng = rand::rng();
            let idx = rng.random_range(0..=seen);
            if idx < self.sample_size {
                self.size_samples[idx] = row_size;
            }
        }

        if self.size_samples.len() >= MIN_SAMPLES_FOR_ESTIMATE {
            self.update_batch_size();
        }
    }

    /// Estimate the memory size of a single row
    fn estimate_row_size(&self, row: &[ParquetValue]) -> usize {
        row.iter()
            .zip(self.arrow_schema.fields())
            .map(|(value, field)| estimate_value_size(value, field.data_type()))
            .sum()
    }

    /// Update dynamic batch size based on current samples
    fn update_batch_size(&mut self) {
        if self.size_samples.is_empty() {
            return;
        }

        let total_size: usize = self.size_samples.iter().sum();
        let avg_row_size = (total_size as f64 / self.size_samples.len() as f64).max(1.0);
        let suggested_batch_size = (self.memory_threshold as f64 / avg_row_size).floor() as usize;
        self.current_batch_size = suggested_batch_size.max(MIN_BATCH_SIZE);
    }

    /// Flush buffered rows to the Parquet file
    fn flush_buffered_rows(&mut self) -> Result<()> {
        if self.buffered_rows.is_empty() {
            return Ok(());
        }

        let rows = std::mem::take(&mut self.buffered_rows);
        let num_rows = rows.len();

        // Transpose rows to columns
        let num_cols = self.arrow_schema.fields().len();
        let mut columns: Vec<Vec<ParquetValue>> = vec![Vec::with_capacity(num_rows); num_cols];
        for row in rows {
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
        }

        let arrow_columns = columns
            .into_iter()
            .zip(self.arrow_schema.fields())
            .map(|(values, field)| parquet_values_to_arrow_array(values, field))
            .collect::<Result<Vec<_>>>()?;

        let batch = RecordBatch::try_new(self.arrow_schema.clone(), arrow_columns)?;
        self.write_to_encoder(&batch)
    }

    fn write_to_encoder(&mut self, batch: &RecordBatch) -> Result<()> {
        let writer = self
            .arrow_writer
            .as_mut()
            .ok_or_else(|| PqError::invalid_argument("writer has been closed"))?;

        writer.write(batch)?;
        self.total_rows_written += batch.num_rows() as u64;

        // Check if we need to flush based on memory usage
        if writer.in_progress_size() >= self.memory_threshold {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush any buffered data
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffered_rows()?;

        if let Some(writer) = &mut self.arrow_writer {
            writer.flush()?;
        }
        Ok(())
    }

    /// Close the writer and write the file footer, returning the number of
    /// rows in the file
    ///
    /// This must be called to finalize the Parquet file
    pub fn close(mut self) -> Result<u64> {
        self.flush_buffered_rows()?;

        if let Some(writer) = self.arrow_writer.take() {
            writer.close()?;
        }
        Ok(self.total_rows_written)
    }
}

/// Estimate the memory footprint of a single value
fn estimate_value_size(value: &ParquetValue, data_type: &DataType) -> usize {
    use ParquetValue::*;

    match (value, data_type) {
        (Null, _) => 0,

        // Fixed size types
        (Boolean(_), DataType::Boolean) => 1,
        (Int8(_), DataType::Int8) | (UInt8(_), DataType::UInt8) => 1,
        (Int16(_), DataType::Int16) | (UInt16(_), DataType::UInt16) => 2,
        (Float16(_), DataType::Float16) => 2,
        (Int32(_), DataType::Int32) | (UInt32(_), DataType::UInt32) => 4,
        (Float32(_), DataType::Float32) => 4,
        (Int64(_), DataType::Int64) | (UInt64(_), DataType::UInt64) => 8,
        (Float64(_), DataType::Float64) => 8,
        (Date32(_), DataType::Date32) => 4,
        (Date64(_), DataType::Date64) => 8,
        (TimeMillis(_), DataType::Time32(_)) => 4,
        (TimeMicros(_), DataType::Time64(_)) | (TimeNanos(_), DataType::Time64(_)) => 8,
        (TimestampSecond(_, _), DataType::Timestamp(_, _))
        | (TimestampMillis(_, _), DataType::Timestamp(_, _))
        | (TimestampMicros(_, _), DataType::Timestamp(_, _))
        | (TimestampNanos(_, _), DataType::Timestamp(_, _)) => 8,
        (Decimal128(_, _), DataType::Decimal128(_, _)) => 16,

        // Variable size types
        (String(s), DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) => {
            s.len() + std::mem::size_of::<usize>() * 3
        }
        (Bytes(b), DataType::Binary | DataType::LargeBinary | DataType::BinaryView) => {
            b.len() + std::mem::size_of::<usize>() * 3
        }
        (Bytes(_), DataType::FixedSizeBinary(len)) => *len as usize,

        (Decimal256(v, _), DataType::Decimal256(_, _)) => 32 + v.to_signed_bytes_le().len(),

        // Complex types: sample up to 5 elements
        (List(items), DataType::List(field) | DataType::LargeList(field)) => {
            let base_size = std::mem::size_of::<usize>() * 3;
            if items.is_empty() {
                base_size
            } else {
                let sample_count = items.len().min(5);
                let sample_size: usize = items
                    .iter()
                    .take(sample_count)
                    .map(|item| estimate_value_size(item, field.data_type()))
                    .sum();
                base_size + (sample_size / sample_count) * items.len()
            }
        }

        (Map(entries), DataType::Map(entries_field, _)) => match entries_field.data_type() {
            DataType::Struct(fields) if fields.len() >= 2 && !entries.is_empty() => {
                let base_size = std::mem::size_of::<usize>() * 4;
                let sample_count = entries.len().min(5);
                let sample_size: usize = entries
                    .iter()
                    .take(sample_count)
                    .map(|(key, val)| {
                        estimate_value_size(key, fields[0].data_type())
                            + estimate_value_size(val, fields[1].data_type())
                    })
                    .sum();
                base_size + (sample_size / sample_count) * entries.len()
            }
            _ => std::mem::size_of::<usize>() * 4,
        },

        (Record(fields), DataType::Struct(schema_fields)) => {
            let base_size = std::mem::size_of::<usize>() * 3;
            let field_sizes: usize = schema_fields
                .iter()
                .filter_map(|field| {
                    fields
                        .get(field.name().as_str())
                        .map(|val| estimate_value_size(val, field.data_type()))
                })
                .sum();
            base_size + field_sizes
        }

        _ => 100, // Default estimate for mismatched types
    }
}

/// Validate a value against its field schema
fn validate_value_against_field(value: &ParquetValue, field: &Field, path: &str) -> Result<()> {
    use ParquetValue::*;

    if matches!(value, Null) {
        if !field.is_nullable() {
            return Err(PqError::schema(format!(
                "Found null value for non-nullable field at {}",
                path
            )));
        }
        return Ok(());
    }

    match (value, field.data_type()) {
        (Boolean(_), DataType::Boolean) => Ok(()),

        (Int8(_), DataType::Int8)
        | (Int16(_), DataType::Int16)
        | (Int32(_), DataType::Int32)
        | (Int64(_), DataType::Int64)
        | (UInt8(_), DataType::UInt8)
        | (UInt16(_), DataType::UInt16)
        | (UInt32(_), DataType::UInt32)
        | (UInt64(_), DataType::UInt64) => Ok(()),

        (Float16(_), DataType::Float16)
        | (Float32(_), DataType::Float32)
        | (Float64(_), DataType::Float64) => Ok(()),

        (String(_), DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) => Ok(()),
        (Bytes(_), DataType::Binary | DataType::LargeBinary | DataType::BinaryView) => Ok(()),
        (Bytes(_), DataType::FixedSizeBinary(_)) => Ok(()), // Size check done during conversion

        (Date32(_), DataType::Date32) | (Date64(_), DataType::Date64) => Ok(()),
        (TimeMillis(_), DataType::Time32(_)) => Ok(()),
        (TimeMicros(_), DataType::Time64(_)) | (TimeNanos(_), DataType::Time64(_)) => Ok(()),
        (TimestampSecond(_, _), DataType::Timestamp(_, _))
        | (TimestampMillis(_, _), DataType::Timestamp(_, _))
        | (TimestampMicros(_, _), DataType::Timestamp(_, _))
        | (TimestampNanos(_, _), DataType::Timestamp(_, _)) => Ok(()),

        (Decimal128(_, _), DataType::Decimal128(_, _)) => Ok(()),
        (Decimal256(_, _), DataType::Decimal256(_, _)) => Ok(()),

        (List(items), DataType::List(item_field) | DataType::LargeList(item_field)) => {
            for (idx, item) in items.iter().enumerate() {
                validate_value_against_field(item, item_field, &format!("{}[{}]", path, idx))?;
            }
            Ok(())
        }

        (Map(entries), DataType::Map(entries_field, _)) => {
            if let DataType::Struct(fields) = entries_field.data_type() {
                if fields.len() >= 2 {
                    for (idx, (key, val)) in entries.iter().enumerate() {
                        validate_value_against_field(
                            key,
                            &fields[0],
                            &format!("{}.key[{}]", path, idx),
                        )?;
                        validate_value_against_field(
                            val,
                            &fields[1],
                            &format!("{}.value[{}]", path, idx),
                        )?;
                    }
                }
            }
            Ok(())
        }

        (Record(record_fields), DataType::Struct(schema_fields)) => {
            if let Some(unknown) = record_fields
                .keys()
                .find(|key| !schema_fields.iter().any(|f| f.name().as_str() == &***key))
            {
                return Err(PqError::schema(format!(
                    "unknown field '{}' in struct at {}",
                    unknown, path
                )));
            }
            for field in schema_fields {
                let field_name = field.name();
                if let Some(value) = record_fields.get(field_name.as_str()) {
                    validate_value_against_field(value, field, &format!("{}.{}", path, field_name))?;
                } else if !field.is_nullable() {
                    return Err(PqError::schema(format!(
                        "Required field '{}' is missing in struct at {}",
                        field_name, path
                    )));
                }
            }
            Ok(())
        }

        (value, expected_type) => Err(PqError::schema(format!(
            "Type mismatch at {}: expected {:?}, got {}",
            path,
            expected_type,
            value.type_name()
        ))),
    }
}
