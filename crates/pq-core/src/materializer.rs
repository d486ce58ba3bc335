//! Row materialization: decoded column batches into generic records

use crate::arrow_conversion::arrow_to_parquet_value;
use crate::{PqError, Record, Result};
use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use std::sync::Arc;

/// Turns rows of a decoded `RecordBatch` into `Record`s keyed by the
/// declared field names.
///
/// Field names are taken verbatim from the file schema. Nested structs stay
/// nested, lists and maps stay lists and maps.
#[derive(Debug, Clone)]
pub struct RowMaterializer {
    schema: SchemaRef,
    names: Vec<Arc<str>>,
}

impl RowMaterializer {
    pub fn new(schema: SchemaRef) -> Self {
        let names = schema
            .fields()
            .iter()
            .map(|field| Arc::from(field.name().as_str()))
            .collect();
        Self { schema, names }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Reconstruct one row of `batch`.
    ///
    /// `absolute_row` is the row's index in the file and is only used to
    /// report failures.
    pub fn reconstruct(
        &self,
        batch: &RecordBatch,
        row_in_batch: usize,
        absolute_row: u64,
    ) -> Result<Record> {
        if batch.num_columns() != self.names.len() {
            return Err(PqError::ReconstructFailed {
                row: absolute_row,
                message: format!(
                    "batch has {} columns but schema has {} fields",
                    batch.num_columns(),
                    self.names.len()
                ),
            });
        }

        let mut record = Record::with_capacity(self.names.len());
        for (name, column) in self.names.iter().zip(batch.columns()) {
            let value = arrow_to_parquet_value(column.as_ref(), row_in_batch).map_err(|e| {
                PqError::ReconstructFailed {
                    row: absolute_row,
                    message: format!("column '{}': {}", name, e),
                }
            })?;
            record.insert(name.clone(), value);
        }
        Ok(record)
    }

    /// Reconstruct every row of `batch`, whose first row sits at `first_row`
    pub fn reconstruct_batch(&self, batch: &RecordBatch, first_row: u64) -> Result<Vec<Record>> {
        (0..batch.num_rows())
            .map(|i| self.reconstruct(batch, i, first_row + i as u64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParquetValue;
    use arrow_array::{ArrayRef, Int64Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};

    fn batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("UserID", DataType::Int64, false),
            Field::new("displayName", DataType::Utf8, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![10, 11])),
            Arc::new(StringArray::from(vec![Some("a"), None])),
        ];
        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn test_field_names_keep_declared_case() {
        let batch = batch();
        let materializer = RowMaterializer::new(batch.schema());
        let record = materializer.reconstruct(&batch, 0, 0).unwrap();

        let keys: Vec<&str> = record.keys().map(|k| &**k).collect();
        assert_eq!(keys, vec!["UserID", "displayName"]);
        assert_eq!(record["UserID"], ParquetValue::Int64(10));
    }

    #[test]
    fn test_reconstruct_batch_includes_nulls() {
        let batch = batch();
        let materializer = RowMaterializer::new(batch.schema());
        let rows = materializer.reconstruct_batch(&batch, 100).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["displayName"], ParquetValue::Null);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_failure_reports_absolute_row() {
        let batch = batch();
        let materializer = RowMaterializer::new(batch.schema());
        let err = materializer.reconstruct(&batch, 7, 42).unwrap_err();

        match err {
            PqError::ReconstructFailed { row, message } => {
                assert_eq!(row, 42);
                assert!(message.contains("UserID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_count_mismatch() {
        let wide = batch();
        let narrow = Arc::new(Schema::new(vec![Field::new("only", DataType::Int64, false)]));
        let materializer = RowMaterializer::new(narrow);
        assert!(matches!(
            materializer.reconstruct(&wide, 0, 3),
            Err(PqError::ReconstructFailed { row: 3, .. })
        ));
    }
}
