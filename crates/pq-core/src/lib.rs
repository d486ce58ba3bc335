//! Windowed reading and splitting of Parquet files
//!
//! `pq-core` wraps the Apache parquet-rs crate with the operations a
//! command-line inspector needs, without ever loading a whole file.
//!
//! # Key Components
//!
//! - **Reader**: [`ParquetFile`] validates a file's framing, decodes its
//!   footer once and serves any row window
//!   - `head`/`tail`/`count`/`schema` over a cached row count
//!   - Row windows are mapped onto row groups plus an in-group offset
//!   - Every codec call runs behind [`reader::guarded`], so decoder faults
//!     become [`PqError::CorruptFile`]
//!
//! - **Materializer**: [`RowMaterializer`] turns decoded Arrow batches into
//!   [`Record`]s keyed by the declared field names
//!
//! - **Splitter**: [`Splitter`] partitions a file into contiguous near-equal
//!   row windows and re-encodes each one with the source schema
//!
//! - **Schema**: [`Schema`] and [`schema::describe`] for display, with
//!   path lookups through the [`traits::SchemaInspector`] trait
//!
//! - **Writer**: [`Writer`] encodes records or batches with dynamic batch
//!   sizing
//!
//! - **JSON**: [`JsonPrinter`] renders records as JSON lines

pub mod arrow_conversion;
pub mod error;
pub mod json;
pub mod materializer;
pub mod reader;
pub mod schema;
pub mod split;
pub mod traits;
pub mod value;
pub mod window;
pub mod writer;

pub use error::{Operation, PqError, Result};
pub use json::JsonPrinter;
pub use materializer::RowMaterializer;
pub use reader::{quiet_decoder_panics, ParquetFile, ReaderOptions, WindowBatches, WindowRows};
pub use schema::{describe, describe_field, FieldDescriptor, Repetition, Schema};
pub use split::{output_path, SplitOptions, SplitOutput, SplitReport, Splitter};
pub use value::{ParquetValue, Record};
pub use window::{PartitionPlan, RowWindow};
pub use writer::{Writer, WriterBuilder};
