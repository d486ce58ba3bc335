//! Splitting one Parquet file into several smaller ones
//!
//! The source's rows are partitioned into contiguous near-equal windows
//! (see [`PartitionPlan`]). Each window is streamed from the source in bounded
//! batches and written through a fresh [`Writer`] that carries the source's
//! Arrow schema, root name and compression codec unchanged.

use crate::reader::{ParquetFile, ReaderOptions};
use crate::window::{PartitionPlan, RowWindow};
use crate::writer::{Writer, WriterBuilder};
use crate::{PqError, Result};
use parquet::basic::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const DEFAULT_SPLIT_BATCH_SIZE: usize = 1024;

/// Options for [`Splitter`]
#[derive(Debug, Clone)]
pub struct SplitOptions {
    batch_size: usize,
    compression: Option<Compression>,
    max_row_group_size: Option<usize>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SPLIT_BATCH_SIZE,
            compression: None,
            max_row_group_size: None,
        }
    }
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows read from the source per batch
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Compress outputs with `compression` instead of the source's codec
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_max_row_group_size(mut self, rows: usize) -> Self {
        self.max_row_group_size = Some(rows.max(1));
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// One file produced by a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub path: PathBuf,
    /// Rows of the source this file holds
    pub window: RowWindow,
}

#[derive(Debug, Clone)]
pub struct SplitReport {
    source: PathBuf,
    total_rows: u64,
    rows_per_file: u64,
    outputs: Vec<SplitOutput>,
}

impl SplitReport {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn rows_per_file(&self) -> u64 {
        self.rows_per_file
    }

    pub fn files_written(&self) -> usize {
        self.outputs.len()
    }

    pub fn outputs(&self) -> &[SplitOutput] {
        &self.outputs
    }
}

/// Path of the `index`-th output (1-based) of splitting `source`.
///
/// `data/events.parquet` becomes `data/events_1.parquet`; a source without
/// an extension such as `dump` becomes `dump_1`.
pub fn output_path(source: &Path, index: usize) -> PathBuf {
    let stem = source.file_stem().unwrap_or_else(|| source.as_os_str());
    let mut name = OsString::from(stem);
    name.push(format!("_{}", index));
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    source.with_file_name(name)
}

/// Splits Parquet files into contiguous row ranges
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    options: SplitOptions,
}

impl Splitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    /// Split `path` into at most `parts` files next to it.
    ///
    /// Fails with `EmptyFile` without writing anything when the source has no
    /// rows. If writing partition `i` fails its partial output is removed and
    /// the error returned; outputs `1..i` stay on disk.
    pub fn split(&self, path: impl AsRef<Path>, parts: u64) -> Result<SplitReport> {
        let path = path.as_ref();
        let source = ParquetFile::open_with_options(
            path,
            ReaderOptions::new().with_batch_size(self.options.batch_size),
        )?;

        let total_rows = source.count()?;
        if total_rows == 0 {
            return Err(PqError::empty_file(path));
        }
        let plan = PartitionPlan::new(total_rows, parts)?;
        log::debug!(
            "splitting {} ({} rows) into {} files of up to {} rows",
            path.display(),
            total_rows,
            plan.len(),
            plan.rows_per_part()
        );

        let mut outputs = Vec::with_capacity(plan.len());
        for (idx, window) in plan.windows().iter().enumerate() {
            let target = output_path(path, idx + 1);
            // nothing to clean up when the output could not be created
            let file =
                File::create(&target).map_err(|e| PqError::write_failed(&target, e.to_string()))?;
            if let Err(e) = self.write_partition(&source, *window, file, &target) {
                if let Err(cleanup) = fs::remove_file(&target) {
                    log::warn!(
                        "could not remove partial output {}: {}",
                        target.display(),
                        cleanup
                    );
                }
                return Err(e);
            }
            log::info!(
                "wrote {} rows {}..{} to {}",
                window.len,
                window.start,
                window.end(),
                target.display()
            );
            outputs.push(SplitOutput {
                path: target,
                window: *window,
            });
        }

        Ok(SplitReport {
            source: path.to_path_buf(),
            total_rows,
            rows_per_file: plan.rows_per_part(),
            outputs,
        })
    }

    fn write_partition(
        &self,
        source: &ParquetFile,
        window: RowWindow,
        file: File,
        target: &Path,
    ) -> Result<()> {
        let schema = source.schema()?;

        let mut builder = WriterBuilder::new()
            .with_batch_size(self.options.batch_size)
            .with_root_name(schema.root_name())
            .with_compression(
                self.options
                    .compression
                    .or_else(|| source.compression())
                    .unwrap_or(Compression::UNCOMPRESSED),
            );
        if let Some(rows) = self.options.max_row_group_size {
            builder = builder.with_max_row_group_size(rows);
        }

        let mut writer: Writer<File> = builder
            .build(file, schema.arrow_schema().clone())
            .map_err(|e| write_error(target, e))?;

        for batch in source.batches(window)? {
            let batch = batch?;
            writer
                .write_batch(&batch)
                .map_err(|e| write_error(target, e))?;
        }

        let written = writer.close().map_err(|e| write_error(target, e))?;
        if written != window.len {
            return Err(PqError::write_failed(
                target,
                format!("expected {} rows but wrote {}", window.len, written),
            ));
        }
        Ok(())
    }
}

fn write_error(target: &Path, err: PqError) -> PqError {
    match err {
        PqError::WriteFailed { .. } => err,
        other => PqError::write_failed(target, other.to_string()),
    }
}
