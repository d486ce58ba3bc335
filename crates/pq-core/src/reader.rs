//! Windowed Parquet reading
//!
//! A [`ParquetFile`] decodes the footer once at open time and then serves any
//! row window by selecting the overlapping row groups and applying an in-group
//! offset and limit. Every call into the codec runs inside [`guarded`], so a
//! decoder fault on malformed input surfaces as [`PqError::CorruptFile`]
//! instead of unwinding through the caller.

use crate::materializer::RowMaterializer;
use crate::traits::SchemaInspector;
use crate::window::RowWindow;
use crate::{Operation, PqError, Record, Result, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReader,
    ParquetRecordBatchReaderBuilder,
};
use parquet::basic::Compression;
use std::any::Any;
use std::cell::Cell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

const PARQUET_MAGIC: &[u8; 4] = b"PAR1";
/// Header magic, 4-byte footer length and trailing magic
const MIN_FILE_SIZE: u64 = 12;
const DEFAULT_BATCH_SIZE: usize = 1024;

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Options controlling how a [`ParquetFile`] reads
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    batch_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of rows decoded per batch
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Run a codec call, turning codec errors and panics into `CorruptFile`.
///
/// Errors that are not codec errors (I/O, a closed handle) pass through
/// unchanged.
pub fn guarded<T, F>(path: &Path, op: Operation, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|depth| depth.set(depth.get() - 1));

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(codec_error(path, op, err)),
        Err(payload) => Err(PqError::corrupt(path, op, panic_message(payload.as_ref()))),
    }
}

fn inside_guarded() -> bool {
    GUARD_DEPTH.with(Cell::get) > 0
}

/// Install a panic hook that sends panics raised inside [`guarded`] to the
/// debug log instead of stderr.
///
/// Those panics are already reported as `CorruptFile`. Panics anywhere else
/// still reach the previously installed hook.
pub fn quiet_decoder_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if inside_guarded() {
            log::debug!("recovered decoder panic: {}", info);
        } else {
            previous(info);
        }
    }));
}

fn codec_error(path: &Path, op: Operation, err: PqError) -> PqError {
    match err {
        PqError::Parquet(e) => PqError::corrupt(path, op, e.to_string()),
        PqError::Arrow(e) => PqError::corrupt(path, op, e.to_string()),
        other => other,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("decoder panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("decoder panicked: {}", msg)
    } else {
        "decoder panicked".to_string()
    }
}

/// An open Parquet file
///
/// Owns the file descriptor and the decoded footer. The descriptor is
/// released by [`ParquetFile::close`] or when the handle is dropped.
pub struct ParquetFile {
    path: PathBuf,
    file: Option<File>,
    metadata: ArrowReaderMetadata,
    schema: Schema,
    row_count: u64,
    options: ReaderOptions,
}

impl std::fmt::Debug for ParquetFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetFile")
            .field("path", &self.path)
            .field("row_count", &self.row_count)
            .field("closed", &self.file.is_none())
            .finish()
    }
}

impl ParquetFile {
    /// Open a file with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    /// Open a file, validate its framing and decode its footer
    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(PqError::not_found(path)),
            Err(e) => return Err(e.into()),
        };

        check_framing(path, &mut file)?;

        let metadata = guarded(path, Operation::Open, || {
            Ok(ArrowReaderMetadata::load(&file, ArrowReaderOptions::new())?)
        })?;

        let num_rows = metadata.metadata().file_metadata().num_rows();
        let row_count = u64::try_from(num_rows).map_err(|_| {
            PqError::corrupt(
                path,
                Operation::Open,
                format!("footer declares {} rows", num_rows),
            )
        })?;

        let schema = guarded(path, Operation::Schema, || {
            Ok(Schema::from_parquet(
                metadata.metadata().file_metadata().schema_descr(),
                metadata.schema().clone(),
            ))
        })?;

        log::debug!(
            "opened {}: {} rows in {} row groups, {} fields",
            path.display(),
            row_count,
            metadata.metadata().num_row_groups(),
            schema.field_count()
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            metadata,
            schema,
            row_count,
            options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Number of rows declared by the footer
    pub fn count(&self) -> Result<u64> {
        self.handle()?;
        Ok(self.row_count)
    }

    pub fn schema(&self) -> Result<&Schema> {
        self.handle()?;
        if self.schema.is_empty() {
            return Err(PqError::NoSchema {
                path: self.path.clone(),
            });
        }
        Ok(&self.schema)
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    /// Codec of the first column chunk, if the file has any
    pub fn compression(&self) -> Option<Compression> {
        let first_group = self.metadata.metadata().row_groups().first()?;
        first_group.columns().first().map(|column| column.compression())
    }

    /// The first `n` rows
    pub fn head(&self, n: u64) -> Result<Vec<Record>> {
        self.require_rows()?;
        self.read_window(RowWindow::head(n, self.row_count))
    }

    /// The last `n` rows, in file order
    pub fn tail(&self, n: u64) -> Result<Vec<Record>> {
        self.require_rows()?;
        self.read_window(RowWindow::tail(n, self.row_count))
    }

    /// Materialize every row of `window`
    ///
    /// The window is clamped to the file, so a window running past the end
    /// yields the rows that exist.
    pub fn read_window(&self, window: RowWindow) -> Result<Vec<Record>> {
        let materializer = RowMaterializer::new(self.schema()?.arrow_schema().clone());
        let mut batches = self.batches(window)?;
        let mut records = Vec::with_capacity(window.clamp(self.row_count).len as usize);

        loop {
            let first_row = batches.position();
            match batches.next() {
                Some(batch) => records.extend(materializer.reconstruct_batch(&batch?, first_row)?),
                None => return Ok(records),
            }
        }
    }

    /// Stream the rows of `window` one batch at a time
    pub fn rows(&self, window: RowWindow) -> Result<WindowRows> {
        let schema = self.schema()?;
        let materializer = RowMaterializer::new(schema.arrow_schema().clone());
        Ok(WindowRows {
            batches: self.batches(window)?,
            materializer,
            current: None,
            failed: false,
        })
    }

    /// Stream the decoded batches of `window`
    pub fn batches(&self, window: RowWindow) -> Result<WindowBatches> {
        let file = self.handle()?;
        let window = window.clamp(self.row_count);

        if window.is_empty() {
            return Ok(WindowBatches {
                path: self.path.clone(),
                reader: None,
                next_row: window.start,
            });
        }

        let group_rows: Vec<u64> = self
            .metadata
            .metadata()
            .row_groups()
            .iter()
            .map(|group| u64::try_from(group.num_rows()).unwrap_or(0))
            .collect();
        let (row_groups, offset) = select_row_groups(&group_rows, window);

        log::debug!(
            "seek {}: rows {}..{} via row groups {:?}, offset {}",
            self.path.display(),
            window.start,
            window.end(),
            row_groups,
            offset
        );

        let reader = guarded(&self.path, Operation::Seek, || {
            let source = file.try_clone()?;
            let builder =
                ParquetRecordBatchReaderBuilder::new_with_metadata(source, self.metadata.clone())
                    .with_row_groups(row_groups)
                    .with_offset(offset)
                    .with_limit(usize::try_from(window.len).unwrap_or(usize::MAX))
                    .with_batch_size(self.options.batch_size);
            Ok(builder.build()?)
        })?;

        Ok(WindowBatches {
            path: self.path.clone(),
            reader: Some(reader),
            next_row: window.start,
        })
    }

    /// Release the file descriptor. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            log::debug!("closed {}", self.path.display());
        }
    }

    fn handle(&self) -> Result<&File> {
        self.file.as_ref().ok_or_else(|| PqError::Closed {
            path: self.path.clone(),
        })
    }

    fn require_rows(&self) -> Result<()> {
        self.handle()?;
        if self.row_count == 0 {
            return Err(PqError::empty_file(&self.path));
        }
        Ok(())
    }
}

/// Reject anything that is not framed as a Parquet file before the footer is
/// trusted.
fn check_framing(path: &Path, file: &mut File) -> Result<()> {
    let meta = file.metadata()?;
    if !meta.is_file() {
        return Err(PqError::invalid_format(path, "not a regular file"));
    }
    if meta.len() < MIN_FILE_SIZE {
        return Err(PqError::invalid_format(
            path,
            format!("file is too small ({} bytes)", meta.len()),
        ));
    }

    let mut magic = [0u8; 4];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut magic)?;
    if &magic != PARQUET_MAGIC {
        return Err(PqError::invalid_format(path, "missing PAR1 header magic"));
    }

    file.seek(SeekFrom::End(-4))?;
    file.read_exact(&mut magic)?;
    if &magic != PARQUET_MAGIC {
        return Err(PqError::invalid_format(path, "missing PAR1 footer magic"));
    }

    file.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Row groups overlapping `window`, and the number of rows to skip in the
/// first selected group
fn select_row_groups(group_rows: &[u64], window: RowWindow) -> (Vec<usize>, usize) {
    let mut selected = Vec::new();
    let mut offset = 0;
    let mut group_start = 0u64;

    for (idx, &rows) in group_rows.iter().enumerate() {
        let group_end = group_start + rows;
        if group_end > window.start && group_start < window.end() {
            if selected.is_empty() {
                offset = usize::try_from(window.start - group_start).unwrap_or(usize::MAX);
            }
            selected.push(idx);
        }
        if group_start >= window.end() {
            break;
        }
        group_start = group_end;
    }

    (selected, offset)
}

/// Decoded batches of one row window
pub struct WindowBatches {
    path: PathBuf,
    reader: Option<ParquetRecordBatchReader>,
    next_row: u64,
}

impl WindowBatches {
    /// Absolute index of the first row of the next batch
    pub fn position(&self) -> u64 {
        self.next_row
    }
}

impl Iterator for WindowBatches {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let next = guarded(&self.path, Operation::Read, || {
            reader.next().transpose().map_err(PqError::from)
        });

        match next {
            Ok(Some(batch)) => {
                self.next_row += batch.num_rows() as u64;
                Some(Ok(batch))
            }
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

/// Materialized rows of one row window
pub struct WindowRows {
    batches: WindowBatches,
    materializer: RowMaterializer,
    current: Option<BatchCursor>,
    failed: bool,
}

struct BatchCursor {
    batch: RecordBatch,
    first_row: u64,
    next: usize,
}

impl Iterator for WindowRows {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(cursor) = self.current.as_mut() {
                if cursor.next < cursor.batch.num_rows() {
                    let idx = cursor.next;
                    cursor.next += 1;
                    let row = self.materializer.reconstruct(
                        &cursor.batch,
                        idx,
                        cursor.first_row + idx as u64,
                    );
                    if row.is_err() {
                        self.failed = true;
                    }
                    return Some(row);
                }
            }

            let first_row = self.batches.position();
            match self.batches.next()? {
                Ok(batch) => {
                    self.current = Some(BatchCursor {
                        batch,
                        first_row,
                        next: 0,
                    });
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_row_groups_skips_leading_groups() {
        // three groups of 100 rows
        let groups = [100, 100, 100];

        let (selected, offset) = select_row_groups(&groups, RowWindow::new(150, 20));
        assert_eq!(selected, vec![1]);
        assert_eq!(offset, 50);

        let (selected, offset) = select_row_groups(&groups, RowWindow::new(190, 20));
        assert_eq!(selected, vec![1, 2]);
        assert_eq!(offset, 90);

        let (selected, offset) = select_row_groups(&groups, RowWindow::new(0, 300));
        assert_eq!(selected, vec![0, 1, 2]);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_select_row_groups_boundaries() {
        let groups = [10, 0, 10];

        let (selected, offset) = select_row_groups(&groups, RowWindow::new(10, 5));
        assert_eq!(selected, vec![2]);
        assert_eq!(offset, 0);

        let (selected, _) = select_row_groups(&groups, RowWindow::new(9, 1));
        assert_eq!(selected, vec![0]);
    }

    #[test]
    fn test_guarded_converts_panics() {
        let path = Path::new("broken.parquet");
        let result: Result<()> = guarded(path, Operation::Read, || panic!("bad page header"));

        match result {
            Err(PqError::CorruptFile { op, message, .. }) => {
                assert_eq!(op, Operation::Read);
                assert!(message.contains("bad page header"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_guard_depth_resets_after_panic() {
        let path = Path::new("broken.parquet");
        let result: Result<bool> = guarded(path, Operation::Read, || Ok(inside_guarded()));
        assert!(result.unwrap());

        let _ = guarded::<(), _>(path, Operation::Read, || panic!("bad page"));
        assert!(!inside_guarded());
    }

    #[test]
    fn test_guarded_converts_codec_errors() {
        let path = Path::new("broken.parquet");
        let result: Result<()> = guarded(path, Operation::Open, || {
            Err(parquet::errors::ParquetError::General("bad footer".into()).into())
        });
        assert!(matches!(
            result,
            Err(PqError::CorruptFile {
                op: Operation::Open,
                ..
            })
        ));
    }

    #[test]
    fn test_guarded_passes_other_errors_through() {
        let path = Path::new("x.parquet");
        let result: Result<()> = guarded(path, Operation::Seek, || {
            Err(PqError::invalid_argument("nope"))
        });
        assert!(matches!(result, Err(PqError::InvalidArgument(_))));
    }

    #[test]
    fn test_reader_options_batch_size_floor() {
        assert_eq!(ReaderOptions::default().batch_size(), 1024);
        assert_eq!(ReaderOptions::new().with_batch_size(0).batch_size(), 1);
    }
}
