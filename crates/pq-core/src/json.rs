//! JSON output of records

use crate::{Record, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io::{self, Write};

/// Serializes a record as a JSON object with keys in schema order
pub struct RecordJson<'a>(pub &'a Record);

impl Serialize for RecordJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(&**name, value)?;
        }
        map.end()
    }
}

/// Writes records as JSON, one compact object per line or indented objects.
///
/// When the reader on the other end of the sink goes away (`BrokenPipe`) the
/// printer marks itself closed and every later call is a no-op.
pub struct JsonPrinter<W: Write> {
    out: W,
    pretty: bool,
    closed: bool,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            closed: false,
        }
    }

    /// Print one record. Returns `false` once the sink has been closed.
    pub fn print(&mut self, record: &Record) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }

        let mut line = if self.pretty {
            serde_json::to_vec_pretty(&RecordJson(record))?
        } else {
            serde_json::to_vec(&RecordJson(record))?
        };
        line.push(b'\n');

        let written = self.out.write_all(&line);
        self.settle(written)
    }

    /// Print every record, stopping early on a closed sink
    pub fn print_all<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut printed = 0;
        for record in records {
            if !self.print(record)? {
                break;
            }
            printed += 1;
        }
        Ok(printed)
    }

    pub fn flush(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        let flushed = self.out.flush();
        self.settle(flushed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn settle(&mut self, outcome: io::Result<()>) -> Result<bool> {
        match outcome {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("output closed, no more records will be printed");
                self.closed = true;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
