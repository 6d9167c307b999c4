//! JSON Lines persistence for entity records
//!
//! One record per line, UTF-8, newline-terminated.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::record::EntityRecord;

/// Write records to `writer`, one JSON object per line.
///
/// Returns the number of records written. The writer is flushed.
pub fn write_jsonl<W, I>(writer: W, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = EntityRecord>,
{
    let mut sink = JsonlWriter::new(writer);
    for record in records {
        sink.write(&record)?;
    }
    sink.finish()
}

/// Save records to a JSONL file, truncating any existing file.
pub fn save_jsonl<I>(path: &Path, records: I) -> io::Result<usize>
where
    I: IntoIterator<Item = EntityRecord>,
{
    let n = write_jsonl(File::create(path)?, records)?;
    log::info!("Saved {} records to {}", n, path.display());
    Ok(n)
}

/// Open a JSONL file for lazy record-by-record reading.
pub fn read_jsonl(path: &Path) -> io::Result<JsonlReader<BufReader<File>>> {
    Ok(JsonlReader::new(BufReader::new(File::open(path)?)))
}

/// Incremental JSONL writer (used when records arrive from a fallible stream)
pub struct JsonlWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
            written: 0,
        }
    }

    pub fn write(&mut self, record: &EntityRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the number of records written
    pub fn finish(mut self) -> io::Result<usize> {
        self.inner.flush()?;
        Ok(self.written)
    }
}

/// Iterator over records in a JSONL stream.
///
/// Blank lines are skipped. A line that is not a JSON object yields an
/// `InvalidData` error naming the line number.
pub struct JsonlReader<R> {
    inner: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> JsonlReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = io::Result<EntityRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.inner.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line_no += 1;
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<EntityRecord>(trimmed).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {}: {e}", self.line_no),
                )
            });
            return Some(parsed);
        }
    }
}
