use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::{DatasetError, Loaded, SkippedRecord};

/// Load every record of a JSON Lines file.
///
/// Lines that fail to decode are skipped and reported; blank lines are
/// ignored. Only failing to open or read the file is an error.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jsonl(BufReader::new(file))
}

/// Decode JSON Lines from any buffered reader.
///
/// Lines are split on raw bytes, so a line that is not valid UTF-8 is
/// skipped like any other undecodable record.
pub fn parse_jsonl<T: DeserializeOwned, R: BufRead>(
    reader: R,
) -> Result<Loaded<T>, DatasetError> {
    let mut loaded = Loaded::default();

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<T>(&line) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                let line_number = index as u64 + 1;
                warn!(line = line_number, error = %e, "Skipping malformed record");
                loaded.skipped.push(SkippedRecord {
                    line: line_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Appends one JSON document per line, flushing after every record so a
/// crash never loses a record that was reported as written.
pub struct JsonlWriter<W: Write> {
    inner: W,
    written: usize,
}

impl JsonlWriter<BufWriter<File>> {
    /// Create (or truncate) a JSON Lines file
    pub fn create(path: &Path) -> Result<Self, DatasetError> {
        let file = File::create(path).map_err(|source| DatasetError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn append<T: Serialize>(&mut self, record: &T) -> Result<(), DatasetError> {
        let json = serde_json::to_string(record)?;
        writeln!(self.inner, "{}", json)?;
        self.inner.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Write a whole batch of records to a new JSON Lines file
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, DatasetError> {
    let mut writer = JsonlWriter::create(path)?;
    for record in records {
        writer.append(record)?;
    }
    Ok(writer.written())
}
