//! CSV reading for summary and detail files.
//!
//! Both file kinds share one dialect: comma separated, optionally
//! double-quoted fields, and a header row naming the columns. Records may
//! have fewer or more fields than the header.

mod header;
mod record;

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

pub use header::HeaderMap;
pub use record::RawRecord;

/// Field separator and quote character of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// An open source file with its header row already read.
pub struct CsvSource {
    path: PathBuf,
    headers: HeaderMap,
    reader: Reader<File>,
}

impl std::fmt::Debug for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSource")
            .field("path", &self.path)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl CsvSource {
    /// Open `path` and read its header row.
    pub fn open(path: &Path, dialect: &Dialect) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = ReaderBuilder::new()
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let header_row = reader.headers().map_err(|e| IngestError::Header {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let headers = HeaderMap::from_headers(header_row.iter()).map_err(|header| {
            IngestError::DuplicateHeader {
                path: path.to_path_buf(),
                header,
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            reader,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Iterate the data records following the header row.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            path: &self.path,
            reader: &mut self.reader,
            done: false,
        }
    }
}

/// Data records of a [`CsvSource`].
///
/// A malformed record yields an error and iteration continues with the next
/// record; an I/O error ends iteration.
pub struct Records<'a> {
    path: &'a Path,
    reader: &'a mut Reader<File>,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut fields = StringRecord::new();
        match self.reader.read_record(&mut fields) {
            Ok(true) => {
                let line = fields.position().map(|p| p.line()).unwrap_or(0);
                Some(Ok(RawRecord::new(fields, line)))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                if err.is_io_error() {
                    self.done = true;
                }
                let line = err.position().map(|p| p.line()).unwrap_or(0);
                Some(Err(IngestError::Record {
                    path: self.path.to_path_buf(),
                    line,
                    message: err.to_string(),
                }))
            }
        }
    }
}
