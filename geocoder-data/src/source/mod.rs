//! Streaming reader for delimited postcode datasets.
//!
//! The reader pages through a CSV file with a header row, mapping the
//! configured postcode, latitude and longitude columns to
//! [`PostcodeRecord`]s. Extra columns are ignored.
#![forbid(unsafe_code)]

use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::File;
use csv::{Reader, ReaderBuilder, StringRecord};
use geocoder_core::{Coordinate, PostcodeRecord};
use thiserror::Error;

/// Errors raised while reading a postcode dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The dataset could not be opened or read.
    #[error("failed to read postcode dataset {path}")]
    Open {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV decoder rejected the dataset.
    #[error("failed to decode postcode dataset {path}")]
    Decode {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Source error produced by `csv`.
        #[source]
        source: csv::Error,
    },
    /// A required column is absent from the header row.
    #[error("dataset {path} has no {column:?} column")]
    MissingColumn {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Column name that was expected.
        column: String,
    },
    /// A coordinate field did not hold a number.
    #[error("line {line}: column {column:?} holds {value:?}, expected a number")]
    InvalidCoordinate {
        /// One-based line number in the dataset.
        line: u64,
        /// Column being parsed.
        column: String,
        /// Raw field contents.
        value: String,
    },
}

/// Header names of the columns mapped into a [`PostcodeRecord`].
///
/// Defaults follow the ONS Postcode Directory: `pcds`, `lat` and `long`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    /// Column holding the formatted postcode.
    pub postcode: String,
    /// Column holding the latitude.
    pub latitude: String,
    /// Column holding the longitude.
    pub longitude: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            postcode: "pcds".to_owned(),
            latitude: "lat".to_owned(),
            longitude: "long".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    postcode: usize,
    latitude: usize,
    longitude: usize,
}

/// Count the data rows in `path`: newline-delimited lines minus the header.
///
/// The scan streams the file and never parses fields. A final line without
/// a trailing newline still counts.
pub fn count_data_rows(path: &Utf8Path) -> Result<u64, SourceError> {
    let open_error = |source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = geocoder_fs::open_utf8_file(path).map_err(open_error)?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut lines: u64 = 0;
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).map_err(open_error)?;
        if read == 0 {
            break;
        }
        lines += 1;
    }
    Ok(lines.saturating_sub(1))
}

/// Paged reader over a CSV postcode dataset.
///
/// Consecutive pages continue from the open reader, so a front-to-back import
/// is a single pass. Requesting an earlier offset reopens the file.
#[derive(Debug)]
pub struct CsvRecordSource {
    path: Utf8PathBuf,
    columns: SourceColumns,
    indices: ColumnIndices,
    reader: Reader<File>,
    position: u64,
}

impl CsvRecordSource {
    /// Open `path` and resolve the configured columns against its header row.
    pub fn open(path: &Utf8Path, columns: SourceColumns) -> Result<Self, SourceError> {
        let mut reader = open_reader(path)?;
        let headers = reader
            .headers()
            .map_err(|source| SourceError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        let indices = ColumnIndices {
            postcode: column_index(path, &headers, &columns.postcode)?,
            latitude: column_index(path, &headers, &columns.latitude)?,
            longitude: column_index(path, &headers, &columns.longitude)?,
        };
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            indices,
            reader,
            position: 0,
        })
    }

    /// Dataset path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read up to `limit` records starting at data row `offset`.
    ///
    /// Returns fewer records when the dataset ends first.
    pub fn page(&mut self, offset: u64, limit: usize) -> Result<Vec<PostcodeRecord>, SourceError> {
        if offset < self.position {
            self.reader = open_reader(&self.path)?;
            self.position = 0;
        }

        let mut row = StringRecord::new();
        while self.position < offset {
            if !self.read_row(&mut row)? {
                return Ok(Vec::new());
            }
        }

        let mut records = Vec::with_capacity(limit);
        while records.len() < limit && self.read_row(&mut row)? {
            records.push(self.map_row(&row)?);
        }
        Ok(records)
    }

    fn read_row(&mut self, row: &mut StringRecord) -> Result<bool, SourceError> {
        let more = self
            .reader
            .read_record(row)
            .map_err(|source| SourceError::Decode {
                path: self.path.clone(),
                source,
            })?;
        if more {
            self.position += 1;
        }
        Ok(more)
    }

    fn map_row(&self, row: &StringRecord) -> Result<PostcodeRecord, SourceError> {
        let line = row.position().map_or(0, csv::Position::line);
        let postcode = row.get(self.indices.postcode).unwrap_or_default().trim();
        let latitude = parse_coordinate(row, self.indices.latitude, &self.columns.latitude, line)?;
        let longitude =
            parse_coordinate(row, self.indices.longitude, &self.columns.longitude, line)?;
        Ok(PostcodeRecord::new(
            postcode,
            Coordinate::new(latitude, longitude),
        ))
    }
}

fn open_reader(path: &Utf8Path) -> Result<Reader<File>, SourceError> {
    let file = geocoder_fs::open_utf8_file(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderBuilder::new().has_headers(true).from_reader(file))
}

fn column_index(
    path: &Utf8Path,
    headers: &StringRecord,
    column: &str,
) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_owned(),
        })
}

fn parse_coordinate(
    row: &StringRecord,
    index: usize,
    column: &str,
    line: u64,
) -> Result<f64, SourceError> {
    let raw = row.get(index).unwrap_or_default().trim();
    raw.parse().map_err(|_| SourceError::InvalidCoordinate {
        line,
        column: column.to_owned(),
        value: raw.to_owned(),
    })
}
