//! Raw CSV record loading.
//!
//! Scan and catalog files are read lazily, one record at a time. Header
//! rows are recognised by their first cell (`domain`, any casing) and may
//! recur mid-file when result files have been concatenated; every
//! occurrence is skipped, and in header-keyed files the newest header
//! replaces the previous one.
//!
//! Key items:
//! - [`open_records`] - positional rows, header rows removed
//! - [`open_scan_rows`] - rows keyed by their file's own header
//! - [`parse_flag`] - the boolean rule shared by every flag column

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::rc::Rc;

use log::{debug, error, warn};

use crate::config::HEADER_MARKER;
use crate::error_handling::MissingInputError;

/// Whether a run can proceed without a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Absence aborts the run
    Mandatory,
    /// Absence means "no data available"
    Optional,
}

/// A named CSV input.
#[derive(Debug, Clone, Copy)]
pub struct CsvSource<'a> {
    /// Name used in log lines and errors
    pub name: &'static str,
    /// File location
    pub path: &'a Path,
    /// Mandatory or optional
    pub requirement: Requirement,
}

impl<'a> CsvSource<'a> {
    pub fn mandatory(name: &'static str, path: &'a Path) -> Self {
        Self {
            name,
            path,
            requirement: Requirement::Mandatory,
        }
    }

    pub fn optional(name: &'static str, path: &'a Path) -> Self {
        Self {
            name,
            path,
            requirement: Requirement::Optional,
        }
    }
}

/// Applies the boolean rule used for every flag column.
///
/// The literal `False` is false, any other non-empty value is true. An empty
/// cell carries no boolean meaning and yields `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "" => None,
        "False" => Some(false),
        _ => Some(true),
    }
}

/// Returns `true` if a record's first cell marks it as a header row.
pub fn is_header_row(first_cell: &str) -> bool {
    first_cell.trim().eq_ignore_ascii_case(HEADER_MARKER)
}

/// Lazily yields the data records of a CSV file as owned cells.
///
/// Header rows are skipped wherever they occur. Records the `csv` reader
/// rejects are logged and skipped.
pub struct Records {
    source_name: &'static str,
    inner: csv::StringRecordsIntoIter<File>,
}

impl Records {
    /// Next record, header rows included.
    fn next_raw(&mut self) -> Option<RawRecord> {
        loop {
            match self.inner.next()? {
                Ok(record) => {
                    let cells: Vec<String> = record.iter().map(str::to_string).collect();
                    let first = cells.first().map(String::as_str).unwrap_or("");
                    if is_header_row(first) {
                        return Some(RawRecord::Header(cells));
                    }
                    return Some(RawRecord::Data(cells));
                }
                Err(e) => {
                    warn!("[{}] Skipping unreadable record: {}", self.source_name, e);
                }
            }
        }
    }
}

enum RawRecord {
    Header(Vec<String>),
    Data(Vec<String>),
}

impl Iterator for Records {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_raw()? {
                RawRecord::Header(_) => {
                    debug!("[{}] Skipping header row", self.source_name);
                }
                RawRecord::Data(cells) => return Some(cells),
            }
        }
    }
}

/// Opens a CSV source for positional reading.
///
/// # Errors
///
/// Returns `MissingInputError` when a mandatory source cannot be opened. An
/// optional source that cannot be opened yields `Ok(None)`.
pub fn open_records(source: &CsvSource<'_>) -> Result<Option<Records>, MissingInputError> {
    let file = match File::open(source.path) {
        Ok(file) => file,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                error!(
                    "[{}] Failed to open {}: {}",
                    source.name,
                    source.path.display(),
                    e
                );
            }
            return match source.requirement {
                Requirement::Mandatory => Err(MissingInputError {
                    source_name: source.name,
                    path: source.path.to_path_buf(),
                }),
                Requirement::Optional => {
                    warn!(
                        "[{}] {} not available, continuing without it",
                        source.name,
                        source.path.display()
                    );
                    Ok(None)
                }
            };
        }
    };

    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    Ok(Some(Records {
        source_name: source.name,
        inner: reader.into_records(),
    }))
}

/// One scan result row, keyed by the header in effect when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRow {
    headers: Rc<Vec<String>>,
    values: Vec<String>,
}

impl ScanRow {
    /// Builds a row from explicit headers and values.
    pub fn new(headers: Rc<Vec<String>>, values: Vec<String>) -> Self {
        Self { headers, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let headers = pairs.iter().map(|(k, _)| k.as_ref().to_string()).collect();
        let values = pairs.iter().map(|(_, v)| v.as_ref().to_string()).collect();
        Self::new(Rc::new(headers), values)
    }

    /// Value of a named column; header names match case-insensitively.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Value at a column position.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// The row's host, from the first column: lowercased and trimmed.
    pub fn hostname(&self) -> String {
        self.cell(0).unwrap_or("").trim().to_lowercase()
    }
}

/// Lazily yields header-keyed [`ScanRow`]s.
///
/// Data rows that appear before any header cannot be keyed; they are skipped
/// and counted in [`ScanRows::headerless_rows`].
pub struct ScanRows {
    records: Records,
    headers: Option<Rc<Vec<String>>>,
    headerless: usize,
}

impl ScanRows {
    /// Number of rows skipped for lack of a preceding header.
    pub fn headerless_rows(&self) -> usize {
        self.headerless
    }
}

impl Iterator for ScanRows {
    type Item = ScanRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next_raw()? {
                RawRecord::Header(cells) => {
                    self.headers = Some(Rc::new(cells));
                }
                RawRecord::Data(values) => match &self.headers {
                    Some(headers) => return Some(ScanRow::new(Rc::clone(headers), values)),
                    None => {
                        warn!(
                            "[{}] Skipping row before any header: {:?}",
                            self.records.source_name,
                            values.first()
                        );
                        self.headerless += 1;
                    }
                },
            }
        }
    }
}

/// Opens a CSV source whose rows are keyed by the file's own header row.
///
/// # Errors
///
/// Same contract as [`open_records`].
pub fn open_scan_rows(source: &CsvSource<'_>) -> Result<Option<ScanRows>, MissingInputError> {
    Ok(open_records(source)?.map(|records| ScanRows {
        records,
        headers: None,
        headerless: 0,
    }))
}
