//! Generic CSV table parser.
//!
//! Provides a streaming parser for the comma-delimited, quote-escaped tables
//! consumed by a phetable run. Columns are bound by header name, so tables
//! may carry extra columns in any order.

use std::collections::HashMap;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::loader::open_input;
use crate::types::{PheError, PheResult};

/// Header positions of a table, keyed by column name.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    table: &'static str,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Builds the index from a header record.
    ///
    /// A UTF-8 BOM on the first column and whitespace around names are
    /// ignored. When a name repeats, the last occurrence wins.
    pub fn new(table: &'static str, headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        Self { table, positions }
    }

    /// Returns the position of a required column.
    pub fn require(&self, column: &str) -> PheResult<usize> {
        self.optional(column).ok_or_else(|| PheError::MissingColumn {
            table: self.table,
            column: column.to_string(),
        })
    }

    /// Returns the position of a column if present.
    pub fn optional(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Returns the number of named columns.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the header is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Trait for types that can be parsed from table records.
///
/// Parsing happens in two steps: the header is bound once to a
/// `Columns` value holding resolved positions, then every data record is
/// read through that binding.
pub trait TableRecord: Sized {
    /// Table name used in error messages.
    const TABLE: &'static str;

    /// Column-name configuration. `()` for tables with fixed names.
    type Layout;

    /// Resolved column positions.
    type Columns;

    /// Resolves the layout against the header row.
    fn bind(headers: &HeaderIndex, layout: &Self::Layout) -> PheResult<Self::Columns>;

    /// Parses a record through a resolved binding.
    fn from_record(record: &StringRecord, columns: &Self::Columns) -> PheResult<Self>;
}

/// A streaming parser for CSV tables.
///
/// This parser reads tables record-by-record to avoid loading
/// entire files into memory.
pub struct TableParser<R: Read, T: TableRecord> {
    reader: Reader<R>,
    columns: T::Columns,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: TableRecord> TableParser<Box<dyn Read>, T> {
    /// Creates a new parser from a file path.
    ///
    /// Paths ending in `.gz` are decompressed on the fly.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks a required column.
    pub fn from_path<P: AsRef<Path>>(path: P, layout: &T::Layout) -> PheResult<Self> {
        let reader = open_input(path)?;
        Self::from_reader(reader, layout)
    }
}

impl<R: Read, T: TableRecord> TableParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, layout: &T::Layout) -> PheResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers = HeaderIndex::new(T::TABLE, csv_reader.headers()?);
        let columns = T::bind(&headers, layout)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Returns the resolved column binding.
    pub fn columns(&self) -> &T::Columns {
        &self.columns
    }

    /// Parses all records into a Vec, stopping at the first error.
    ///
    /// Note: This loads all records into memory. Only meant for the small
    /// reference tables.
    pub fn parse_all(self) -> PheResult<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: TableRecord> Iterator for TableParser<R, T> {
    type Item = PheResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    // Skip empty records
                    if record.is_empty() || record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }
                    self.records_read += 1;
                    return Some(T::from_record(&record, &self.columns));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for reading table field values.
pub mod parse {
    use super::{PheError, PheResult, StringRecord};

    /// Returns the field at `position`, or `""` for short rows.
    pub fn field(record: &StringRecord, position: usize) -> &str {
        record.get(position).unwrap_or("")
    }

    /// Parses a `TRUE`/`FALSE` flag. Blank reads as false.
    pub fn flag(value: &str, column: &'static str) -> PheResult<bool> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else {
            Err(PheError::InvalidFlag {
                column,
                value: value.to_string(),
            })
        }
    }

    /// Parses an age value.
    pub fn age(value: &str) -> Option<f64> {
        value.trim().parse::<f64>().ok().filter(|age| !age.is_nan())
    }
}
