//! CSV loading for the three market input tables.
//!
//! **Expected layout** under the data directory:
//! - `intervals.csv`: first column holds the interval identifiers
//! - `dffr.csv`: `DFFR_PRICE` plus optional extra numeric columns
//! - `da.csv`: `DA_PRICE`, `INTERVALS` plus optional extra numeric columns
//!
//! Fields are trimmed, so `10, 20` and `10,20` read the same.

use crate::error::{UpsideError, UpsideResult};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INTERVALS_FILE: &str = "intervals.csv";
pub const RESERVE_FILE: &str = "dffr.csv";
pub const DAY_AHEAD_FILE: &str = "da.csv";

pub const RESERVE_PRICE_COLUMN: &str = "DFFR_PRICE";
pub const DAY_AHEAD_PRICE_COLUMN: &str = "DA_PRICE";
pub const DAY_AHEAD_INTERVAL_COLUMN: &str = "INTERVALS";

/// A CSV file with a header row and numeric cells.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    source: PathBuf,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl NumericTable {
    /// Read a table from disk.
    pub fn read(path: &Path) -> UpsideResult<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => UpsideError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => UpsideError::format(path, format!("opening file: {err}")),
        })?;
        Self::from_reader(path, file)
    }

    /// Parse a table from any reader; `source` is only used in error messages.
    pub fn from_reader<R: Read>(source: impl Into<PathBuf>, reader: R) -> UpsideResult<Self> {
        let source = source.into();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(|err| UpsideError::format(&source, format!("reading header: {err}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(UpsideError::format(&source, "missing header row"));
        }

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|err| UpsideError::format(&source, format!("parsing record: {err}")))?;
            let mut row = Vec::with_capacity(record.len());
            for (column, field) in columns.iter().zip(record.iter()) {
                let value = parse_number(field).ok_or_else(|| {
                    UpsideError::format(
                        &source,
                        format!(
                            "row {}: column '{column}' has non-numeric value '{field}'",
                            line + 1
                        ),
                    )
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(UpsideError::format(&source, "table has no data rows"));
        }

        debug!(
            "Read {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            source.display()
        );
        Ok(Self {
            source,
            columns,
            rows,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> UpsideResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| UpsideError::format(&self.source, format!("missing column '{name}'")))
    }

    /// Values of a named column in row order.
    pub fn column(&self, name: &str) -> UpsideResult<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.column_at(idx))
    }

    /// Values of the column at `idx` in row order.
    pub fn column_at(&self, idx: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[idx]).collect()
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The three tables a run starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketInputs {
    pub intervals: NumericTable,
    pub reserve: NumericTable,
    pub day_ahead: NumericTable,
}

impl MarketInputs {
    /// Load all three tables from `data_dir`, failing on the first bad file.
    pub fn load(data_dir: &Path) -> UpsideResult<Self> {
        let intervals = NumericTable::read(&data_dir.join(INTERVALS_FILE))?;
        let reserve = NumericTable::read(&data_dir.join(RESERVE_FILE))?;
        reserve.column_index(RESERVE_PRICE_COLUMN)?;
        let day_ahead = NumericTable::read(&data_dir.join(DAY_AHEAD_FILE))?;
        day_ahead.column_index(DAY_AHEAD_PRICE_COLUMN)?;
        day_ahead.column_index(DAY_AHEAD_INTERVAL_COLUMN)?;

        Ok(Self {
            intervals,
            reserve,
            day_ahead,
        })
    }
}
