//! CSV reader for [`Table`].
//!
//! The first record is the header. Every following record must have the same
//! width as the header; the `csv` crate rejects ragged rows for us. Cell
//! values are typed with [`parse_cell`], then numeric columns are widened to a
//! single number kind.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{parse_cell, Table};
use crate::error::PackError;

/// Reads a table from a CSV file.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid CSV, has no
/// header, or repeats a column name.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use mdfpack::table::io_csv::read_csv;
///
/// let table = read_csv(Path::new("alloys.csv"))?;
/// # Ok::<(), mdfpack::PackError>(())
/// ```
pub fn read_csv(path: &Path) -> Result<Table, PackError> {
    let file = File::open(path).map_err(PackError::Io)?;
    read_table(BufReader::new(file), path)
}

/// Reads a table from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_csv_str(csv_str: &str) -> Result<Table, PackError> {
    from_csv_slice(csv_str.as_bytes())
}

/// Reads a table from CSV bytes.
///
/// Useful for fuzzing and for catalog payloads already held in memory.
pub fn from_csv_slice(bytes: &[u8]) -> Result<Table, PackError> {
    read_table(bytes, Path::new("<bytes>"))
}

fn read_table<R: Read>(reader: R, path: &Path) -> Result<Table, PackError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| PackError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    check_header(&columns, path)?;

    let mut table = Table::new(columns);
    for result in csv_reader.records() {
        let record = result.map_err(|source| PackError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row = record.iter().map(parse_cell).collect();
        table.push_row(row).map_err(|row| PackError::CsvInvalid {
            path: path.to_path_buf(),
            message: format!(
                "row has {} fields but header has {}",
                row.len(),
                table.columns().len()
            ),
        })?;
    }

    table.widen_numeric_columns();
    Ok(table)
}

fn check_header(columns: &[String], path: &Path) -> Result<(), PackError> {
    if columns.is_empty() || columns.iter().all(|column| column.trim().is_empty()) {
        return Err(PackError::CsvInvalid {
            path: path.to_path_buf(),
            message: "missing header row".to_string(),
        });
    }

    for (index, column) in columns.iter().enumerate() {
        if columns[..index].contains(column) {
            return Err(PackError::CsvInvalid {
                path: path.to_path_buf(),
                message: format!("duplicate column '{}'", column),
            });
        }
    }

    Ok(())
}
