//! CSV loading for listing exports
//!
//! This module reads each listing export into a [`ListingTable`] and concatenates them into a
//! single table. Every file must carry the same set of columns as the first one; a missing or
//! unexpected column is a fatal schema error rather than a silent null-fill.

use crate::common::table::{ListingTable, Value};
use bytesize::ByteSize;
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading listing files
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("No input files were given")]
    NoInputs,

    #[error("Failed to read input file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file {path} has no header row")]
    EmptyHeader { path: PathBuf },

    #[error("CSV file {path} declares column '{column}' more than once")]
    DuplicateColumn { path: PathBuf, column: String },

    #[error(
        "CSV file {path} does not match the schema of the first file (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    SchemaMismatch {
        path: PathBuf,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

type Result<T> = core::result::Result<T, ParsingError>;

fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Parse a single listing CSV file into a [`ListingTable`]
///
/// Header names are taken verbatim (a leading UTF-8 byte order mark is removed). Empty fields
/// become [`Value::Missing`]. Bytes that are not valid UTF-8 are replaced rather than rejected,
/// so exports saved in a legacy encoding still load.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Ok(ListingTable)` - The file's rows in their original order
/// * `Err(ParsingError)` - If the file could not be read, is malformed, or has a bad header
pub fn parse_listing_file(file_path: &Path) -> Result<ListingTable> {
    let file = File::open(file_path).map_err(|source| ParsingError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    let file_size = file.metadata().map(|metadata| metadata.len()).unwrap_or(0);

    let csv_error = |source: csv::Error| ParsingError::Csv {
        path: file_path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(file);

    let header = reader.byte_headers().map_err(csv_error)?.clone();
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let name = decode_field(name);
            if index == 0 {
                name.trim_start_matches('\u{feff}').to_string()
            } else {
                name
            }
        })
        .collect();

    if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
        return Err(ParsingError::EmptyHeader {
            path: file_path.to_path_buf(),
        });
    }

    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.as_str()) {
            return Err(ParsingError::DuplicateColumn {
                path: file_path.to_path_buf(),
                column: column.clone(),
            });
        }
    }

    let mut table = ListingTable::new(columns);
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        let row = record
            .iter()
            .map(|field| Value::from_field(&decode_field(field)))
            .collect();
        table.push_row(row);
    }

    info!(
        "Loaded {} ({}, {} rows)",
        file_path.display(),
        ByteSize(file_size),
        table.len()
    );

    Ok(table)
}

/// Concatenate tables in order, resetting row positions.
///
/// The first table defines the column order. Every other table must contain exactly the
/// same column names; their rows are reordered to match when the order differs.
///
/// # Arguments
/// * `tables` - `(source path, table)` pairs in load order; the path is used in errors
pub fn concat_tables(tables: Vec<(PathBuf, ListingTable)>) -> Result<ListingTable> {
    let mut tables = tables.into_iter();
    let Some((_, mut combined)) = tables.next() else {
        return Err(ParsingError::NoInputs);
    };

    for (path, mut table) in tables {
        let missing: Vec<String> = combined
            .columns()
            .iter()
            .filter(|column| table.column_index(column).is_none())
            .cloned()
            .collect();
        let unexpected: Vec<String> = table
            .columns()
            .iter()
            .filter(|column| combined.column_index(column).is_none())
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ParsingError::SchemaMismatch {
                path,
                missing,
                unexpected,
            });
        }

        if table.columns() != combined.columns() {
            debug!(
                "Reordering columns of {} to match the first file",
                path.display()
            );
            table = reorder_columns(&table, combined.columns());
        }

        combined.append(&mut table);
    }

    Ok(combined)
}

/// Rebuilds `table` with its columns in `order`. Every name in `order` must exist in `table`.
fn reorder_columns(table: &ListingTable, order: &[String]) -> ListingTable {
    let positions: Vec<usize> = order
        .iter()
        .filter_map(|column| table.column_index(column))
        .collect();

    let mut reordered = ListingTable::new(order.to_vec());
    for row in table.rows() {
        reordered.push_row(positions.iter().map(|&index| row[index].clone()).collect());
    }
    reordered
}

/// Load every listing file in order and concatenate them into one table
///
/// Rows keep the order of `paths`, then their original order within each file.
/// Any unreadable file or schema mismatch aborts the whole load.
pub fn parse_listings(paths: &[PathBuf]) -> Result<ListingTable> {
    if paths.is_empty() {
        return Err(ParsingError::NoInputs);
    }

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = parse_listing_file(path)?;
        tables.push((path.clone(), table));
    }

    concat_tables(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_parse_listing_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "listing1.csv",
            b"Title,Price,City\nLoft,\"$1,234.56\",\nStudio,$80,\n",
        );

        let table = parse_listing_file(&path).unwrap();
        assert_eq!(table.columns(), &["Title", "Price", "City"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], Value::Text("$1,234.56".to_string()));
        assert_eq!(table.rows()[0][2], Value::Missing);
    }

    #[test]
    fn test_parse_strips_bom_and_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "listing.csv", b"\xef\xbb\xbfPrice,Title\n\xa3200,Caf\xe9\n");

        let table = parse_listing_file(&path).unwrap();
        assert_eq!(table.columns()[0], "Price");
        assert!(matches!(&table.rows()[0][0], Value::Text(text) if text.ends_with("200")));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = parse_listing_file(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(ParsingError::FileRead { .. })));
    }

    #[test]
    fn test_ragged_record_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "ragged.csv", b"Title,Price\nLoft,$10,extra\n");
        assert!(matches!(
            parse_listing_file(&path),
            Err(ParsingError::Csv { .. })
        ));
    }

    #[test]
    fn test_duplicate_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "dup.csv", b"Price,Price\n1,2\n");
        assert!(matches!(
            parse_listing_file(&path),
            Err(ParsingError::DuplicateColumn { column, .. }) if column == "Price"
        ));
    }

    #[test]
    fn test_concatenation_preserves_file_order() {
        let dir = TempDir::new().unwrap();
        let first = write_csv(&dir, "a.csv", b"Id,Price\n1,$10\n2,$20\n");
        let second = write_csv(&dir, "b.csv", b"Id,Price\n3,$30\n");
        let third = write_csv(&dir, "c.csv", b"Id,Price\n4,$40\n5,$50\n");

        let table = parse_listings(&[first, second, third]).unwrap();
        let ids: Vec<String> = table.column_values(0).map(|v| v.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_reordered_columns_are_aligned() {
        let dir = TempDir::new().unwrap();
        let first = write_csv(&dir, "a.csv", b"Id,Price\n1,$10\n");
        let second = write_csv(&dir, "b.csv", b"Price,Id\n$20,2\n");

        let table = parse_listings(&[first, second]).unwrap();
        assert_eq!(table.columns(), &["Id", "Price"]);
        assert_eq!(table.rows()[1][0], Value::Text("2".to_string()));
        assert_eq!(table.rows()[1][1], Value::Text("$20".to_string()));
    }

    #[test]
    fn test_column_absent_from_one_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let first = write_csv(&dir, "a.csv", b"Id,Price,City\n1,$10,\n");
        let second = write_csv(&dir, "b.csv", b"Id,Price\n2,$20\n");

        match parse_listings(&[first, second.clone()]) {
            Err(ParsingError::SchemaMismatch {
                path,
                missing,
                unexpected,
            }) => {
                assert_eq!(path, second);
                assert_eq!(missing, vec!["City".to_string()]);
                assert!(unexpected.is_empty());
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_no_inputs() {
        assert!(matches!(parse_listings(&[]), Err(ParsingError::NoInputs)));
        assert!(matches!(concat_tables(vec![]), Err(ParsingError::NoInputs)));
    }
}
