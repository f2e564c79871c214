//! Text diagnostics for a listing table
//!
//! Provides a row preview ([`format_head`]) and a per-column type summary ([`format_info`]),
//! printed before and after cleaning so the effect of each stage can be inspected.

use crate::common::table::{ColumnKind, ListingTable};
use bytesize::ByteSize;
use std::collections::BTreeMap;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// Cells longer than this are shortened in the row preview
const MAX_CELL_CHARS: usize = 24;

/// One line of the column summary
#[derive(Debug, Clone, Tabled)]
pub struct ColumnSummary {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Column")]
    pub name: String,
    #[tabled(rename = "Non-Null Count")]
    pub non_null: String,
    #[tabled(rename = "Dtype")]
    pub dtype: &'static str,
}

fn truncate_cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }

    let mut shortened: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
    shortened.push_str("...");
    shortened
}

/// Formats the first `rows` rows of the table, with a leading row index column
pub fn format_head(table: &ListingTable, rows: usize) -> String {
    if table.columns().is_empty() {
        return "Empty table (no columns)".to_string();
    }

    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend(table.columns().iter().map(|column| truncate_cell(column)));
    builder.push_record(header);

    for (index, row) in table.rows().iter().take(rows).enumerate() {
        let mut record = vec![index.to_string()];
        record.extend(row.iter().map(|value| truncate_cell(&value.to_string())));
        builder.push_record(record);
    }

    builder.build().to_string()
}

/// Per-column summaries: position, name, non-null count, and inferred dtype
pub fn column_summaries(table: &ListingTable) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnSummary {
            position: index,
            name: name.clone(),
            non_null: format!("{} non-null", table.non_missing_count(index)),
            dtype: table.column_kind(index).dtype_label(),
        })
        .collect()
}

/// Formats a summary of the table: entry count, per-column types, and memory usage
pub fn format_info(table: &ListingTable) -> String {
    let summaries = column_summaries(table);

    let mut dtype_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for summary in &summaries {
        *dtype_counts.entry(summary.dtype).or_default() += 1;
    }

    let dtypes = dtype_counts
        .iter()
        .map(|(dtype, count)| format!("{}({})", dtype, count))
        .collect::<Vec<_>>()
        .join(", ");

    let mut output = String::new();
    output.push_str(&format!("{} entries\n", table.len()));
    output.push_str(&format!(
        "Data columns (total {} columns):\n",
        table.columns().len()
    ));
    if !summaries.is_empty() {
        output.push_str(&Table::new(&summaries).to_string());
        output.push('\n');
    }
    output.push_str(&format!("dtypes: {}\n", dtypes));
    output.push_str(&format!(
        "memory usage: {}",
        ByteSize(table.approximate_size() as u64)
    ));

    output
}

/// Indices and kinds of the columns whose values are all numeric, in column order
pub fn numeric_columns(table: &ListingTable) -> Vec<(usize, ColumnKind)> {
    (0..table.columns().len())
        .map(|index| (index, table.column_kind(index)))
        .filter(|(_, kind)| kind.is_numeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::table::Value;

    fn sample_table() -> ListingTable {
        let mut table = ListingTable::new(vec![
            "Title".to_string(),
            "Price".to_string(),
            "Rating".to_string(),
        ]);
        table.push_row(vec![
            Value::from_field("A very long listing title that keeps going"),
            Value::Number(120.0),
            Value::from_field("4.5"),
        ]);
        table.push_row(vec![
            Value::from_field("Studio"),
            Value::Number(80.0),
            Value::Missing,
        ]);
        table
    }

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short"), "short");
        let truncated = truncate_cell("A very long listing title that keeps going");
        assert_eq!(truncated.chars().count(), MAX_CELL_CHARS);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_format_head_limits_rows() {
        let head = format_head(&sample_table(), 1);
        assert!(head.contains("Title"));
        assert!(head.contains("A very long listing t..."));
        assert!(!head.contains("Studio"));

        let head_all = format_head(&sample_table(), 5);
        assert!(head_all.contains("Studio"));
        assert!(head_all.contains("NaN"));
    }

    #[test]
    fn test_column_summaries() {
        let summaries = column_summaries(&sample_table());
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].dtype, "object");
        assert_eq!(summaries[1].dtype, "int64");
        assert_eq!(summaries[2].dtype, "float64");
        assert_eq!(summaries[2].non_null, "1 non-null");
    }

    #[test]
    fn test_format_info() {
        let info = format_info(&sample_table());
        assert!(info.starts_with("2 entries\n"));
        assert!(info.contains("Data columns (total 3 columns):"));
        assert!(info.contains("Non-Null Count"));
        assert!(info.contains("dtypes: float64(1), int64(1), object(1)"));
        assert!(info.contains("memory usage:"));
    }

    #[test]
    fn test_numeric_columns() {
        let numeric = numeric_columns(&sample_table());
        assert_eq!(
            numeric,
            vec![(1, ColumnKind::Integer), (2, ColumnKind::Float)]
        );
    }
}
