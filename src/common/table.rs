//! In-memory listing table
//!
//! A row-oriented table of heterogeneous [`Value`]s with named columns. Every pipeline stage
//! mutates the same [`ListingTable`] in place.

/// A single cell of the listing table
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty field, or a value that failed to normalize
    Missing,
    /// Raw text as read from the CSV file
    Text(String),
    /// Normalized numeric value
    Number(f64),
}

impl Value {
    /// Builds a cell from a raw CSV field. Empty fields become [`Value::Missing`].
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Value::Missing
        } else {
            Value::Text(field.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric interpretation of this cell, if it has a finite one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Missing => None,
            Value::Number(value) => value.is_finite().then_some(*value),
            Value::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }

    /// Approximate heap + inline footprint, used for the memory usage summary.
    pub fn approximate_size(&self) -> usize {
        let inline = std::mem::size_of::<Value>();
        match self {
            Value::Text(text) => inline + text.len(),
            _ => inline,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            Value::Text(text) => write!(f, "{}", text),
            Value::Number(value) => write!(f, "{}", value),
        }
    }
}

/// Inferred type of a column, based on its non-missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKind {
    /// Every value is missing
    Empty,
    /// Every value is a finite whole number
    Integer,
    /// Every value is a finite number
    Float,
    /// At least one value is not numeric
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Dtype label shown in the column summary
    pub fn dtype_label(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            // An all-null column reads as float64 in typical dataframe tooling.
            ColumnKind::Empty | ColumnKind::Float => "float64",
            ColumnKind::Text => "object",
        }
    }
}

/// Row-oriented listing table with named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ListingTable {
    /// Creates an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have exactly one value per column.
    ///
    /// # Panics
    /// Panics if the row width does not match the column count; callers build rows from
    /// validated CSV records.
    pub fn push_row(&mut self, row: Vec<Value>) {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row width does not match column count"
        );
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Iterates over the values of a single column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Mutable access to a single cell
    pub fn cell_mut(&mut self, row: usize, column: usize) -> &mut Value {
        &mut self.rows[row][column]
    }

    /// Removes a column by name. Returns `false` if no such column exists.
    pub fn remove_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };

        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Keeps only the rows matching `keep`, preserving their relative order.
    /// Returns the number of removed rows.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Moves every row of `other` to the end of this table.
    /// Both tables must share the same column layout.
    pub(crate) fn append(&mut self, other: &mut ListingTable) {
        debug_assert_eq!(self.columns, other.columns);
        self.rows.append(&mut other.rows);
    }

    /// Number of non-missing values in a column
    pub fn non_missing_count(&self, index: usize) -> usize {
        self.column_values(index)
            .filter(|value| !value.is_missing())
            .count()
    }

    /// Infers the [`ColumnKind`] of a column from its non-missing values
    pub fn column_kind(&self, index: usize) -> ColumnKind {
        let mut kind = ColumnKind::Empty;

        for value in self.column_values(index) {
            if value.is_missing() {
                continue;
            }

            match value.as_number() {
                None => return ColumnKind::Text,
                Some(number) if number.fract() == 0.0 && kind != ColumnKind::Float => {
                    kind = ColumnKind::Integer
                }
                Some(_) => kind = ColumnKind::Float,
            }
        }

        kind
    }

    /// Numeric values of a column, skipping missing cells.
    /// Returns `None` if the column is not numeric.
    pub fn numeric_values(&self, index: usize) -> Option<Vec<f64>> {
        if !self.column_kind(index).is_numeric() {
            return None;
        }

        Some(
            self.column_values(index)
                .filter_map(Value::as_number)
                .collect(),
        )
    }

    /// Approximate in-memory footprint of the table contents
    pub fn approximate_size(&self) -> usize {
        let header: usize = self.columns.iter().map(String::len).sum();
        let cells: usize = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .map(Value::approximate_size)
            .sum();
        header + cells
    }
}
