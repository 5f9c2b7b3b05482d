//! Database type definitions
//!
//! Query results are display-oriented: every cell is materialized as text or
//! NULL, whatever the column's type was on the server.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Text shown for SQL NULL
pub const NULL_TEXT: &str = "NULL";

/// A single nullable cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form of the cell; NULL becomes the literal `NULL`
    pub fn as_text(&self) -> &str {
        match self {
            CellValue::Null => NULL_TEXT,
            CellValue::Text(s) => s,
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Null, CellValue::Text)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// JSON keeps NULL distinct from the string "NULL"
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One result row, keyed by column name
pub type Row = HashMap<String, CellValue>;

/// Materialized result of a statement that produced a result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names in projection order
    pub columns: Vec<String>,
    /// Rows in the order the server returned them
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// A result with the given columns and no rows yet
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row given its cells in column order.
    ///
    /// Missing trailing cells become NULL so every row carries every column.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = CellValue>,
    {
        let mut cells = cells.into_iter();
        let row = self
            .columns
            .iter()
            .map(|name| (name.clone(), cells.next().unwrap_or(CellValue::Null)))
            .collect();
        self.rows.push(row);
    }

    /// Cell at (row, column name); `None` when either is out of range
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }

    /// Iterate a row's cells in column order
    pub fn row_values<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.columns
            .iter()
            .map(|name| row.get(name).unwrap_or(&CellValue::Null))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The SQL actually sent to the server for one input statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementPlan {
    pub sql: String,
    /// Positional parameters, bound as text (`$1`, `$2`, ... on PostgreSQL)
    pub params: Vec<String>,
}

impl StatementPlan {
    /// Run `sql` exactly as written
    pub fn literal(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}
