//! Table types.

use serde::{Deserialize, Serialize};

/// Directory, relative to the output root, that holds extracted tables.
pub const TABLE_DIR: &str = "tables";

/// A detected table as reported by a table source: rows of optional cells.
pub type RawTable = Vec<Vec<Option<String>>>;

/// A cleaned table, persisted as `tables/page{N}_table{K}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// First cleaned row
    pub headers: Vec<String>,

    /// Remaining cleaned rows
    pub rows: Vec<Vec<String>>,

    /// Source page (1-indexed)
    pub page: u32,

    /// Number of data rows (`rows.len()`)
    pub row_count: usize,

    /// Number of header cells (`headers.len()`)
    pub col_count: usize,
}

impl Table {
    /// Clean a raw table.
    ///
    /// Cells are trimmed (missing cells become empty strings), rows that are
    /// empty after trimming are dropped, and the first remaining row becomes
    /// the header. Returns `None` unless a header and at least one data row
    /// survive.
    pub fn from_raw(page: u32, raw: &RawTable) -> Option<Self> {
        let mut cleaned: Vec<Vec<String>> = raw
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_deref().map(str::trim).unwrap_or("").to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        if cleaned.len() < 2 {
            return None;
        }

        let headers = cleaned.remove(0);
        Some(Self {
            col_count: headers.len(),
            row_count: cleaned.len(),
            headers,
            rows: cleaned,
            page,
        })
    }
}

/// Index entry for a persisted table, stored on its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// File name, `page{N}_table{K}.json`
    pub filename: String,

    /// Path relative to the output root
    pub path: String,

    /// Header row of the table
    pub headers: Vec<String>,

    /// Number of data rows
    pub row_count: usize,

    /// Number of columns
    pub col_count: usize,
}

impl TableRef {
    /// Build the reference for the `index`-th kept table (1-indexed) on the table's page.
    pub fn new(table: &Table, index: usize) -> Self {
        let filename = table_filename(table.page, index);
        Self {
            path: format!("{}/{}", TABLE_DIR, filename),
            filename,
            headers: table.headers.clone(),
            row_count: table.row_count,
            col_count: table.col_count,
        }
    }
}

/// File name for the `index`-th kept table on `page`.
pub fn table_filename(page: u32, index: usize) -> String {
    format!("page{}_table{}.json", page, index)
}
