//! Table extraction pass.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{Table, TableRef};
use crate::parser::TableSource;
use crate::pipeline::ExtractionWarning;
use crate::writer::OutputWriter;

/// Outcome of the table pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePass {
    /// Refs of persisted tables, keyed by page number
    pub tables: BTreeMap<u32, Vec<TableRef>>,
    /// Set when detection failed and the pass produced nothing
    pub warning: Option<ExtractionWarning>,
}

impl TablePass {
    /// Number of tables kept across all pages.
    pub fn count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}

/// Cleans detected tables and writes the ones worth keeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl TableExtractor {
    /// Create a new table extractor.
    pub fn new() -> Self {
        Self
    }

    /// Run detection over the whole document and persist kept tables.
    ///
    /// A detection failure is logged and yields an empty pass with a warning.
    /// Failing to write a kept table is returned as an error.
    pub fn extract(&self, source: &dyn TableSource, writer: &OutputWriter) -> Result<TablePass> {
        let detected = match source.detect_tables() {
            Ok(detected) => detected,
            Err(e) => {
                log::warn!("Table extraction failed, continuing without tables: {}", e);
                return Ok(TablePass {
                    tables: BTreeMap::new(),
                    warning: Some(ExtractionWarning::Tables {
                        reason: e.to_string(),
                    }),
                });
            }
        };

        let mut pass = TablePass::default();
        for (page, raw_tables) in detected {
            let mut refs = Vec::new();

            for raw in &raw_tables {
                let Some(table) = Table::from_raw(page, raw) else {
                    log::debug!("Page {}: dropping table candidate without data rows", page);
                    continue;
                };

                let table_ref = TableRef::new(&table, refs.len() + 1);
                writer.write_table(&table_ref.filename, &table)?;
                log::info!(
                    "Page {}: table with {} rows x {} cols",
                    page,
                    table.row_count,
                    table.col_count
                );
                refs.push(table_ref);
            }

            if !refs.is_empty() {
                pass.tables.insert(page, refs);
            }
        }

        Ok(pass)
    }
}
