//! In-memory tabular source: cells addressed by (row, column).
//!
//! Rows keep their 1-indexed source row numbers even when empty rows are
//! skipped at load time, so formula references keep resolving against the
//! original sheet coordinates.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::HierarchyResult;

/// Font flags carried per cell, independent of the cell text.
///
/// Only the formatting-aware interpretation path reads these; plain sources
/// (CSV) leave them at their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        !self.italic && !self.bold && !self.underline
    }
}

/// One cell: text content, optional style flags, optional formula text.
///
/// Formulas are stored with their leading `=` so the formula parser can
/// distinguish "no formula" from "empty formula".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
    pub formula: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One non-empty source row with its original 1-indexed row number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub number: u32,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(number: u32, cells: Vec<Cell>) -> Self {
        Self { number, cells }
    }

    /// Build a row from plain text values (no styles, no formulas).
    pub fn from_texts(number: u32, texts: &[&str]) -> Self {
        Self {
            number,
            cells: texts.iter().map(|t| Cell::text(*t)).collect(),
        }
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Cell text at `column`, empty string when the column is absent.
    pub fn text_at(&self, column: usize) -> &str {
        self.cells.get(column).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

/// A single-sheet tabular source, row-ordered.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a sheet from in-memory records, numbering rows from 1 and
    /// dropping entirely empty ones.
    pub fn from_records<S: AsRef<str>>(records: &[Vec<S>]) -> Self {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| Row {
                number: i as u32 + 1,
                cells: record.iter().map(|t| Cell::text(t.as_ref())).collect(),
            })
            .filter(|row| !row.is_empty())
            .collect();
        Self { rows }
    }

    /// Load a CSV file. Cells are text-only; empty rows are skipped but
    /// row numbering still counts them.
    #[instrument(level = "debug")]
    pub fn load_csv(path: &Path) -> HierarchyResult<Self> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        let mut row_number = 0u32;
        for record in reader.records() {
            let record = record?;
            row_number += 1;
            let row = Row {
                number: row_number,
                cells: record.iter().map(Cell::text).collect(),
            };
            if !row.is_empty() {
                rows.push(row);
            }
        }
        debug!(
            "loaded {} non-empty rows out of {} from {}",
            rows.len(),
            row_number,
            path.display()
        );
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
