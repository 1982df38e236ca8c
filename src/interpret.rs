//! Per-row interpretation: locate the depth column, the value cell and the
//! numeric figure for one source row.
//!
//! A marker anywhere in the row pins the depth column; the value then sits in
//! the column immediately to its right. Without a marker the first non-empty
//! column supplies both. The formatting-aware variant additionally recognizes
//! description rows (italic value cell, no figure), which attach to the
//! previously built node instead of creating one.

use tracing::trace;

use crate::classify::{classify, TokenClass};
use crate::sheet::Row;

/// What one row contributes to the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSignal {
    /// A value-bearing row: creates a node at the given depth column.
    Entry {
        depth_column: usize,
        value: String,
        amount: Option<f64>,
    },
    /// Italic, figure-less text that describes the previous node.
    Description { text: String },
    /// Nothing usable (empty row, or a marker with no value to its right).
    Skip,
}

/// Interpreter configured with the column layout of the source.
#[derive(Debug, Clone)]
pub struct RowInterpreter {
    start_column: usize,
    amount_column: usize,
    formatting_aware: bool,
}

impl RowInterpreter {
    /// Plain interpreter: cell styles are ignored, every usable row is an entry.
    pub fn new(start_column: usize, amount_column: usize) -> Self {
        Self {
            start_column,
            amount_column,
            formatting_aware: false,
        }
    }

    /// Style-sensitive variant: italic rows without a figure become descriptions.
    pub fn formatting_aware(start_column: usize, amount_column: usize) -> Self {
        Self {
            formatting_aware: true,
            ..Self::new(start_column, amount_column)
        }
    }

    pub fn interpret(&self, row: &Row) -> RowSignal {
        let located = match self.locate_value(row) {
            Some(located) => located,
            None => return RowSignal::Skip,
        };
        let (depth_column, value_column) = located;

        let value = row.text_at(value_column).trim().to_string();
        if value.is_empty() {
            return RowSignal::Skip;
        }

        let amount = parse_amount(row.text_at(self.amount_column));

        if self.formatting_aware && amount.is_none() {
            let italic = row
                .cell(value_column)
                .map(|c| c.style.italic)
                .unwrap_or(false);
            if italic {
                trace!("row {}: description: {}", row.number, value);
                return RowSignal::Description { text: value };
            }
        }

        trace!(
            "row {}: depth_column={} value={:?} amount={:?}",
            row.number,
            depth_column,
            value,
            amount
        );
        RowSignal::Entry {
            depth_column,
            value,
            amount,
        }
    }

    /// Find `(depth_column, value_column)`.
    ///
    /// Two passes: a marker anywhere wins first; otherwise the first
    /// non-empty, non-marker column carries both roles. A marker with an
    /// empty cell to its right disqualifies the whole row.
    fn locate_value(&self, row: &Row) -> Option<(usize, usize)> {
        for i in self.start_column..row.cells.len() {
            let text = row.text_at(i).trim();
            if text.is_empty() {
                continue;
            }
            if classify(text) == TokenClass::Marker {
                let value_column = i + 1;
                if !row.text_at(value_column).trim().is_empty() {
                    return Some((i, value_column));
                }
                return None;
            }
        }

        for i in self.start_column..row.cells.len() {
            let text = row.text_at(i).trim();
            if !text.is_empty() && classify(text) == TokenClass::Content {
                return Some((i, i));
            }
        }

        None
    }
}

/// Parse a figure cell: strip thousands separators, quotes and whitespace,
/// then try to read a number. Malformed figures are absent, never an error.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '\'' && *c != '"')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
