//! Label/amount joiner: turns row-number trees into value trees.
//!
//! The row -> (label, amount) mapping is embarrassingly parallel and runs on
//! the rayon pool over row batches; each batch yields an immutable partial
//! map and the fan-in is a plain sequential union (row numbers are disjoint
//! across batches by construction).
//!
//! Joining prunes every node whose resolved label is empty, together with its
//! whole subtree. This is a deliberately lossy policy: an unlabeled row
//! cannot anchor content, so labeled descendants underneath it are discarded
//! rather than promoted.

use std::collections::HashMap;

use generational_arena::Index;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::arena::{HierarchyArena, NodeData};
use crate::interpret::parse_amount;
use crate::rowgraph::RowNode;
use crate::sheet::{Row, Sheet};

/// Label and figure resolved for one source row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEntry {
    pub label: String,
    pub amount: Option<f64>,
}

pub struct LabelJoiner {
    /// Label columns are `0..amount_column`, scanned right to left so the
    /// column closest to the figure wins.
    amount_column: usize,
    batch_size: usize,
}

impl LabelJoiner {
    pub fn new(amount_column: usize, batch_size: usize) -> Self {
        Self {
            amount_column,
            batch_size: batch_size.max(1),
        }
    }

    /// Map every sheet row to its `(label, amount)` pair, in parallel.
    #[instrument(level = "debug", skip(self, sheet))]
    pub fn row_entries(&self, sheet: &Sheet) -> HashMap<u32, RowEntry> {
        let partials: Vec<HashMap<u32, RowEntry>> = sheet
            .rows
            .par_chunks(self.batch_size)
            .map(|batch| {
                batch
                    .iter()
                    .map(|row| {
                        let label = self.resolve_label(row);
                        let amount = parse_amount(row.text_at(self.amount_column));
                        (row.number, RowEntry { label, amount })
                    })
                    .collect()
            })
            .collect();

        let mut entries = HashMap::new();
        for partial in partials {
            entries.extend(partial);
        }
        debug!("resolved {} row entries", entries.len());
        entries
    }

    fn resolve_label(&self, row: &Row) -> String {
        for column in (0..self.amount_column).rev() {
            let text = row.text_at(column).trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        String::new()
    }

    /// Rebuild row-number trees into a value hierarchy, dropping every
    /// subtree anchored on an empty label.
    #[instrument(level = "debug", skip(self, graph, entries))]
    pub fn join(&self, graph: &[RowNode], entries: &HashMap<u32, RowEntry>) -> HierarchyArena {
        let mut arena = HierarchyArena::new();
        let mut pruned = 0usize;

        for root in graph {
            Self::attach(root, None, &mut arena, entries, &mut pruned);
        }

        if pruned > 0 {
            warn!(
                "pruned {} unlabeled subtree(s) during join; descendants were discarded",
                pruned
            );
        }
        arena
    }

    fn attach(
        node: &RowNode,
        parent: Option<Index>,
        arena: &mut HierarchyArena,
        entries: &HashMap<u32, RowEntry>,
        pruned: &mut usize,
    ) {
        let entry = entries.get(&node.row);
        let label = entry.map(|e| e.label.trim()).unwrap_or("");
        if label.is_empty() {
            *pruned += 1;
            return;
        }
        let amount = entry.and_then(|e| e.amount);

        let idx = arena.insert_node(NodeData::new(label, amount), parent);
        for child in &node.children {
            Self::attach(child, Some(idx), arena, entries, pruned);
        }
    }
}
