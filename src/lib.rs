//! tabtree reconstructs organizational/budget hierarchies from spreadsheet
//! rows where nesting depth is encoded by column position, and converts them
//! into flattened, analysis-friendly representations.
//!
//! Two construction paths produce the same arena-backed hierarchy:
//!
//! * position-based: column index of each row's marker/value acts as the
//!   depth signal, resolved against an explicit parent stack
//!   ([`builder::PositionTreeBuilder`]);
//! * formula-based: aggregation formulas in a designated column yield a
//!   row-number graph that is then joined with labels and amounts
//!   ([`rowgraph::FormulaGraphBuilder`] + [`join::LabelJoiner`]).
//!
//! Downstream flattening, display and export code is written once against
//! [`arena::HierarchyArena`], regardless of the construction path.

pub mod arena;
pub mod builder;
pub mod classify;
pub mod cli;
pub mod config;
pub mod display;
pub mod errors;
pub mod exitcode;
pub mod export;
pub mod flatten;
pub mod formula;
pub mod interpret;
pub mod join;
pub mod rowgraph;
pub mod sheet;
pub mod util;
pub mod xlsx;

pub use arena::{HierarchyArena, NodeData, TreeStats};
pub use builder::PositionTreeBuilder;
pub use config::Settings;
pub use errors::{HierarchyError, HierarchyResult};
pub use flatten::{Flattener, LeafRecord};
pub use interpret::{RowInterpreter, RowSignal};
pub use sheet::Sheet;

use formula::{column_index, FormulaParser};
use join::LabelJoiner;
use rowgraph::FormulaGraphBuilder;

/// Position path: interpreted rows -> stack-built hierarchy.
///
/// `formatting_aware` enables description detection from cell styles; plain
/// sources without styles behave identically either way.
pub fn build_position_tree(
    sheet: &Sheet,
    settings: &Settings,
    formatting_aware: bool,
) -> HierarchyArena {
    let interpreter = if formatting_aware {
        RowInterpreter::formatting_aware(settings.start_column, settings.amount_column)
    } else {
        RowInterpreter::new(settings.start_column, settings.amount_column)
    };
    PositionTreeBuilder::new(interpreter).build(sheet)
}

/// Formula path: row-graph from aggregation formulas, then the parallel
/// label/amount join (with empty-label subtree pruning).
pub fn build_formula_tree(sheet: &Sheet, settings: &Settings) -> HierarchyResult<HierarchyArena> {
    let parser = FormulaParser::new(&settings.formula_column)?;
    let column = column_index(&settings.formula_column)?;
    let graph = FormulaGraphBuilder::new(parser, column).build(sheet)?;

    let joiner = LabelJoiner::new(settings.amount_column, settings.batch_size);
    let entries = joiner.row_entries(sheet);
    Ok(joiner.join(&graph, &entries))
}

/// Flatten any built hierarchy into one record per terminal node.
pub fn flatten_tree(tree: &HierarchyArena, settings: &Settings) -> Vec<LeafRecord> {
    Flattener::new(settings.max_levels, settings.delimiter.clone()).flatten(tree)
}
