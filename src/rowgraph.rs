//! Formula-reference tree builder.
//!
//! Scans the designated column for aggregation formulas, records
//! parent-row -> child-rows and child-row -> parent-rows mappings, then
//! expands rows with no parents into row-number trees. A child referenced by
//! several parents is duplicated under each of them; only a reference chain
//! that reaches back into its own ancestry is an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, instrument};

use crate::errors::{HierarchyError, HierarchyResult};
use crate::formula::FormulaParser;
use crate::sheet::Sheet;

/// Row-graph node: raw row numbers, prior to label/amount attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNode {
    pub row: u32,
    pub children: Vec<RowNode>,
}

impl RowNode {
    pub fn leaf(row: u32) -> Self {
        Self {
            row,
            children: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(RowNode::count).sum::<usize>()
    }
}

pub struct FormulaGraphBuilder {
    parser: FormulaParser,
    column_index: usize,
}

impl FormulaGraphBuilder {
    pub fn new(parser: FormulaParser, column_index: usize) -> Self {
        Self {
            parser,
            column_index,
        }
    }

    /// Build row-number trees from the sheet's formula cells.
    #[instrument(level = "debug", skip(self, sheet))]
    pub fn build(&self, sheet: &Sheet) -> HierarchyResult<Vec<RowNode>> {
        let mut parent_to_children: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        let mut child_to_parents: HashMap<u32, Vec<u32>> = HashMap::new();

        for row in &sheet.rows {
            let formula = match row.cell(self.column_index).and_then(|c| c.formula.as_deref()) {
                Some(formula) => formula,
                None => continue,
            };
            let refs = self.parser.refs(formula);
            if refs.is_empty() {
                continue;
            }
            for &child_row in &refs {
                child_to_parents.entry(child_row).or_default().push(row.number);
            }
            parent_to_children.entry(row.number).or_default().extend(refs);
        }

        let roots: Vec<u32> = parent_to_children
            .keys()
            .filter(|row| !child_to_parents.contains_key(row))
            .copied()
            .collect();

        // Formulas but no root row means every parent is also referenced.
        if roots.is_empty() && !parent_to_children.is_empty() {
            let cycle_row = *parent_to_children.keys().next().unwrap();
            return Err(HierarchyError::CycleDetected(cycle_row));
        }

        debug!(
            "formula graph: {} parents, {} referenced rows, {} roots",
            parent_to_children.len(),
            child_to_parents.len(),
            roots.len()
        );

        let mut trees = Vec::with_capacity(roots.len());
        let mut ancestors = HashSet::new();
        for root in roots {
            trees.push(Self::expand(root, &parent_to_children, &mut ancestors)?);
        }
        Ok(trees)
    }

    /// Recursively expand a row into its subtree. `ancestors` holds the rows
    /// on the current path only: a repeat there is a genuine reference
    /// cycle, while a repeat elsewhere is a legal shared child.
    fn expand(
        row: u32,
        parent_to_children: &BTreeMap<u32, Vec<u32>>,
        ancestors: &mut HashSet<u32>,
    ) -> HierarchyResult<RowNode> {
        if !ancestors.insert(row) {
            return Err(HierarchyError::CycleDetected(row));
        }

        let mut node = RowNode::leaf(row);
        if let Some(children) = parent_to_children.get(&row) {
            for &child_row in children {
                node.children
                    .push(Self::expand(child_row, parent_to_children, ancestors)?);
            }
        }

        ancestors.remove(&row);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Cell, Row, Sheet};

    fn formula_row(number: u32, column: usize, formula: &str) -> Row {
        let mut cells = vec![Cell::default(); column + 1];
        cells[column] = Cell {
            text: "0".to_string(),
            formula: Some(formula.to_string()),
            ..Cell::default()
        };
        Row::new(number, cells)
    }

    #[test]
    fn test_builds_tree_from_sum_and_refs() {
        let sheet = Sheet::new(vec![
            formula_row(1, 10, "=K3+K6"),
            formula_row(3, 10, "=SUM(K4:K5)"),
        ]);
        let builder = FormulaGraphBuilder::new(FormulaParser::new("K").unwrap(), 10);
        let trees = builder.build(&sheet).unwrap();

        assert_eq!(trees.len(), 1);
        let root = &trees[0];
        assert_eq!(root.row, 1);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].row, 3);
        let range_children: Vec<u32> = root.children[0].children.iter().map(|n| n.row).collect();
        assert_eq!(range_children, vec![4, 5]);
        assert_eq!(root.children[1].row, 6);
    }

    #[test]
    fn test_shared_child_is_duplicated_under_each_parent() {
        let sheet = Sheet::new(vec![
            formula_row(1, 10, "=K5"),
            formula_row(2, 10, "=K5"),
            formula_row(5, 10, "=K8+K9"),
        ]);
        let builder = FormulaGraphBuilder::new(FormulaParser::new("K").unwrap(), 10);
        let trees = builder.build(&sheet).unwrap();

        assert_eq!(trees.len(), 2);
        for tree in &trees {
            assert_eq!(tree.children.len(), 1);
            assert_eq!(tree.children[0].row, 5);
            assert_eq!(tree.children[0].children.len(), 2);
        }
    }

    #[test]
    fn test_cycle_is_reported_not_recursed() {
        let sheet = Sheet::new(vec![
            formula_row(1, 10, "=K2"),
            formula_row(2, 10, "=K3"),
            formula_row(3, 10, "=K2"),
        ]);
        let builder = FormulaGraphBuilder::new(FormulaParser::new("K").unwrap(), 10);
        let err = builder.build(&sheet).unwrap_err();
        assert!(matches!(err, HierarchyError::CycleDetected(2)));
    }

    #[test]
    fn test_rootless_cycle_is_reported() {
        let sheet = Sheet::new(vec![
            formula_row(2, 10, "=K3"),
            formula_row(3, 10, "=K2"),
        ]);
        let builder = FormulaGraphBuilder::new(FormulaParser::new("K").unwrap(), 10);
        assert!(matches!(
            builder.build(&sheet),
            Err(HierarchyError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_rows_without_formulas_are_leaves() {
        let sheet = Sheet::new(vec![formula_row(7, 10, "=SUM(K10:K12)")]);
        let builder = FormulaGraphBuilder::new(FormulaParser::new("K").unwrap(), 10);
        let trees = builder.build(&sheet).unwrap();
        assert_eq!(trees[0].count(), 4);
        assert!(trees[0].children.iter().all(|c| c.children.is_empty()));
    }
}
