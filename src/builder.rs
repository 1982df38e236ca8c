//! Position-based tree builder.
//!
//! Consumes interpreted rows in source order and reconstructs the hierarchy
//! from column positions alone. The parent-resolution stack is the load
//! bearing invariant: the stack is popped while its top entry's depth column
//! is not strictly less than the incoming row's, so a jump from depth 0
//! straight to depth 2 attaches under the depth-0 ancestor, and the next
//! depth-1 row still resolves against the correct remaining ancestor.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::{HierarchyArena, NodeData};
use crate::interpret::{RowInterpreter, RowSignal};
use crate::sheet::Sheet;

pub struct PositionTreeBuilder {
    interpreter: RowInterpreter,
    /// Current root-to-latest path as (node, depth column) pairs
    stack: Vec<(Index, usize)>,
}

impl PositionTreeBuilder {
    pub fn new(interpreter: RowInterpreter) -> Self {
        Self {
            interpreter,
            stack: Vec::new(),
        }
    }

    /// Build the full forest for a sheet. Strictly single-threaded: row
    /// order determines both sibling order and stack resolution.
    #[instrument(level = "debug", skip(self, sheet))]
    pub fn build(&mut self, sheet: &Sheet) -> HierarchyArena {
        self.stack.clear();
        let mut arena = HierarchyArena::new();

        for row in &sheet.rows {
            match self.interpreter.interpret(row) {
                RowSignal::Entry {
                    depth_column,
                    value,
                    amount,
                } => self.push_entry(&mut arena, depth_column, value, amount),
                RowSignal::Description { text } => {
                    // No node yet means there is nothing to describe.
                    if let Some(&(top, _)) = self.stack.last() {
                        arena.append_description(top, &text);
                    }
                }
                RowSignal::Skip => {}
            }
        }

        debug!(
            "built position tree: {} nodes, {} roots",
            arena.node_count(),
            arena.roots().len()
        );
        arena
    }

    fn push_entry(
        &mut self,
        arena: &mut HierarchyArena,
        depth_column: usize,
        value: String,
        amount: Option<f64>,
    ) {
        // Pop until the top is a strict ancestor (smaller depth column).
        while let Some(&(_, top_column)) = self.stack.last() {
            if top_column < depth_column {
                break;
            }
            self.stack.pop();
        }

        let parent = self.stack.last().map(|&(idx, _)| idx);
        let node_idx = arena.insert_node(NodeData::new(value, amount), parent);
        self.stack.push((node_idx, depth_column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Sheet;

    fn build(records: &[Vec<&str>]) -> HierarchyArena {
        let sheet = Sheet::from_records(records);
        PositionTreeBuilder::new(RowInterpreter::new(1, 10)).build(&sheet)
    }

    #[test]
    fn test_deeper_column_nests_under_shallower() {
        let arena = build(&[
            vec!["", "Program A"],
            vec!["", "", "Project 1"],
            vec!["", "", "Project 2"],
        ]);
        assert_eq!(arena.roots().len(), 1);
        let root = arena.get_node(arena.roots()[0]).unwrap();
        assert_eq!(root.data.value, "Program A");
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_skipped_level_attaches_to_remaining_ancestor() {
        // Depth columns [1, 3, 1, 2]: the jump to 3 skips a level, and the
        // following depth-2 row must still hang off the depth-1 root.
        let arena = build(&[
            vec!["", "Alpha"],
            vec!["", "", "", "Deep"],
            vec!["", "Beta"],
            vec!["", "", "Middle"],
        ]);
        assert_eq!(arena.roots().len(), 2);

        let alpha = arena.get_node(arena.roots()[0]).unwrap();
        assert_eq!(alpha.data.value, "Alpha");
        assert_eq!(alpha.children.len(), 1);
        assert_eq!(
            arena.get_node(alpha.children[0]).unwrap().data.value,
            "Deep"
        );

        let beta = arena.get_node(arena.roots()[1]).unwrap();
        assert_eq!(beta.children.len(), 1);
        assert_eq!(
            arena.get_node(beta.children[0]).unwrap().data.value,
            "Middle"
        );
    }

    #[test]
    fn test_same_column_rows_are_siblings() {
        let arena = build(&[
            vec!["", "Parent"],
            vec!["", "", "First"],
            vec!["", "", "Second"],
            vec!["", "", "Third"],
        ]);
        let parent = arena.get_node(arena.roots()[0]).unwrap();
        let names: Vec<String> = parent
            .children
            .iter()
            .map(|&c| arena.get_node(c).unwrap().data.value.clone())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_no_node_depth_less_than_ancestor() {
        let arena = build(&[
            vec!["", "A"],
            vec!["", "", "", "B"],
            vec!["", "", "C"],
            vec!["", "D"],
            vec!["", "", "E"],
        ]);
        for (idx, node) in arena.iter() {
            let mut current = node.parent;
            while let Some(parent_idx) = current {
                let parent = arena.get_node(parent_idx).unwrap();
                assert_ne!(idx, parent_idx);
                current = parent.parent;
            }
        }
        // Every node has one parent or is a declared root.
        let root_count = arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .count();
        assert_eq!(root_count, arena.roots().len());
    }
}
