use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Data payload for hierarchy nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Entity name (non-empty)
    pub value: String,
    /// Numeric figure from the figure column, absent when unparseable
    pub amount: Option<f64>,
    /// Descriptive text attached after creation, space-joined across rows
    pub description: Option<String>,
}

impl NodeData {
    pub fn new(value: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            value: value.into(),
            amount,
            description: None,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} ({})", self.value, amount),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes, source-row order
    pub children: Vec<Index>,
}

/// Aggregate counters over one hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub nodes_with_children: usize,
    pub nodes_with_amount: usize,
    pub leaf_nodes: usize,
    pub leaf_amount_total: f64,
    pub max_depth: usize,
}

/// Arena-based forest for hierarchy storage.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Unlike a single-rooted tree, a reconstructed sheet usually yields several
/// top-level entities, so roots are kept as an ordered list.
#[derive(Debug, Default)]
pub struct HierarchyArena {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
}

impl HierarchyArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Append description text to a node, space-joined so descriptions that
    /// span multiple source rows read as one sentence.
    pub fn append_description(&mut self, idx: Index, text: &str) {
        if let Some(node) = self.arena.get_mut(idx) {
            match node.data.description.as_mut() {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(text);
                }
                None => node.data.description = Some(text.to_string()),
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order iterator over the whole forest, roots in insertion order.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    /// Maximum node count on any root-to-leaf path.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects the values of all terminal nodes, pre-order.
    pub fn leaf_values(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        for &root in &self.roots {
            self.collect_leaves(root, &mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, node_idx: Index, leaves: &mut Vec<String>) {
        if let Some(node) = self.get_node(node_idx) {
            if node.children.is_empty() {
                leaves.push(node.data.value.clone());
            } else {
                for &child in &node.children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for (_, node) in self.iter() {
            stats.total_nodes += 1;
            if node.children.is_empty() {
                stats.leaf_nodes += 1;
                stats.leaf_amount_total += node.data.amount.unwrap_or(0.0);
            } else {
                stats.nodes_with_children += 1;
            }
            if node.data.amount.is_some() {
                stats.nodes_with_amount += 1;
            }
        }
        stats.max_depth = self.depth();
        stats
    }
}

pub struct TreeIterator<'a> {
    arena: &'a HierarchyArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a HierarchyArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a HierarchyArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a HierarchyArena) -> Self {
        let stack = arena.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
