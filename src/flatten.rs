//! Flattening: one record per terminal node, carrying the full ancestor
//! chain as ordered per-level fields.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::HierarchyArena;

/// Exported record for one terminal node.
///
/// `levels` always has the effective level count for the whole export:
/// `levels[i]` is the ancestor value at depth `i` (the final occupied slot is
/// the leaf itself), padded with empty strings beyond the leaf's depth.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafRecord {
    pub levels: Vec<String>,
    pub value: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub depth: usize,
    pub full_path: String,
}

pub struct Flattener {
    max_levels: usize,
    delimiter: String,
}

impl Flattener {
    pub fn new(max_levels: usize, delimiter: impl Into<String>) -> Self {
        Self {
            max_levels,
            delimiter: delimiter.into(),
        }
    }

    /// Depth-first pre-order walk emitting one record per childless node.
    ///
    /// The level count is the configured maximum, widened when the observed
    /// depth exceeds it; paths are never truncated.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn flatten(&self, tree: &HierarchyArena) -> Vec<LeafRecord> {
        let mut raw: Vec<(Vec<String>, Option<String>, Option<f64>)> = Vec::new();
        let mut path = Vec::new();
        for &root in tree.roots() {
            self.walk(tree, root, &mut path, &mut raw);
        }

        let observed = raw.iter().map(|(path, _, _)| path.len()).max().unwrap_or(0);
        let levels = self.max_levels.max(observed);
        debug!("flattened {} leaves, {} level columns", raw.len(), levels);

        raw.into_iter()
            .map(|(path, description, amount)| {
                let mut level_fields = vec![String::new(); levels];
                for (i, value) in path.iter().enumerate() {
                    level_fields[i] = value.clone();
                }
                LeafRecord {
                    full_path: path.join(&self.delimiter),
                    depth: path.len() - 1,
                    value: path.last().cloned().unwrap_or_default(),
                    description,
                    amount,
                    levels: level_fields,
                }
            })
            .collect()
    }

    fn walk(
        &self,
        tree: &HierarchyArena,
        idx: Index,
        path: &mut Vec<String>,
        out: &mut Vec<(Vec<String>, Option<String>, Option<f64>)>,
    ) {
        let node = match tree.get_node(idx) {
            Some(node) => node,
            None => return,
        };

        path.push(node.data.value.clone());
        if node.children.is_empty() {
            out.push((path.clone(), node.data.description.clone(), node.data.amount));
        } else {
            for &child in &node.children {
                self.walk(tree, child, path, out);
            }
        }
        path.pop();
    }
}
