/*
Terminal rendering lives behind a trait so both construction paths share one
renderer: anything stored in a HierarchyArena can be shown, regardless of
whether it came from column positions or formula references.
 */
use generational_arena::Index;
use termtree::Tree;

use crate::arena::HierarchyArena;

pub trait TreeNodeConvert {
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeNodeConvert for HierarchyArena {
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn build_tree(arena: &HierarchyArena, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.data.to_string());
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        self.roots()
            .iter()
            .filter_map(|&root_idx| {
                self.get_node(root_idx).map(|root| {
                    let mut tree = Tree::new(root.data.to_string());
                    build_tree(self, root_idx, &mut tree);
                    tree
                })
            })
            .collect()
    }
}
