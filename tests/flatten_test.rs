//! Flattener properties: one record per terminal node, amount conservation,
//! deterministic output, level widening.

use tabtree::arena::NodeData;
use tabtree::{Flattener, HierarchyArena};

fn budget_tree() -> HierarchyArena {
    let mut arena = HierarchyArena::new();
    let dept = arena.insert_node(NodeData::new("Department", None), None);
    let bureau_a = arena.insert_node(NodeData::new("Bureau A", None), Some(dept));
    arena.insert_node(NodeData::new("Project 1", Some(1000.0)), Some(bureau_a));
    arena.insert_node(NodeData::new("Project 2", Some(250.5)), Some(bureau_a));
    let bureau_b = arena.insert_node(NodeData::new("Bureau B", Some(99.0)), Some(dept));
    arena.insert_node(NodeData::new("Project 3", Some(700.0)), Some(bureau_b));
    arena.insert_node(NodeData::new("Standalone", Some(44.5)), None);
    arena
}

#[test]
fn given_tree_when_flattening_then_record_count_equals_childless_nodes() {
    let tree = budget_tree();
    let childless = tree.iter().filter(|(_, n)| n.children.is_empty()).count();
    let records = Flattener::new(9, " > ").flatten(&tree);
    assert_eq!(records.len(), childless);
}

#[test]
fn given_tree_when_flattening_then_leaf_amount_sum_is_conserved() {
    let tree = budget_tree();
    let source_sum: f64 = tree
        .iter()
        .filter(|(_, n)| n.children.is_empty())
        .filter_map(|(_, n)| n.data.amount)
        .sum();
    let record_sum: f64 = Flattener::new(9, " > ")
        .flatten(&tree)
        .iter()
        .filter_map(|r| r.amount)
        .sum();
    assert_eq!(source_sum, record_sum);
    assert_eq!(record_sum, 1995.0);
}

#[test]
fn given_tree_when_flattening_twice_then_output_is_identical() {
    let tree = budget_tree();
    let flattener = Flattener::new(9, " > ");
    assert_eq!(flattener.flatten(&tree), flattener.flatten(&tree));
}

#[test]
fn given_end_to_end_scenario_when_flattening_then_levels_match() {
    let mut arena = HierarchyArena::new();
    let root = arena.insert_node(NodeData::new("Program A", None), None);
    arena.insert_node(NodeData::new("Sub Item", Some(1000.0)), Some(root));

    let records = Flattener::new(9, " > ").flatten(&arena);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.levels[0], "Program A");
    assert_eq!(record.levels[1], "Sub Item");
    assert_eq!(record.amount, Some(1000.0));
    assert_eq!(record.depth, 1);
    assert_eq!(record.full_path, "Program A > Sub Item");
}

#[test]
fn given_depth_beyond_configured_levels_when_flattening_then_widened_not_truncated() {
    let mut arena = HierarchyArena::new();
    let mut parent = None;
    for i in 0..12 {
        parent = Some(arena.insert_node(NodeData::new(format!("level {i}"), None), parent));
    }

    let records = Flattener::new(9, " > ").flatten(&arena);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].levels.len(), 12);
    assert_eq!(records[0].levels[11], "level 11");
    assert_eq!(records[0].depth, 11);
}

#[test]
fn given_childless_root_when_flattening_then_single_element_record_at_depth_zero() {
    let mut arena = HierarchyArena::new();
    arena.insert_node(NodeData::new("Lone", Some(3.0)), None);

    let records = Flattener::new(4, "|").flatten(&arena);
    assert_eq!(records[0].depth, 0);
    assert_eq!(records[0].full_path, "Lone");
    assert_eq!(records[0].levels, vec!["Lone", "", "", ""]);
}

#[test]
fn given_custom_delimiter_when_flattening_then_path_uses_it() {
    let tree = budget_tree();
    let records = Flattener::new(9, " / ").flatten(&tree);
    assert_eq!(records[0].full_path, "Department / Bureau A / Project 1");
}
