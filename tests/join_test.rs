//! Label/amount join: parallel row mapping and empty-label subtree pruning

use std::collections::HashMap;

use tabtree::join::{LabelJoiner, RowEntry};
use tabtree::rowgraph::RowNode;
use tabtree::sheet::{Row, Sheet};

fn node(row: u32, children: Vec<RowNode>) -> RowNode {
    RowNode { row, children }
}

fn entry(label: &str, amount: Option<f64>) -> RowEntry {
    RowEntry {
        label: label.to_string(),
        amount,
    }
}

// ============================================================
// Row Mapping Tests
// ============================================================

#[test]
fn given_multi_column_row_when_mapping_then_rightmost_label_wins() {
    let sheet = Sheet::new(vec![Row::from_texts(
        7,
        &["Department", "", "Bureau", "Project X", "", "", "", "", "", "", "2,500,000"],
    )]);
    let entries = LabelJoiner::new(10, 1000).row_entries(&sheet);

    assert_eq!(entries[&7].label, "Project X");
    assert_eq!(entries[&7].amount, Some(2_500_000.0));
}

#[test]
fn given_small_batches_when_mapping_then_union_covers_every_row() {
    let rows: Vec<Row> = (1..=257)
        .map(|i| {
            Row::from_texts(
                i,
                &["", &format!("label {i}"), "", "", "", "", "", "", "", "", "1"],
            )
        })
        .collect();
    let entries = LabelJoiner::new(10, 16).row_entries(&Sheet::new(rows));

    assert_eq!(entries.len(), 257);
    assert_eq!(entries[&1].label, "label 1");
    assert_eq!(entries[&257].label, "label 257");
}

#[test]
fn given_blank_figure_when_mapping_then_amount_absent() {
    let sheet = Sheet::new(vec![Row::from_texts(1, &["Label only"])]);
    let entries = LabelJoiner::new(10, 1000).row_entries(&sheet);
    assert_eq!(entries[&1], entry("Label only", None));
}

// ============================================================
// Pruning Tests
// ============================================================

#[test]
fn given_unlabeled_row_when_joining_then_node_and_descendants_are_absent() {
    let mut entries = HashMap::new();
    entries.insert(1, entry("Root", Some(100.0)));
    entries.insert(2, entry("   ", None)); // whitespace label counts as empty
    entries.insert(3, entry("Valid grandchild", Some(60.0)));
    entries.insert(4, entry("Sibling", Some(40.0)));

    let graph = vec![node(
        1,
        vec![node(2, vec![node(3, vec![])]), node(4, vec![])],
    )];
    let arena = LabelJoiner::new(10, 1000).join(&graph, &entries);

    let values: Vec<String> = arena.iter().map(|(_, n)| n.data.value.clone()).collect();
    assert_eq!(values, vec!["Root", "Sibling"]);
}

#[test]
fn given_unlabeled_root_when_joining_then_whole_tree_is_absent() {
    let mut entries = HashMap::new();
    entries.insert(2, entry("Labeled child", None));

    let graph = vec![node(1, vec![node(2, vec![])])];
    let arena = LabelJoiner::new(10, 1000).join(&graph, &entries);
    assert!(arena.is_empty());
}

#[test]
fn given_pruned_sibling_when_joining_then_parent_keeps_other_children() {
    let mut entries = HashMap::new();
    entries.insert(1, entry("Parent", None));
    entries.insert(2, entry("", None));
    entries.insert(3, entry("Survivor", Some(5.0)));

    let graph = vec![node(1, vec![node(2, vec![]), node(3, vec![])])];
    let arena = LabelJoiner::new(10, 1000).join(&graph, &entries);

    let root = arena.get_node(arena.roots()[0]).unwrap();
    assert_eq!(root.children.len(), 1);
    assert_eq!(
        arena.get_node(root.children[0]).unwrap().data.value,
        "Survivor"
    );
}
