//! Read-only export surfaces: nested tree JSON, flattened leaf records as
//! CSV and JSON tables.
//!
//! Writers serialize the complete artifact in memory before touching the
//! filesystem, so a failing run never leaves a partial output file behind.

use std::fs;
use std::path::Path;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::arena::{HierarchyArena, NodeData};
use crate::errors::{HierarchyError, HierarchyResult};
use crate::flatten::LeafRecord;

/// Nested tree document shape: value/amount/description/children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDoc {
    pub value: String,
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeDoc>,
}

/// Convert an arena forest into its serializable document form.
pub fn tree_to_docs(tree: &HierarchyArena) -> Vec<TreeDoc> {
    tree.roots()
        .iter()
        .filter_map(|&root| node_to_doc(tree, root))
        .collect()
}

fn node_to_doc(tree: &HierarchyArena, idx: Index) -> Option<TreeDoc> {
    let node = tree.get_node(idx)?;
    Some(TreeDoc {
        value: node.data.value.clone(),
        amount: node.data.amount,
        description: node.data.description.clone(),
        children: node
            .children
            .iter()
            .filter_map(|&child| node_to_doc(tree, child))
            .collect(),
    })
}

/// Rebuild an arena forest from its document form.
pub fn docs_to_tree(docs: &[TreeDoc]) -> HierarchyArena {
    let mut arena = HierarchyArena::new();
    for doc in docs {
        insert_doc(&mut arena, doc, None);
    }
    arena
}

fn insert_doc(arena: &mut HierarchyArena, doc: &TreeDoc, parent: Option<Index>) {
    let mut data = NodeData::new(doc.value.clone(), doc.amount);
    data.description = doc.description.clone();
    let idx = arena.insert_node(data, parent);
    for child in &doc.children {
        insert_doc(arena, child, Some(idx));
    }
}

/// Write a hierarchy as pretty-printed JSON.
#[instrument(level = "debug", skip(tree))]
pub fn write_tree_json(path: &Path, tree: &HierarchyArena) -> HierarchyResult<()> {
    let body = serde_json::to_string_pretty(&tree_to_docs(tree))?;
    fs::write(path, body)?;
    debug!("wrote tree json: {}", path.display());
    Ok(())
}

/// Read a hierarchy back from a tree JSON document.
#[instrument(level = "debug")]
pub fn read_tree_json(path: &Path) -> HierarchyResult<HierarchyArena> {
    let body = fs::read_to_string(path)?;
    let docs: Vec<TreeDoc> = serde_json::from_str(&body)
        .map_err(|e| HierarchyError::InvalidTree(format!("{}: {}", path.display(), e)))?;
    Ok(docs_to_tree(&docs))
}

fn level_headers(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("level_{i}")).collect()
}

/// Render leaf records to CSV bytes (header + one line per record).
pub fn leaf_records_to_csv(records: &[LeafRecord]) -> HierarchyResult<Vec<u8>> {
    let levels = records.first().map(|r| r.levels.len()).unwrap_or(0);
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = level_headers(levels);
    header.extend(
        ["value", "description", "amount", "depth", "full_path"]
            .iter()
            .map(|s| s.to_string()),
    );
    writer.write_record(&header)?;

    for record in records {
        let mut fields = record.levels.clone();
        fields.push(record.value.clone());
        fields.push(record.description.clone().unwrap_or_default());
        fields.push(
            record
                .amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
        );
        fields.push(record.depth.to_string());
        fields.push(record.full_path.clone());
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|e| HierarchyError::InvalidTree(e.to_string()))
}

/// Write leaf records as a CSV file.
#[instrument(level = "debug", skip(records))]
pub fn write_leaf_csv(path: &Path, records: &[LeafRecord]) -> HierarchyResult<()> {
    let body = leaf_records_to_csv(records)?;
    fs::write(path, body)?;
    debug!("wrote {} leaf records: {}", records.len(), path.display());
    Ok(())
}

/// Render leaf records as a JSON table (one object per record, level_N keys).
pub fn leaf_records_to_json(records: &[LeafRecord]) -> Value {
    let rows: Vec<Value> = records
        .iter()
        .map(|record| {
            let mut obj = Map::new();
            for (i, level) in record.levels.iter().enumerate() {
                obj.insert(format!("level_{i}"), json!(level));
            }
            obj.insert("value".to_string(), json!(record.value));
            obj.insert("description".to_string(), json!(record.description));
            obj.insert("amount".to_string(), json!(record.amount));
            obj.insert("depth".to_string(), json!(record.depth));
            obj.insert("full_path".to_string(), json!(record.full_path));
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

/// Write leaf records as a JSON table file.
#[instrument(level = "debug", skip(records))]
pub fn write_leaf_json(path: &Path, records: &[LeafRecord]) -> HierarchyResult<()> {
    let body = serde_json::to_string_pretty(&leaf_records_to_json(records))?;
    fs::write(path, body)?;
    debug!("wrote {} leaf records: {}", records.len(), path.display());
    Ok(())
}
