use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use compact_str::CompactString;

use super::aggregate;
use super::arena::{HierNode, HierTree, NodeId, METRIC_SLOTS};

/// Parse a node-dump listing into a tree.
///
/// One record per line, tab-separated:
/// `id  parent_id  key  is_dir(0|1)  count  size`.
/// Parent id 0 refers to an implicit top-level node. Records must appear
/// after the record of their parent; lines whose parent id was never seen
/// are skipped with a warning rather than failing the load.
///
/// A dump normally has a single top-level record; it is promoted to be the
/// tree root, so paths read `top/src` rather than starting at the synthetic
/// node. Several top-level records keep the synthetic empty-keyed root as
/// their common parent. Container metrics are aggregated bottom-up after
/// linking, so the dump only needs sizes on leaves.
pub fn load_node_dump(content: &str) -> Result<HierTree> {
    let mut tree = HierTree::new("");
    let mut id_map: HashMap<u64, NodeId> = HashMap::new();
    id_map.insert(0, tree.root);

    let mut skipped = 0usize;
    for (line_no, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 6 {
            bail!(
                "line {}: expected 6 tab-separated fields, got {}",
                line_no + 1,
                fields.len()
            );
        }

        let id: u64 = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad node id {:?}", line_no + 1, fields[0]))?;
        let parent_id: u64 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad parent id {:?}", line_no + 1, fields[1]))?;
        let is_dir = fields[3].trim() == "1";
        let count: f64 = fields[4]
            .parse()
            .with_context(|| format!("line {}: bad count {:?}", line_no + 1, fields[4]))?;
        let size: f64 = fields[5]
            .parse()
            .with_context(|| format!("line {}: bad size {:?}", line_no + 1, fields[5]))?;

        let Some(&parent) = id_map.get(&parent_id) else {
            tracing::warn!("line {}: unknown parent id {}, skipping", line_no + 1, parent_id);
            skipped += 1;
            continue;
        };

        let mut metrics = [0.0; METRIC_SLOTS];
        metrics[0] = size;
        metrics[1] = count;

        let node_id = tree.add_child(
            parent,
            HierNode {
                key: CompactString::new(fields[2]),
                metrics,
                is_dir,
                parent: None,
                first_child: None,
                next_sibling: None,
                depth: 0,
            },
        );
        id_map.insert(id, node_id);
    }

    if tree.is_empty() {
        bail!("no records found; this does not look like a node dump");
    }

    let top_level: Vec<NodeId> = tree.children(tree.root).collect();
    if let [only] = top_level[..] {
        tree.get_mut(tree.root).first_child = None;
        tree.get_mut(only).parent = None;
        tree.get_mut(only).next_sibling = None;
        tree.root = only;
        // The synthetic node at index 0 is now detached; real nodes move up
        for node in &mut tree.nodes[1..] {
            node.depth -= 1;
        }
    }

    aggregate::aggregate_metrics(&mut tree);

    tracing::info!(
        "Loaded node dump: {} nodes ({} skipped), total size {:.0}",
        tree.len(),
        skipped,
        tree.get(tree.root).metrics[0]
    );

    Ok(tree)
}

/// Read and parse a node-dump file.
pub fn load_node_dump_file(path: &Path) -> Result<HierTree> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading node dump {}", path.display()))?;
    load_node_dump(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "1\t0\ttop\t1\t0\t0\n\
                        2\t1\tsrc\t1\t0\t0\n\
                        3\t2\tmain.rs\t0\t1\t400\n\
                        4\t2\tlib.rs\t0\t1\t600\n\
                        5\t1\tREADME.md\t0\t1\t100\n";

    #[test]
    fn loads_and_aggregates_node_dump() {
        let tree = load_node_dump(DUMP).unwrap();
        let top = tree.root;
        let src = tree.child_by_key(top, "src").unwrap();

        assert_eq!(tree.get(top).metrics, [1100.0, 3.0]);
        assert_eq!(tree.get(src).metrics, [1000.0, 2.0]);
        assert!(tree.get(src).is_dir);
        assert_eq!(tree.path(src), "top/src");
    }

    #[test]
    fn sole_top_level_record_becomes_root() {
        let tree = load_node_dump(DUMP).unwrap();
        let root = tree.get(tree.root);
        assert_eq!(root.key, "top");
        assert_eq!(root.parent, None);
        assert_eq!(root.depth, 0);

        let src = tree.child_by_key(tree.root, "src").unwrap();
        assert_eq!(tree.get(src).depth, 1);
        assert_eq!(tree.path(tree.root), "top");
    }

    #[test]
    fn multiple_top_level_records_keep_synthetic_root() {
        let dump = "1\t0\ta\t0\t1\t10\n2\t0\tb\t0\t1\t20\n";
        let tree = load_node_dump(dump).unwrap();
        assert_eq!(tree.get(tree.root).key, "");
        assert_eq!(tree.children(tree.root).count(), 2);
        let a = tree.child_by_key(tree.root, "a").unwrap();
        assert_eq!(tree.path(a), "/a");
    }

    #[test]
    fn rejects_malformed_record() {
        let err = load_node_dump("1\t0\tonly-three").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn skips_records_with_unknown_parent() {
        let dump = "1\t0\ttop\t1\t0\t0\n9\t7\torphan\t0\t1\t50\n";
        let tree = load_node_dump(dump).unwrap();
        assert_eq!(tree.len(), 2); // detached synthetic node + top
        assert_eq!(tree.get(tree.root).key, "top");
        assert!(!tree.has_children(tree.root));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(load_node_dump("").is_err());
    }
}
