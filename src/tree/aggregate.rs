use compact_str::CompactString;

use super::arena::{HierNode, HierTree, NodeId, METRIC_SLOTS};

/// Compute aggregated metrics for all container nodes (bottom-up).
/// After this, every slot of a container's `metrics` equals the sum of the
/// same slot over all descendant leaves.
pub fn aggregate_metrics(tree: &mut HierTree) {
    // Process nodes in reverse order (children before parents) since
    // children always have higher indices than their parents in our arena.
    // This is guaranteed by the add_child insertion order.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];
        if node.first_child.is_none() {
            continue;
        }

        // Sum up all direct children
        let mut totals = [0.0; METRIC_SLOTS];
        let mut child = node.first_child;
        while let Some(child_id) = child {
            let c = &tree.nodes[child_id.index()];
            for (total, value) in totals.iter_mut().zip(c.metrics.iter()) {
                *total += value;
            }
            child = c.next_sibling;
        }
        tree.nodes[i].metrics = totals;
    }
}

/// For every internal node whose own size metric exceeds the sum of its
/// children's, add an `"others"` leaf holding the remainder.
///
/// Report formats for chip hierarchies state a module's total including
/// logic that belongs to the module itself rather than to any child; without
/// the residual leaf that area would silently vanish from the map. Must run
/// before `aggregate_metrics` while parent totals are still the imported ones.
pub fn synthesize_residual(tree: &mut HierTree) {
    let len = tree.nodes.len();
    for i in 0..len {
        let node = &tree.nodes[i];
        if node.first_child.is_none() {
            continue;
        }

        let mut child_sum = 0.0;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            let c = &tree.nodes[child_id.index()];
            child_sum += c.metrics[0];
            child = c.next_sibling;
        }

        let remaining = node.metrics[0] - child_sum;
        if remaining > 0.0 {
            let mut metrics = [0.0; METRIC_SLOTS];
            metrics[0] = remaining;
            tree.add_child(
                NodeId(i as u32),
                HierNode {
                    key: CompactString::new("others"),
                    metrics,
                    is_dir: false,
                    parent: None,
                    first_child: None,
                    next_sibling: None,
                    depth: 0,
                },
            );
        }
    }
}
