use std::collections::HashMap;

use compact_str::CompactString;

use super::{Rect, WIDTH_SPLIT_BIAS};
use crate::tree::{HierTree, NodeId};

/// Ephemeral binary tree describing how one node's children are paired for
/// recursive rectangle splitting. Built fresh per (node, metric) and thrown
/// away once its rectangles are cached.
#[derive(Debug)]
pub enum DivNode {
    Leaf {
        key: CompactString,
        size: f64,
        node: NodeId,
    },
    Split {
        size: f64,
        left: Box<DivNode>,
        right: Box<DivNode>,
    },
}

impl DivNode {
    pub fn size(&self) -> f64 {
        match self {
            DivNode::Leaf { size, .. } | DivNode::Split { size, .. } => *size,
        }
    }
}

/// Build the division tree for a node's children under the given metric.
///
/// Children with metric <= 0 are dropped up front: they would get zero-area
/// tiles and make the split ratio degenerate. Survivors are sorted by metric
/// descending (stable, so equal metrics keep child order) and then split by
/// an online greedy balance: walk the sorted list and append each item to
/// whichever half currently has the smaller running sum. This is a heuristic,
/// not an optimal partition; it keeps the two halves close enough in weight
/// that tile aspect ratios stay reasonable.
///
/// Returns `None` when no child survives the filter.
pub fn build(tree: &HierTree, parent: NodeId, metric_index: usize) -> Option<DivNode> {
    let mut survivors: Vec<NodeId> = tree
        .children(parent)
        .filter(|&id| tree.metric(id, metric_index) > 0.0)
        .collect();
    if survivors.is_empty() {
        return None;
    }

    survivors.sort_by(|&a, &b| {
        tree.metric(b, metric_index)
            .partial_cmp(&tree.metric(a, metric_index))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Some(build_node(tree, &survivors, metric_index))
}

fn build_node(tree: &HierTree, ids: &[NodeId], metric_index: usize) -> DivNode {
    if ids.len() == 1 {
        let id = ids[0];
        return DivNode::Leaf {
            key: tree.get(id).key.clone(),
            size: tree.metric(id, metric_index),
            node: id,
        };
    }

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut left_size = 0.0;
    let mut right_size = 0.0;

    // ids are sorted descending; ties (including the first item) go right
    for &id in ids {
        if left_size < right_size {
            left.push(id);
            left_size += tree.metric(id, metric_index);
        } else {
            right.push(id);
            right_size += tree.metric(id, metric_index);
        }
    }

    DivNode::Split {
        size: left_size + right_size,
        left: Box::new(build_node(tree, &left, metric_index)),
        right: Box::new(build_node(tree, &right, metric_index)),
    }
}

/// Recursively carve `rect` according to the division tree, writing one
/// rectangle per leaf key into `out`. The two halves of every split share the
/// full input rectangle and their areas are in `left.size : right.size`.
pub fn divide(div: &DivNode, rect: Rect, out: &mut HashMap<CompactString, Rect>) {
    match div {
        DivNode::Leaf { key, .. } => {
            out.insert(key.clone(), rect);
        }
        DivNode::Split { left, right, .. } => {
            let width = rect.width();
            let height = rect.height();
            let ratio = left.size() / (left.size() + right.size());

            // Split the longer side, preferring width while slightly below
            // square so labels keep vertical room
            let (a, b) = if width * WIDTH_SPLIT_BIAS > height {
                let x = rect.left + width * ratio;
                (
                    Rect::new(rect.left, rect.top, x, rect.bottom),
                    Rect::new(x, rect.top, rect.right, rect.bottom),
                )
            } else {
                let y = rect.top + height * ratio;
                (
                    Rect::new(rect.left, rect.top, rect.right, y),
                    Rect::new(rect.left, y, rect.right, rect.bottom),
                )
            };

            divide(left, a, out);
            divide(right, b, out);
        }
    }
}
