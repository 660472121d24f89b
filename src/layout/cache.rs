use std::collections::HashMap;

use compact_str::CompactString;

use super::division;
use super::{Rect, ASPECT_HYSTERESIS};
use crate::tree::{HierTree, NodeId};

/// Cached partition of one node's children.
///
/// `base` is the local coordinate frame the partition was computed in
/// (width = aspect ratio at the top level, the child tile's own proportions
/// below). `areas` stays `None` until first needed, then holds each surviving
/// child's rectangle normalized to the unit square.
#[derive(Debug)]
pub struct CacheEntry {
    pub base: Rect,
    pub areas: Option<HashMap<CompactString, Rect>>,
}

/// Memo of child partitions keyed by the full slash-joined path from the root
/// to each node. Valid only for one (aspect ratio, metric index) pair, which
/// is tracked cache-wide: drifting past `ASPECT_HYSTERESIS` or switching
/// metric discards everything. Owners must also call `clear()` when a new
/// tree is loaded or the displayed root changes, since path keys do not
/// distinguish roots.
#[derive(Debug)]
pub struct LayoutCache {
    entries: HashMap<String, CacheEntry>,
    aspect: f64,
    metric_index: usize,
    rebuilds: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        LayoutCache {
            entries: HashMap::new(),
            aspect: 1.0,
            metric_index: 0,
            rebuilds: 0,
        }
    }

    /// Drop every cached partition.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The metric index the cached partitions were computed under.
    pub fn metric_index(&self) -> usize {
        self.metric_index
    }

    /// How many partitions have been computed since construction. Lets tests
    /// and the debug CLI observe cache hits across frames.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Fetch the partition of `node`'s children, computing and caching it if
    /// needed.
    ///
    /// On a fresh path the entry is seeded with `base = (0, 0, aspect, 1)`;
    /// when the partition is computed, every surviving child's entry is
    /// seeded too with its own tile proportions as `base`, so descending one
    /// level starts from a correctly shaped frame without recomputing aspect.
    pub fn get_or_build(
        &mut self,
        tree: &HierTree,
        node: NodeId,
        aspect: f64,
        metric_index: usize,
    ) -> &CacheEntry {
        if (aspect - self.aspect).abs() > ASPECT_HYSTERESIS {
            self.entries.clear();
        }
        self.aspect = aspect;

        if metric_index != self.metric_index {
            self.metric_index = metric_index;
            self.entries.clear();
        }

        let path = tree.path(node);
        self.entries
            .entry(path.clone())
            .or_insert_with(|| CacheEntry {
                base: Rect::new(0.0, 0.0, aspect, 1.0),
                areas: None,
            });

        if self.entries[&path].areas.is_none() {
            let base = self.entries[&path].base;

            let mut raw: HashMap<CompactString, Rect> = HashMap::new();
            if let Some(div) = division::build(tree, node, metric_index) {
                division::divide(&div, base, &mut raw);
            }

            // Two-level look-ahead: hand each child its tile proportions
            for (key, r) in &raw {
                let child_path = format!("{path}/{key}");
                self.entries.insert(
                    child_path,
                    CacheEntry {
                        base: Rect::new(0.0, 0.0, r.width(), r.height()),
                        areas: None,
                    },
                );
            }

            // Normalize to the unit square before storing
            let w = base.width();
            let h = base.height();
            let areas = raw
                .into_iter()
                .map(|(key, r)| {
                    (
                        key,
                        Rect::new(r.left / w, r.top / h, r.right / w, r.bottom / h),
                    )
                })
                .collect();

            let entry = self.entries.get_mut(&path).unwrap();
            entry.areas = Some(areas);
            self.rebuilds += 1;
        }

        &self.entries[&path]
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::HierNode;

    fn tree_with_children(sizes: &[(&str, f64)]) -> HierTree {
        let mut tree = HierTree::new("root");
        for &(key, size) in sizes {
            tree.add_child(
                tree.root,
                HierNode {
                    key: CompactString::new(key),
                    metrics: [size, 1.0],
                    is_dir: false,
                    parent: None,
                    first_child: None,
                    next_sibling: None,
                    depth: 0,
                },
            );
        }
        tree
    }

    #[test]
    fn areas_are_normalized_to_unit_square() {
        let tree = tree_with_children(&[("a", 1.0), ("b", 3.0)]);
        let mut cache = LayoutCache::new();
        let entry = cache.get_or_build(&tree, tree.root, 2.0, 0);

        let areas = entry.areas.as_ref().unwrap();
        assert_eq!(areas.len(), 2);
        for r in areas.values() {
            assert!(r.left >= 0.0 && r.top >= 0.0 && r.right <= 1.0 + 1e-9 && r.bottom <= 1.0 + 1e-9);
        }
        let total: f64 = areas.values().map(Rect::area).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let tree = tree_with_children(&[("a", 1.0), ("b", 3.0)]);
        let mut cache = LayoutCache::new();
        cache.get_or_build(&tree, tree.root, 1.0, 0);
        let rebuilds = cache.rebuilds();
        cache.get_or_build(&tree, tree.root, 1.0, 0);
        assert_eq!(cache.rebuilds(), rebuilds);
    }

    #[test]
    fn small_aspect_drift_keeps_cache_large_drift_discards() {
        let tree = tree_with_children(&[("a", 1.0), ("b", 3.0)]);
        let mut cache = LayoutCache::new();
        cache.get_or_build(&tree, tree.root, 1.0, 0);
        let rebuilds = cache.rebuilds();

        cache.get_or_build(&tree, tree.root, 1.05, 0);
        assert_eq!(cache.rebuilds(), rebuilds, "within hysteresis");

        cache.get_or_build(&tree, tree.root, 1.3, 0);
        assert_eq!(cache.rebuilds(), rebuilds + 1, "past hysteresis");
    }

    #[test]
    fn metric_change_discards_cache() {
        let tree = tree_with_children(&[("a", 1.0), ("b", 3.0)]);
        let mut cache = LayoutCache::new();
        cache.get_or_build(&tree, tree.root, 1.0, 0);
        let rebuilds = cache.rebuilds();
        cache.get_or_build(&tree, tree.root, 1.0, 1);
        assert_eq!(cache.rebuilds(), rebuilds + 1);
        assert_eq!(cache.metric_index(), 1);
    }

    #[test]
    fn children_are_seeded_with_their_proportions() {
        let mut tree = tree_with_children(&[("a", 1.0), ("b", 3.0)]);
        let a = tree.child_by_key(tree.root, "a").unwrap();
        tree.add_child(
            a,
            HierNode {
                key: CompactString::new("x"),
                metrics: [1.0, 1.0],
                is_dir: false,
                parent: None,
                first_child: None,
                next_sibling: None,
                depth: 0,
            },
        );

        let mut cache = LayoutCache::new();
        let norm_a = {
            let entry = cache.get_or_build(&tree, tree.root, 1.0, 0);
            entry.areas.as_ref().unwrap()[&CompactString::new("a")]
        };

        // The child's seeded base matches its tile shape in the unit frame
        let child = cache.get_or_build(&tree, a, 1.0, 0);
        assert!((child.base.width() - norm_a.width()).abs() < 1e-9);
        assert!((child.base.height() - norm_a.height()).abs() < 1e-9);
    }

    #[test]
    fn zero_survivor_node_caches_empty_areas() {
        let tree = tree_with_children(&[("a", 0.0)]);
        let mut cache = LayoutCache::new();
        let entry = cache.get_or_build(&tree, tree.root, 1.0, 0);
        assert!(entry.areas.as_ref().unwrap().is_empty());
    }
}
