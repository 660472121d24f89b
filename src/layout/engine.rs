use compact_str::CompactString;

use super::cache::LayoutCache;
use super::{Margin, Point, Rect, CULL_ENTRY_LIMIT, CULL_MIN_SIZE, EXPAND_MIN_SIZE, MAX_LEVELS};
use crate::tree::{HierTree, NodeId};

/// One render-ready tile: a node's absolute, viewport-relative rectangle.
#[derive(Debug, Clone)]
pub struct AreaEntry {
    pub key: CompactString,
    pub rect: Rect,
    /// Nesting level in this frame's traversal (root = 0)
    pub level: u16,
    pub node: NodeId,
    /// Render-leaf flag: true when this tile was not expanded further, even
    /// if the node has real children (too small, or culled)
    pub is_leaf: bool,
}

/// The treemap layout engine.
///
/// Converts a weighted tree into the flat list of tiles visible in a
/// viewport, memoizing child partitions across frames in a [`LayoutCache`],
/// and answers point and visibility queries against that state. One instance
/// per displayed map; all calls are synchronous on the caller's thread.
#[derive(Debug, Default)]
pub struct TreeMap {
    cache: LayoutCache,
    /// Tiles produced by the last `layout` call, kept for point queries
    areas: Vec<AreaEntry>,
    root: Option<NodeId>,
}

impl TreeMap {
    pub fn new() -> Self {
        TreeMap {
            cache: LayoutCache::new(),
            areas: Vec::new(),
            root: None,
        }
    }

    /// Drop all cached state. Callers invoke this when a new tree is loaded
    /// or the displayed root changes; cache keys are path strings and do not
    /// distinguish roots on their own.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.areas.clear();
        self.root = None;
    }

    /// How many child partitions have been computed so far (diagnostics).
    pub fn cache_rebuilds(&self) -> u64 {
        self.cache.rebuilds()
    }

    /// Compute the flat list of visible tiles for one frame.
    ///
    /// The virtual canvas is `virt_w x virt_h` layout units (zoom-scaled),
    /// `viewport` is the visible window in the same space, and `margin` is
    /// the per-level inset reserving border and label room. Tiles are
    /// expanded breadth-first so each level can be culled against the
    /// viewport and the size thresholds before the next is attempted.
    /// Returned rectangles are viewport-relative; the list is retained for
    /// `node_at` until the next call.
    pub fn layout(
        &mut self,
        tree: &HierTree,
        root: NodeId,
        virt_w: f64,
        virt_h: f64,
        viewport: Rect,
        margin: Margin,
        metric_index: usize,
    ) -> &[AreaEntry] {
        self.root = Some(root);
        let aspect = virt_w / virt_h;

        let mut whole = vec![AreaEntry {
            key: tree.get(root).key.clone(),
            rect: Rect::new(0.0, 0.0, virt_w, virt_h),
            level: 0,
            node: root,
            // provisional; flipped if this tile expands below
            is_leaf: true,
        }];
        let mut current: Vec<usize> = vec![0];

        for level in 1..MAX_LEVELS {
            let mut next: Vec<usize> = Vec::new();

            for &idx in &current {
                let node = whole[idx].node;
                if !tree.has_children(node) {
                    continue;
                }

                let inner = margin.apply(&whole[idx].rect);
                if inner.width() <= EXPAND_MIN_SIZE || inner.height() <= EXPAND_MIN_SIZE {
                    continue;
                }

                // Expanding, so this tile is no longer a render-leaf
                whole[idx].is_leaf = false;

                let entry = self.cache.get_or_build(tree, node, aspect, metric_index);
                let Some(areas) = entry.areas.as_ref() else {
                    continue;
                };

                let w = inner.width();
                let h = inner.height();
                for (key, ar) in areas {
                    let rect = Rect::new(
                        inner.left + ar.left * w,
                        inner.top + ar.top * h,
                        inner.left + ar.right * w,
                        inner.top + ar.bottom * h,
                    );

                    // Outside the viewport: neither drawn nor descended into
                    if !rect.intersects(&viewport) {
                        continue;
                    }
                    // Progressive detail cull on huge trees
                    if whole.len() > CULL_ENTRY_LIMIT
                        && rect.width() < CULL_MIN_SIZE
                        && rect.height() < CULL_MIN_SIZE
                    {
                        continue;
                    }

                    let Some(child) = tree.child_by_key(node, key) else {
                        continue;
                    };
                    next.push(whole.len());
                    whole.push(AreaEntry {
                        key: key.clone(),
                        rect,
                        level,
                        node: child,
                        is_leaf: true,
                    });
                }
            }

            if next.is_empty() {
                break;
            }
            current = next;
        }

        for entry in &mut whole {
            entry.rect = entry.rect.translate(-viewport.left, -viewport.top);
        }

        tracing::debug!(
            "layout: {} tiles, {} partition rebuilds total",
            whole.len(),
            self.cache.rebuilds()
        );

        self.areas = whole;
        &self.areas
    }

    /// The node under a viewport-relative point.
    ///
    /// Scans the last frame's tiles in reverse, so the deepest (topmost
    /// drawn) tile wins. Points outside every tile resolve to the traversal
    /// root; `None` only before the first `layout` call.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        for entry in self.areas.iter().rev() {
            if entry.rect.contains_point(point) {
                return Some(entry.node);
            }
        }
        self.root
    }

    /// Slash-joined path from the tree root to `node`.
    pub fn path_of(&self, tree: &HierTree, node: NodeId) -> String {
        tree.path(node)
    }

    /// Path of the node under a viewport-relative point.
    pub fn path_at(&self, tree: &HierTree, point: Point) -> Option<String> {
        self.node_at(point).map(|node| tree.path(node))
    }

    /// Whether `node` would be visible in the given viewport, computed from
    /// the cache alone so it works for nodes absent from the last frame's
    /// tile list (small, culled, or off-screen).
    ///
    /// Walks the ancestor chain from the node's true root, shrinking a
    /// running rectangle by each level's cached normalized areas. Fully
    /// contained ancestors short-circuit to visible; disjoint ancestors and
    /// children filtered for non-positive size short-circuit to not visible.
    pub fn is_node_in_view(
        &mut self,
        tree: &HierTree,
        node: NodeId,
        virt_w: f64,
        virt_h: f64,
        viewport: Rect,
    ) -> bool {
        let mut root = node;
        while let Some(parent) = tree.get(root).parent {
            root = parent;
        }

        let mut rect = Rect::new(0.0, 0.0, virt_w, virt_h);
        if node == root {
            return rect.intersects(&viewport);
        }

        // Ancestor chain, root side first (root itself excluded)
        let mut chain = Vec::new();
        let mut cur = node;
        while cur != root {
            chain.push(cur);
            match tree.get(cur).parent {
                Some(parent) => cur = parent,
                None => return false,
            }
        }
        chain.reverse();

        let aspect = virt_w / virt_h;
        let metric_index = self.cache.metric_index();
        let mut parent = root;
        for &child in &chain {
            if !rect.intersects(&viewport) {
                return false;
            }
            if viewport.contains_rect(&rect) {
                return true;
            }

            let entry = self.cache.get_or_build(tree, parent, aspect, metric_index);
            let Some(areas) = entry.areas.as_ref() else {
                return false;
            };
            // No cached area means the child was filtered out (size <= 0)
            let Some(ar) = areas.get(tree.get(child).key.as_str()) else {
                return false;
            };

            let w = rect.width();
            let h = rect.height();
            rect = Rect::new(
                rect.left + ar.left * w,
                rect.top + ar.top * h,
                rect.left + ar.right * w,
                rect.top + ar.bottom * h,
            );
            parent = child;
        }

        rect.intersects(&viewport)
    }
}
