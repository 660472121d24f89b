use compact_str::CompactString;

/// Number of numeric metric slots per node. Slot 0 is the canonical size
/// metric that drives layout and sorting; slot 1 is an element count.
/// Which slot drives tile size is chosen per layout call by index.
pub const METRIC_SLOTS: usize = 2;

/// Index into the arena `Vec<HierNode>`. Uses u32 to save memory (supports up to ~4 billion nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node in the weighted hierarchy, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct HierNode {
    /// Node name (not full path)
    pub key: CompactString,
    /// Numeric attributes. For leaves: as imported. For internal nodes:
    /// aggregated sums of children (see `aggregate`).
    pub metrics: [f64; METRIC_SLOTS],
    /// Whether the source marked this node as a container (a directory,
    /// a module instance). Independent of whether children are present.
    pub is_dir: bool,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for leaves)
    pub first_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
}

/// The weighted tree stored as a flat arena of nodes.
///
/// Children always have higher arena indices than their parents, so the
/// structure is acyclic by construction and bottom-up passes can run in
/// reverse index order.
#[derive(Debug)]
pub struct HierTree {
    /// All nodes in contiguous memory
    pub nodes: Vec<HierNode>,
    /// Root node index
    pub root: NodeId,
}

impl HierTree {
    /// Create an empty tree with a root node.
    pub fn new(root_key: &str) -> Self {
        let root_node = HierNode {
            key: CompactString::new(root_key),
            metrics: [0.0; METRIC_SLOTS],
            is_dir: true,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
        };

        HierTree {
            nodes: vec![root_node],
            root: NodeId(0),
        }
    }

    /// Add a child node under the given parent. Returns the new node's ID.
    pub fn add_child(&mut self, parent: NodeId, mut node: HierNode) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.depth = self.nodes[parent.index()].depth + 1;

        // Prepend to parent's child list (O(1))
        node.next_sibling = self.nodes[parent.index()].first_child;
        self.nodes[parent.index()].first_child = Some(new_id);

        self.nodes.push(node);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &HierNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut HierNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (only root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// Whether a node has at least one child.
    pub fn has_children(&self, id: NodeId) -> bool {
        self.nodes[id.index()].first_child.is_some()
    }

    /// Find a direct child by key.
    pub fn child_by_key(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.children(parent).find(|&id| self.get(id).key == key)
    }

    /// The selected metric of a node. An out-of-range index falls back to
    /// slot 0, the canonical size metric (contract with the importer).
    pub fn metric(&self, id: NodeId, index: usize) -> f64 {
        let node = self.get(id);
        node.metrics[if index < METRIC_SLOTS { index } else { 0 }]
    }

    /// Build the full path of a node by walking up the tree, root included.
    /// Used as the layout-cache key and surfaced by the engine's `path_of`.
    pub fn path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);

        while let Some(cur) = current {
            let node = self.get(cur);
            parts.push(node.key.to_string());
            current = node.parent;
        }

        parts.reverse();
        parts.join("/")
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a HierTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}
