// Public library interface for hiermap
// Renderers and UI layers consume the layout engine through these exports

pub mod layout;
pub mod tree;

pub use layout::{AreaEntry, Margin, Point, Rect, TreeMap};
pub use tree::{HierNode, HierTree, NodeId, METRIC_SLOTS};
