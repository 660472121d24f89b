//! The weighted hierarchy read by the layout engine.
//!
//! Nodes live in a flat arena ([`arena::HierTree`]); parents own children
//! through the arena rather than through pointers, so ancestor walks are O(1)
//! per step and the structure cannot form ownership cycles. The tree is built
//! once per load by an importer ([`import`]) and finalized by the upstream
//! mutation passes in [`aggregate`]; the layout engine only ever reads it.

pub mod aggregate;
pub mod arena;
pub mod import;

pub use arena::{HierNode, HierTree, NodeId, METRIC_SLOTS};
