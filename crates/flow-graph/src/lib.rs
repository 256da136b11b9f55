//! Flow graph model and normalization.
//!
//! The calling system stores a flow as free-form nodes and edges; the engine
//! consumes a flat, edge-consistent step sequence. `normalize` bridges the
//! two with Kahn's algorithm.

pub mod model;
pub mod normalize;

pub use model::{FlowEdge, FlowGraph, FlowNode, NodeData};
pub use normalize::normalize;
