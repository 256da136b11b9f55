//! Wire model of a stored flow graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored flow: nodes plus directed edges. Loop/condition nesting is not
/// expressed through edges; it arrives pre-expanded on the node payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,

    #[serde(default)]
    pub edges: Vec<FlowEdge>,
}

/// One graph node as the editor persists it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,

    /// Editor node kind; used as the action tag when `data.actionType` is absent.
    #[serde(rename = "type", default)]
    pub node_type: String,

    #[serde(default)]
    pub data: NodeData,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, Value>>,
}

/// Directed dependency: `source` must run before `target`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
}

impl FlowNode {
    /// Effective action tag of this node.
    pub fn action_tag(&self) -> &str {
        self.data
            .action_type
            .as_deref()
            .filter(|tag| !tag.is_empty())
            .unwrap_or(&self.node_type)
    }
}
