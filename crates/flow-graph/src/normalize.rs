//! Kahn ordering of a stored flow graph.

use std::collections::{HashMap, VecDeque};

use flowrunner_core_types::FlowStep;
use tracing::debug;

use crate::model::FlowGraph;

/// Orders a node/edge graph into an executable step sequence.
///
/// Kahn's algorithm: seed the queue with zero-in-degree nodes in
/// original-list order, dequeue from the front, decrement successors. Every
/// node reachable via zero-in-degree propagation appears exactly once,
/// before all of its successors.
///
/// Nodes that never reach zero in-degree (cycle members, or targets of edges
/// from ids absent from the node list) are silently excluded from the
/// output. That is the specified behavior of the stored-flow format, not an
/// error.
pub fn normalize(graph: &FlowGraph) -> Vec<FlowStep> {
    let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::with_capacity(graph.nodes.len());

    for node in &graph.nodes {
        in_degree.insert(node.id.as_str(), 0);
        adjacency.insert(node.id.as_str(), Vec::new());
    }
    for edge in &graph.edges {
        if let Some(neighbors) = adjacency.get_mut(edge.source.as_str()) {
            neighbors.push(edge.target.as_str());
        }
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let node_index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut queue: VecDeque<&str> = graph
        .nodes
        .iter()
        .filter(|node| in_degree.get(node.id.as_str()) == Some(&0))
        .map(|node| node.id.as_str())
        .collect();

    let mut steps = Vec::with_capacity(graph.nodes.len());
    while let Some(id) = queue.pop_front() {
        if let Some(&index) = node_index.get(id) {
            let node = &graph.nodes[index];
            steps.push(FlowStep {
                id: node.id.clone(),
                action_type: node.action_tag().to_string(),
                config: node.data.config.clone().unwrap_or_default(),
                children: Vec::new(),
                else_children: Vec::new(),
            });
        }
        for &next in adjacency.get(id).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    if steps.len() < graph.nodes.len() {
        debug!(
            dropped = graph.nodes.len() - steps.len(),
            "normalize excluded nodes that never reached zero in-degree"
        );
    }

    steps
}
