use crate::graph::{ArcId, GraphState, NodeId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("node index {node} is out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("arc index {arc} is out of range (graph has {arc_count} arcs)")]
    ArcOutOfRange { arc: ArcId, arc_count: usize },

    #[error("no arc from node {from} to node {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("negative capacity for {what} {index}")]
    NegativeCapacity { what: &'static str, index: usize },

    #[error("capacity decrease on arc {arc} exceeds the capacity of the arc pair")]
    CapacityUnderflow { arc: ArcId },

    #[error("capacity overflow: {context}")]
    CapacityOverflow { context: &'static str },

    #[error("`{op}` is not allowed while the graph is {state:?}")]
    InvalidState { op: &'static str, state: GraphState },
}
