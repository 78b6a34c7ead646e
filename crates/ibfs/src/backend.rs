//! Backend-neutral construction and query surface.

use crate::error::Result;
use crate::graph::{Capacity, GraphState, IbfsGraph, NodeId};

/// A max-flow / min-cut solver over a graph with per-node terminal capacities.
///
/// Callers build the graph once (`init_size`, then any number of `add_node` / `add_edge`), solve,
/// and read the partition back per node.
pub trait MaxFlow {
    fn init_size(&mut self, node_count: usize, arc_count_estimate: usize) -> Result<()>;

    fn add_node(&mut self, node: NodeId, cap_source: Capacity, cap_sink: Capacity) -> Result<()>;

    fn add_edge(&mut self, u: NodeId, v: NodeId, cap: Capacity, rev_cap: Capacity) -> Result<()>;

    /// Returns the maximum flow value (equal to the minimum cut capacity).
    fn compute_max_flow(&mut self) -> Result<Capacity>;

    /// Side of the minimum cut containing `node`; nodes that can reach neither terminal get
    /// `default_if_free`.
    fn is_node_on_src_side(&self, node: NodeId, default_if_free: bool) -> bool;
}

impl MaxFlow for IbfsGraph {
    fn init_size(&mut self, node_count: usize, arc_count_estimate: usize) -> Result<()> {
        IbfsGraph::init_size(self, node_count, arc_count_estimate)
    }

    fn add_node(&mut self, node: NodeId, cap_source: Capacity, cap_sink: Capacity) -> Result<()> {
        IbfsGraph::add_node(self, node, cap_source, cap_sink)
    }

    fn add_edge(&mut self, u: NodeId, v: NodeId, cap: Capacity, rev_cap: Capacity) -> Result<()> {
        IbfsGraph::add_edge(self, u, v, cap, rev_cap)
    }

    /// Finalizes the staged graph first when the caller has not done so.
    fn compute_max_flow(&mut self) -> Result<Capacity> {
        if self.state() == GraphState::Sized {
            self.init_graph()?;
        }
        IbfsGraph::compute_max_flow(self)
    }

    fn is_node_on_src_side(&self, node: NodeId, default_if_free: bool) -> bool {
        IbfsGraph::is_node_on_src_side(self, node, default_if_free)
    }
}
