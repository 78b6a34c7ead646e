//! Dinic's blocking-flow algorithm behind the same [`MaxFlow`] contract.
//!
//! Terminal capacities become explicit arcs from a virtual source and to a virtual sink. The
//! reported partition is the minimal source side: nodes reachable from the source in the final
//! residual graph. Nodes that can still reach the sink are on the sink side, the rest are free.

use std::collections::VecDeque;

use crate::backend::MaxFlow;
use crate::error::{Error, Result};
use crate::graph::{Capacity, GraphState, NodeId};

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    cap: Capacity,
    rev: usize,
}

#[derive(Debug, Clone)]
pub struct DinicGraph {
    state: GraphState,
    excess: Vec<Capacity>,
    /// Flow already settled by overlapping terminal capacities.
    base_flow: Capacity,
    edges: Vec<(NodeId, NodeId, Capacity, Capacity)>,
    side: Vec<Option<bool>>,
}

impl Default for DinicGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DinicGraph {
    pub fn new() -> Self {
        Self {
            state: GraphState::Uninitialized,
            excess: Vec::new(),
            base_flow: 0,
            edges: Vec::new(),
            side: Vec::new(),
        }
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node < self.excess.len() {
            Ok(())
        } else {
            Err(Error::NodeOutOfRange {
                node,
                node_count: self.excess.len(),
            })
        }
    }

    fn check_building(&self, op: &'static str) -> Result<()> {
        match self.state {
            GraphState::Sized => Ok(()),
            state => Err(Error::InvalidState { op, state }),
        }
    }

    fn build_network(&self) -> (Vec<Vec<Edge>>, usize, usize) {
        let n = self.excess.len();
        let (source, sink) = (n, n + 1);
        let mut adj: Vec<Vec<Edge>> = vec![Vec::new(); n + 2];
        for &(u, v, cap, rev_cap) in &self.edges {
            link(&mut adj, u, v, cap, rev_cap);
        }
        for (v, &e) in self.excess.iter().enumerate() {
            if e > 0 {
                link(&mut adj, source, v, e, 0);
            } else if e < 0 {
                link(&mut adj, v, sink, -e, 0);
            }
        }
        (adj, source, sink)
    }
}

fn link(adj: &mut [Vec<Edge>], u: usize, v: usize, cap: Capacity, rev_cap: Capacity) {
    let ru = adj[v].len();
    let rv = adj[u].len();
    adj[u].push(Edge { to: v, cap, rev: ru });
    adj[v].push(Edge {
        to: u,
        cap: rev_cap,
        rev: rv,
    });
}

fn bfs_levels(adj: &[Vec<Edge>], source: usize, level: &mut [i32]) {
    level.fill(-1);
    level[source] = 0;
    let mut queue = VecDeque::from([source]);
    while let Some(u) = queue.pop_front() {
        for e in &adj[u] {
            if e.cap > 0 && level[e.to] < 0 {
                level[e.to] = level[u] + 1;
                queue.push_back(e.to);
            }
        }
    }
}

/// Saturates the level graph with shortest augmenting paths. The walk is iterative so long grid
/// paths cannot exhaust the call stack.
fn blocking_flow(adj: &mut [Vec<Edge>], source: usize, sink: usize, level: &[i32]) -> Capacity {
    let mut iter = vec![0usize; adj.len()];
    let mut path: Vec<(usize, usize)> = Vec::new();
    let mut total = 0;
    let mut u = source;
    loop {
        if u == sink {
            let push = path
                .iter()
                .map(|&(v, i)| adj[v][i].cap)
                .min()
                .unwrap_or(0);
            for &(v, i) in &path {
                let Edge { to, rev, .. } = adj[v][i];
                adj[v][i].cap -= push;
                adj[to][rev].cap += push;
            }
            total += push;
            path.clear();
            u = source;
            continue;
        }

        let mut advanced = false;
        while iter[u] < adj[u].len() {
            let e = adj[u][iter[u]];
            if e.cap > 0 && level[e.to] == level[u] + 1 {
                path.push((u, iter[u]));
                u = e.to;
                advanced = true;
                break;
            }
            iter[u] += 1;
        }
        if !advanced {
            match path.pop() {
                Some((prev, i)) => {
                    // Dead end: never enter `u` again in this phase.
                    debug_assert_eq!(adj[prev][i].to, u);
                    iter[prev] += 1;
                    u = prev;
                }
                None => return total,
            }
        }
    }
}

impl MaxFlow for DinicGraph {
    fn init_size(&mut self, node_count: usize, arc_count_estimate: usize) -> Result<()> {
        self.excess = vec![0; node_count];
        self.base_flow = 0;
        self.edges = Vec::with_capacity(arc_count_estimate);
        self.side = Vec::new();
        self.state = GraphState::Sized;
        Ok(())
    }

    fn add_node(&mut self, node: NodeId, cap_source: Capacity, cap_sink: Capacity) -> Result<()> {
        self.check_building("add_node")?;
        self.check_node(node)?;
        let e = self.excess[node];
        let overflow = || Error::CapacityOverflow {
            context: "terminal capacity",
        };
        let source = cap_source.checked_add(e.max(0)).ok_or_else(overflow)?;
        let sink = cap_sink.checked_add((-e).max(0)).ok_or_else(overflow)?;
        if source < 0 || sink < 0 {
            return Err(Error::NegativeCapacity {
                what: "terminal capacity of node",
                index: node,
            });
        }
        self.base_flow = self
            .base_flow
            .checked_add(source.min(sink))
            .ok_or(Error::CapacityOverflow { context: "flow" })?;
        self.excess[node] = source - sink;
        Ok(())
    }

    fn add_edge(&mut self, u: NodeId, v: NodeId, cap: Capacity, rev_cap: Capacity) -> Result<()> {
        self.check_building("add_edge")?;
        self.check_node(u)?;
        self.check_node(v)?;
        if cap < 0 || rev_cap < 0 {
            return Err(Error::NegativeCapacity {
                what: "edge",
                index: self.edges.len(),
            });
        }
        if u != v {
            self.edges.push((u, v, cap, rev_cap));
        }
        Ok(())
    }

    fn compute_max_flow(&mut self) -> Result<Capacity> {
        match self.state {
            GraphState::Sized | GraphState::Populated | GraphState::Solved => {}
            state => {
                return Err(Error::InvalidState {
                    op: "compute_max_flow",
                    state,
                });
            }
        }
        let bound = self
            .excess
            .iter()
            .filter(|&&e| e > 0)
            .try_fold(self.base_flow, |acc, &e| acc.checked_add(e));
        if bound.is_none() {
            return Err(Error::CapacityOverflow {
                context: "total flow bound",
            });
        }

        let (mut adj, source, sink) = self.build_network();
        let mut level = vec![-1i32; adj.len()];
        let mut flow = self.base_flow;
        let mut phases = 0u32;
        loop {
            bfs_levels(&adj, source, &mut level);
            if level[sink] < 0 {
                break;
            }
            flow += blocking_flow(&mut adj, source, sink, &level);
            phases += 1;
        }

        // `level` now marks the residual-reachable set of the source.
        let n = self.excess.len();
        let mut reaches_sink = vec![false; adj.len()];
        reaches_sink[sink] = true;
        let mut queue = VecDeque::from([sink]);
        while let Some(v) = queue.pop_front() {
            for e in &adj[v] {
                // `e` is v -> u; u reaches v when the paired u -> v arc is residual.
                if !reaches_sink[e.to] && adj[e.to][e.rev].cap > 0 {
                    reaches_sink[e.to] = true;
                    queue.push_back(e.to);
                }
            }
        }
        self.side = (0..n)
            .map(|v| {
                if level[v] >= 0 {
                    Some(true)
                } else if reaches_sink[v] {
                    Some(false)
                } else {
                    None
                }
            })
            .collect();
        self.state = GraphState::Solved;
        tracing::debug!(flow, phases, "dinic max flow computed");
        Ok(flow)
    }

    /// # Panics
    ///
    /// Panics if called before `compute_max_flow` or with `node` out of range.
    fn is_node_on_src_side(&self, node: NodeId, default_if_free: bool) -> bool {
        self.side[node].unwrap_or(default_if_free)
    }
}
