//! Capacity graph: node/arc arenas, staged construction and tree link bookkeeping.

use crate::buckets::{ActiveList, OrphanBuckets};
use crate::error::{Error, Result};
use crate::options::SolverOptions;
use crate::stats::SolverStats;
use crate::tree::{NodeLabel, Tree};

pub type Capacity = i64;
pub type NodeId = usize;
pub type ArcId = usize;

/// Stand-in for an unbounded capacity. Large enough to dominate any finite term built from
/// fixed-point energies, small enough that a million of them still sum inside `i64`.
pub const INFINITE_CAPACITY: Capacity = 1 << 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphState {
    Uninitialized,
    /// Storage reserved; accepting `add_node` / `add_edge`.
    Sized,
    /// Arcs compacted and trees seeded; ready to solve.
    Populated,
    Solved,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Arc {
    pub(crate) head: NodeId,
    pub(crate) rev: ArcId,
    pub(crate) rcap: Capacity,
    /// Mirrors `arcs[rev].rcap > 0`.
    pub(crate) rev_residual: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    /// Arc from this node toward its parent (the parent is the arc's head).
    pub(crate) parent: Option<ArcId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    /// Adoption resumes scanning here.
    pub(crate) current: ArcId,
    /// `> 0`: distance in the source tree, `< 0`: negated distance in the sink tree, `0`: free.
    pub(crate) label: i32,
    /// `> 0`: residual capacity from the source, `< 0`: negated residual capacity to the sink.
    pub(crate) excess: Capacity,
    /// Augmentation pass in which this node was last orphaned.
    pub(crate) last_aug: u32,
    pub(crate) perturbed: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            parent: None,
            first_child: None,
            next_sibling: None,
            prev_sibling: None,
            current: 0,
            label: 0,
            excess: 0,
            last_aug: 0,
            perturbed: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StagedEdge {
    tail: NodeId,
    head: NodeId,
    cap: Capacity,
    rev_cap: Capacity,
}

/// IBFS max-flow session.
///
/// Lifecycle: `init_size` → (`add_node` / `add_edge`)* → `init_graph` → `compute_max_flow`, then
/// optionally (`inc_node` / `inc_edge` / `inc_arc`)* → `compute_max_flow_incremental`, repeated.
/// A session is single-owner; all mutation goes through `&mut self`. Cloning snapshots the whole
/// session, trees included.
#[derive(Clone)]
pub struct IbfsGraph {
    pub(crate) options: SolverOptions,
    pub(crate) state: GraphState,

    pub(crate) nodes: Vec<Node>,
    /// Arcs of node `v` are `arc_start[v]..arc_start[v + 1]`.
    pub(crate) arc_start: Vec<ArcId>,
    pub(crate) arcs: Vec<Arc>,
    staged: Vec<StagedEdge>,

    pub(crate) flow: Capacity,

    /// Current frontier distance per tree, indexed by `Tree::index`.
    pub(crate) top: [i32; 2],
    /// Nodes at the frontier distance of each tree, waiting to be scanned.
    pub(crate) active: [ActiveList; 2],
    /// Nodes discovered one layer beyond the frontier during a growth pass.
    pub(crate) next: [ActiveList; 2],
    pub(crate) orphans: [OrphanBuckets; 2],
    /// Tree whose growth pass is in progress, if any.
    pub(crate) growing: Option<Tree>,

    pub(crate) aug_timestamp: u32,
    pub(crate) unique_orphans: u64,
    pub(crate) perturbed: Vec<NodeId>,

    pub(crate) stats: SolverStats,
}

impl IbfsGraph {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            options,
            state: GraphState::Uninitialized,
            nodes: Vec::new(),
            arc_start: Vec::new(),
            arcs: Vec::new(),
            staged: Vec::new(),
            flow: 0,
            top: [1, 1],
            active: [ActiveList::default(), ActiveList::default()],
            next: [ActiveList::default(), ActiveList::default()],
            orphans: [OrphanBuckets::default(), OrphanBuckets::default()],
            growing: None,
            aug_timestamp: 0,
            unique_orphans: 0,
            perturbed: Vec::new(),
            stats: SolverStats::default(),
        }
    }

    /// Reserves storage for `node_count` nodes and roughly `arc_count_estimate` edges, dropping
    /// any previous graph.
    pub fn init_size(&mut self, node_count: usize, arc_count_estimate: usize) -> Result<()> {
        if node_count >= i32::MAX as usize {
            return Err(Error::CapacityOverflow {
                context: "node count exceeds the label range",
            });
        }
        self.nodes = vec![Node::default(); node_count];
        self.arc_start = Vec::new();
        self.arcs = Vec::new();
        self.staged = Vec::with_capacity(arc_count_estimate);
        self.flow = 0;
        self.top = [1, 1];
        let frontier = (node_count / 8).max(16);
        self.active = [
            ActiveList::with_capacity(frontier),
            ActiveList::with_capacity(frontier),
        ];
        self.next = [
            ActiveList::with_capacity(frontier),
            ActiveList::with_capacity(frontier),
        ];
        self.orphans = [
            OrphanBuckets::new(node_count),
            OrphanBuckets::new(node_count),
        ];
        self.growing = None;
        self.aug_timestamp = 0;
        self.unique_orphans = 0;
        self.perturbed = Vec::new();
        self.stats = SolverStats::default();
        self.state = GraphState::Sized;
        Ok(())
    }

    /// Adds terminal capacities to node `node`.
    ///
    /// The overlap `min(cap_source, cap_sink)` (after folding in the node's current excess) can
    /// be routed straight through the node, so it is added to the flow immediately and only the
    /// difference is kept as excess. Negative arguments are accepted as long as they only cancel
    /// capacity the node already has on that side.
    pub fn add_node(&mut self, node: NodeId, cap_source: Capacity, cap_sink: Capacity) -> Result<()> {
        self.expect_state("add_node", &[GraphState::Sized])?;
        self.check_node(node)?;
        self.fold_terminal(node, cap_source, cap_sink)
    }

    pub(crate) fn fold_terminal(
        &mut self,
        node: NodeId,
        cap_source: Capacity,
        cap_sink: Capacity,
    ) -> Result<()> {
        let excess = self.nodes[node].excess;
        let overflow = || Error::CapacityOverflow {
            context: "terminal capacity",
        };
        let (source, sink) = if excess > 0 {
            (cap_source.checked_add(excess).ok_or_else(overflow)?, cap_sink)
        } else {
            (cap_source, cap_sink.checked_sub(excess).ok_or_else(overflow)?)
        };
        if source < 0 || sink < 0 {
            return Err(Error::NegativeCapacity {
                what: "terminal capacity of node",
                index: node,
            });
        }
        self.flow = self
            .flow
            .checked_add(source.min(sink))
            .ok_or(Error::CapacityOverflow { context: "flow" })?;
        self.nodes[node].excess = source - sink;
        Ok(())
    }

    /// Stages an arc pair `u -> v` (capacity `cap`) and `v -> u` (capacity `rev_cap`).
    ///
    /// Self-loops are accepted and dropped: they can never carry source-to-sink flow.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, cap: Capacity, rev_cap: Capacity) -> Result<()> {
        self.expect_state("add_edge", &[GraphState::Sized])?;
        self.check_node(u)?;
        self.check_node(v)?;
        if cap < 0 || rev_cap < 0 {
            return Err(Error::NegativeCapacity {
                what: "edge",
                index: self.staged.len(),
            });
        }
        if cap.checked_add(rev_cap).is_none() {
            return Err(Error::CapacityOverflow {
                context: "arc pair capacity",
            });
        }
        if u == v {
            return Ok(());
        }
        self.staged.push(StagedEdge {
            tail: u,
            head: v,
            cap,
            rev_cap,
        });
        Ok(())
    }

    /// Compacts the staged edges into a tail-grouped arc array and seeds both trees from the node
    /// excesses.
    pub fn init_graph(&mut self) -> Result<()> {
        self.expect_state("init_graph", &[GraphState::Sized])?;
        let n = self.nodes.len();

        let mut start = vec![0usize; n + 1];
        for e in &self.staged {
            start[e.tail + 1] += 1;
            start[e.head + 1] += 1;
        }
        for v in 0..n {
            start[v + 1] += start[v];
        }

        let placeholder = Arc {
            head: 0,
            rev: 0,
            rcap: 0,
            rev_residual: false,
        };
        let mut arcs = vec![placeholder; start[n]];
        let mut fill = start.clone();
        for e in self.staged.drain(..) {
            let a = fill[e.tail];
            fill[e.tail] += 1;
            let b = fill[e.head];
            fill[e.head] += 1;
            arcs[a] = Arc {
                head: e.head,
                rev: b,
                rcap: e.cap,
                rev_residual: e.rev_cap > 0,
            };
            arcs[b] = Arc {
                head: e.tail,
                rev: a,
                rcap: e.rev_cap,
                rev_residual: e.cap > 0,
            };
        }
        self.staged = Vec::new();
        self.arcs = arcs;
        self.arc_start = start;

        self.reset_trees();
        self.state = GraphState::Populated;
        tracing::debug!(
            nodes = n,
            arcs = self.arcs.len(),
            flow = self.flow,
            "ibfs graph initialized"
        );
        Ok(())
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Total flow routed so far (including terminal overlaps folded by `add_node`).
    pub fn flow(&self) -> Capacity {
        self.flow
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn node_label(&self, node: NodeId) -> NodeLabel {
        NodeLabel::from_raw(self.nodes[node].label)
    }

    /// Remaining terminal capacity of `node` (positive toward the source, negative toward the sink).
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn node_excess(&self, node: NodeId) -> Capacity {
        self.nodes[node].excess
    }

    /// Tree parent of `node`, if it is attached to one.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent.map(|a| self.arcs[a].head)
    }

    /// Arc ids leaving `node` (empty before `init_graph`).
    pub fn arcs_of(&self, node: NodeId) -> std::ops::Range<ArcId> {
        match (self.arc_start.get(node), self.arc_start.get(node + 1)) {
            (Some(&a), Some(&b)) => a..b,
            _ => 0..0,
        }
    }

    pub fn arc_head(&self, arc: ArcId) -> NodeId {
        self.arcs[arc].head
    }

    pub fn arc_tail(&self, arc: ArcId) -> NodeId {
        self.arcs[self.arcs[arc].rev].head
    }

    pub fn arc_reverse(&self, arc: ArcId) -> ArcId {
        self.arcs[arc].rev
    }

    pub fn arc_residual(&self, arc: ArcId) -> Capacity {
        self.arcs[arc].rcap
    }

    /// First arc from `from` to `to`.
    pub fn find_arc(&self, from: NodeId, to: NodeId) -> Option<ArcId> {
        self.arcs_of(from).find(|&a| self.arcs[a].head == to)
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<()> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::NodeOutOfRange {
                node,
                node_count: self.nodes.len(),
            })
        }
    }

    pub(crate) fn expect_state(&self, op: &'static str, allowed: &[GraphState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                op,
                state: self.state,
            })
        }
    }

    /// Moves `amount` units of flow across `arc`, keeping both residual flags in sync.
    pub(crate) fn push_flow(&mut self, arc: ArcId, amount: Capacity) {
        let rev = self.arcs[arc].rev;
        self.arcs[arc].rcap -= amount;
        self.arcs[rev].rcap += amount;
        self.sync_residual_flags(arc);
    }

    pub(crate) fn sync_residual_flags(&mut self, arc: ArcId) {
        let rev = self.arcs[arc].rev;
        self.arcs[arc].rev_residual = self.arcs[rev].rcap > 0;
        self.arcs[rev].rev_residual = self.arcs[arc].rcap > 0;
    }

    /// Residual capacity available to `tree` along the arc from `node` toward its parent through
    /// `arc`. Source-tree flow runs parent → child, sink-tree flow child → parent.
    pub(crate) fn tree_residual(&self, arc: ArcId, tree: Tree) -> Capacity {
        match tree {
            Tree::Source => self.arcs[self.arcs[arc].rev].rcap,
            Tree::Sink => self.arcs[arc].rcap,
        }
    }

    /// Whether `arc` (leaving some node `v`) can serve as `v`'s parent arc in `tree`.
    pub(crate) fn is_tree_residual(&self, arc: ArcId, tree: Tree) -> bool {
        match tree {
            Tree::Source => self.arcs[arc].rev_residual,
            Tree::Sink => self.arcs[arc].rcap > 0,
        }
    }

    /// Links `child` under the head of `arc`.
    pub(crate) fn attach(&mut self, child: NodeId, arc: ArcId) {
        debug_assert!(self.nodes[child].parent.is_none());
        let parent = self.arcs[arc].head;
        let old_first = self.nodes[parent].first_child;
        {
            let c = &mut self.nodes[child];
            c.parent = Some(arc);
            c.current = arc;
            c.prev_sibling = None;
            c.next_sibling = old_first;
        }
        if let Some(f) = old_first {
            self.nodes[f].prev_sibling = Some(child);
        }
        self.nodes[parent].first_child = Some(child);
    }

    /// Unlinks `child` from its parent; a no-op for roots and orphans.
    pub(crate) fn detach(&mut self, child: NodeId) {
        let Some(arc) = self.nodes[child].parent.take() else {
            return;
        };
        let parent = self.arcs[arc].head;
        let prev = self.nodes[child].prev_sibling.take();
        let next = self.nodes[child].next_sibling.take();
        match prev {
            Some(p) => self.nodes[p].next_sibling = next,
            None => self.nodes[parent].first_child = next,
        }
        if let Some(n) = next {
            self.nodes[n].prev_sibling = prev;
        }
    }

    /// Detached node `node` of `tree` lost its parent (or its root excess). Nodes still holding
    /// excess of the tree's sign stay put as roots; the rest wait for adoption.
    pub(crate) fn make_orphan(&mut self, node: NodeId, tree: Tree) {
        debug_assert!(self.nodes[node].parent.is_none());
        if tree.owns_excess(self.nodes[node].excess) {
            return;
        }
        if self.nodes[node].last_aug != self.aug_timestamp {
            self.nodes[node].last_aug = self.aug_timestamp;
            self.unique_orphans += 1;
        }
        let distance = self.nodes[node].label.unsigned_abs() as usize;
        self.orphans[tree.index()].push(distance, node);
    }

    /// Detaches every child of `node` and turns it into an orphan of `tree`.
    pub(crate) fn orphan_children(&mut self, node: NodeId, tree: Tree) {
        while let Some(child) = self.nodes[node].first_child {
            self.detach(child);
            self.make_orphan(child, tree);
        }
    }

    /// Discards both trees and reseeds them from node excesses: positive excess starts the source
    /// tree at distance 1, negative excess the sink tree. Flow and residuals are kept.
    pub(crate) fn reset_trees(&mut self) {
        self.top = [1, 1];
        for list in self.active.iter_mut().chain(self.next.iter_mut()) {
            list.clear();
        }
        for buckets in &mut self.orphans {
            buckets.clear();
        }
        self.growing = None;
        self.unique_orphans = 0;
        for &v in &self.perturbed {
            self.nodes[v].perturbed = false;
        }
        self.perturbed.clear();

        for v in 0..self.nodes.len() {
            let current = self.arc_start[v];
            let node = &mut self.nodes[v];
            node.parent = None;
            node.first_child = None;
            node.next_sibling = None;
            node.prev_sibling = None;
            node.current = current;
            node.label = match node.excess.signum() {
                1 => Tree::Source.label(1),
                -1 => Tree::Sink.label(1),
                _ => 0,
            };
            if let Some(tree) = Tree::of_label(node.label) {
                self.active[tree.index()].push(v);
            }
        }
        if self.options.collect_stats {
            self.stats.tree_resets += 1;
        }
    }
}
