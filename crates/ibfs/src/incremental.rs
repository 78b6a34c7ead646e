//! Capacity deltas on a populated or solved graph, and the warm re-solve that reuses both trees.
//!
//! Every delta is applied so that the current flow stays feasible: capacity that disappears under
//! existing flow is handed back to the endpoints as excess, and new residual capacity that would
//! break the tree invariants is saturated on the spot. The nodes whose excess or incident arcs
//! changed are recorded as perturbed. Before the next solve both trees are cut back to a depth
//! at which every perturbed node is either a frontier root or outside the trees again.

use crate::error::{Error, Result};
use crate::graph::{ArcId, Capacity, GraphState, IbfsGraph, NodeId};
use crate::tree::Tree;

const INCREMENTAL_STATES: &[GraphState] = &[GraphState::Populated, GraphState::Solved];

impl IbfsGraph {
    /// Adds `delta_source` / `delta_sink` to the terminal capacities of `node`. Negative deltas
    /// are allowed; a decrease is turned into an increase on the other terminal plus an
    /// immediate change of the flow value.
    pub fn inc_node(
        &mut self,
        node: NodeId,
        delta_source: Capacity,
        delta_sink: Capacity,
    ) -> Result<()> {
        self.expect_state("inc_node", INCREMENTAL_STATES)?;
        self.check_node(node)?;
        if delta_source == 0 && delta_sink == 0 {
            return Ok(());
        }
        self.shift_terminal(node, delta_source, delta_sink)
    }

    /// Adds `delta` to the capacity of `arc`. A decrease below the arc's residual capacity
    /// cancels flow on it; the pair's total capacity may not drop below zero.
    pub fn inc_arc(&mut self, arc: ArcId, delta: Capacity) -> Result<()> {
        self.expect_state("inc_arc", INCREMENTAL_STATES)?;
        if arc >= self.arcs.len() {
            return Err(Error::ArcOutOfRange {
                arc,
                arc_count: self.arcs.len(),
            });
        }
        if delta == 0 {
            return Ok(());
        }
        let rev = self.arcs[arc].rev;
        let rcap = self.arcs[arc].rcap;
        let overflow = Error::CapacityOverflow {
            context: "arc capacity",
        };
        let total = rcap
            .checked_add(self.arcs[rev].rcap)
            .and_then(|t| t.checked_add(delta))
            .ok_or(overflow.clone())?;
        if total < 0 {
            return Err(Error::CapacityUnderflow { arc });
        }

        let x = self.arcs[rev].head;
        let y = self.arcs[arc].head;
        if delta > -rcap {
            self.arcs[arc].rcap = rcap + delta;
            if rcap == 0 && self.breaks_invariants(x, y) {
                // Route the new capacity immediately instead of exposing it to the trees.
                self.arcs[arc].rcap = 0;
                self.arcs[rev].rcap = self.arcs[rev].rcap.checked_add(delta).ok_or(overflow)?;
                self.adjust_flow(-delta)?;
                self.shift_terminal(x, 0, delta)?;
                self.shift_terminal(y, delta, 0)?;
            }
        } else {
            // Cancel the flow that no longer fits on the arc.
            let cancel = -(delta + rcap);
            self.arcs[rev].rcap -= cancel;
            self.arcs[arc].rcap = 0;
            self.adjust_flow(-cancel)?;
            self.shift_terminal(y, 0, cancel)?;
            self.shift_terminal(x, cancel, 0)?;
        }
        self.sync_residual_flags(arc);
        Ok(())
    }

    /// Adds `delta` to arc `u -> v` and `rev_delta` to arc `v -> u`.
    pub fn inc_edge(
        &mut self,
        u: NodeId,
        v: NodeId,
        delta: Capacity,
        rev_delta: Capacity,
    ) -> Result<()> {
        self.expect_state("inc_edge", INCREMENTAL_STATES)?;
        self.check_node(u)?;
        self.check_node(v)?;
        let arc = self
            .find_arc(u, v)
            .ok_or(Error::EdgeNotFound { from: u, to: v })?;
        let rev = self.arcs[arc].rev;
        // Growth first so a shrink on one side can lean on capacity added to the other.
        if delta >= rev_delta {
            self.inc_arc(arc, delta)?;
            self.inc_arc(rev, rev_delta)
        } else {
            self.inc_arc(rev, rev_delta)?;
            self.inc_arc(arc, delta)
        }
    }

    /// Nodes whose excess or incident arcs changed since the last solve.
    pub fn perturbed_nodes(&self) -> &[NodeId] {
        &self.perturbed
    }

    /// Re-solves after `inc_*` calls, keeping as much of both trees as stays valid. Falls back to
    /// a reset when too many orphans accumulated since the last one.
    pub fn compute_max_flow_incremental(&mut self) -> Result<Capacity> {
        self.expect_state("compute_max_flow_incremental", INCREMENTAL_STATES)?;
        self.ensure_flow_bound()?;
        let threshold = (self.options.reset_factor * self.nodes.len() as f64) as u64;
        if self.state == GraphState::Populated || self.unique_orphans >= threshold {
            tracing::debug!(
                unique_orphans = self.unique_orphans,
                threshold,
                "resetting trees before incremental solve"
            );
            self.reset_trees();
        } else {
            self.reconfigure();
        }
        self.run();
        Ok(self.flow)
    }

    pub(crate) fn shift_terminal(
        &mut self,
        node: NodeId,
        mut delta_source: Capacity,
        mut delta_sink: Capacity,
    ) -> Result<()> {
        if delta_source < 0 {
            self.adjust_flow(delta_source)?;
            delta_sink = delta_sink.checked_sub(delta_source).ok_or(Error::CapacityOverflow {
                context: "terminal capacity",
            })?;
            delta_source = 0;
        }
        if delta_sink < 0 {
            self.adjust_flow(delta_sink)?;
            delta_source -= delta_sink;
            delta_sink = 0;
        }
        self.fold_terminal(node, delta_source, delta_sink)?;
        if !self.nodes[node].perturbed {
            self.nodes[node].perturbed = true;
            self.perturbed.push(node);
        }
        Ok(())
    }

    fn adjust_flow(&mut self, delta: Capacity) -> Result<()> {
        self.flow = self
            .flow
            .checked_add(delta)
            .ok_or(Error::CapacityOverflow { context: "flow" })?;
        Ok(())
    }

    /// Whether a new residual arc `x -> y` would leave a tree without passing through its
    /// frontier or skip a layer inside one.
    fn breaks_invariants(&self, x: NodeId, y: NodeId) -> bool {
        let lx = self.nodes[x].label;
        let ly = self.nodes[y].label;
        (lx > 0 && ly <= 0)
            || (ly < 0 && lx >= 0)
            || (lx > 0 && ly > lx + 1)
            || (lx < 0 && ly < 0 && -lx > -ly + 1)
    }

    /// Picks the depth each tree is cut back to, truncates, and repairs the perturbed roots.
    fn reconfigure(&mut self) {
        let mut limit = self.top;
        for &x in &self.perturbed {
            let label = self.nodes[x].label;
            if let Some(tree) = Tree::of_label(label) {
                let t = tree.index();
                limit[t] = limit[t].min(label.abs() - 1);
            }
            // A reseeded root must not sit more than one layer below any in-tree neighbour
            // with residual capacity into it.
            let excess = self.nodes[x].excess;
            for a in self.arcs_of(x) {
                let neighbour = self.nodes[self.arcs[a].head].label;
                if excess > 0 && self.arcs[a].rev_residual && neighbour > 0 {
                    limit[0] = limit[0].min(neighbour + 1);
                } else if excess < 0 && self.arcs[a].rcap > 0 && neighbour < 0 {
                    limit[1] = limit[1].min(-neighbour + 1);
                }
            }
        }
        let limit = limit.map(|l| l.max(1));
        tracing::trace!(
            perturbed = self.perturbed.len(),
            source_depth = limit[0],
            sink_depth = limit[1],
            "truncating trees"
        );
        self.truncate_trees(limit);

        let perturbed = std::mem::take(&mut self.perturbed);
        for &x in &perturbed {
            self.nodes[x].perturbed = false;
            self.settle_root(x);
        }
        self.perturbed = perturbed;
        self.perturbed.clear();

        self.adopt(Tree::Source);
        self.adopt(Tree::Sink);
    }

    /// Keeps every node closer than `limit` to its roots, turns the nodes at exactly `limit` into
    /// the new frontier, and drops everything deeper. Dropped nodes holding excess come back as
    /// frontier roots of the tree matching their excess sign.
    fn truncate_trees(&mut self, limit: [i32; 2]) {
        for list in self.active.iter_mut().chain(self.next.iter_mut()) {
            list.clear();
        }
        self.top = limit;
        self.growing = None;

        for v in 0..self.nodes.len() {
            let label = self.nodes[v].label;
            if let Some(tree) = Tree::of_label(label) {
                let depth = limit[tree.index()];
                let distance = label.abs();
                if distance < depth {
                    continue;
                }
                if distance == depth {
                    self.nodes[v].first_child = None;
                    self.active[tree.index()].push(v);
                    continue;
                }
            }

            let current = self.arc_start[v];
            let node = &mut self.nodes[v];
            node.parent = None;
            node.first_child = None;
            node.next_sibling = None;
            node.prev_sibling = None;
            node.current = current;
            node.label = match node.excess.signum() {
                1 => Tree::Source.label(limit[0]),
                -1 => Tree::Sink.label(limit[1]),
                _ => 0,
            };
            if let Some(tree) = Tree::of_label(node.label) {
                self.active[tree.index()].push(v);
            }
        }
    }

    /// A perturbed node that survived truncation is a childless frontier root at the truncation
    /// depth. Make its excess agree with its tree: drop it to adoption when the excess is gone,
    /// move it to the other tree's frontier when the excess changed sign.
    fn settle_root(&mut self, x: NodeId) {
        let Some(tree) = Tree::of_label(self.nodes[x].label) else {
            return;
        };
        let excess = self.nodes[x].excess;
        if tree.owns_excess(excess) {
            return;
        }
        debug_assert!(self.nodes[x].parent.is_none());
        if excess == 0 {
            self.make_orphan(x, tree);
            return;
        }
        self.orphan_children(x, tree);
        let other = tree.opposite();
        self.nodes[x].label = other.label(self.top[other.index()]);
        self.nodes[x].current = self.arc_start[x];
        self.active[other.index()].push(x);
    }
}
