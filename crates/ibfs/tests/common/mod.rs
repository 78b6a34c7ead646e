//! Checks shared by the solver integration tests.

use ibfs::{ArcId, Capacity, IbfsGraph, Tree};

/// Structural checks on a solved session: parent links, root excesses and closed trees.
pub fn assert_trees_are_consistent(g: &IbfsGraph) {
    for v in 0..g.node_count() {
        let label = g.node_label(v);
        let Some(tree) = label.tree() else {
            assert_eq!(g.node_excess(v), 0, "free node {v} holds excess");
            continue;
        };
        match g.node_parent(v) {
            None => match tree {
                Tree::Source => assert!(g.node_excess(v) > 0, "source root {v}"),
                Tree::Sink => assert!(g.node_excess(v) < 0, "sink root {v}"),
            },
            Some(p) => {
                assert_eq!(g.node_label(p).tree(), Some(tree), "parent of {v}");
                assert_eq!(g.node_label(p).distance() + 1, label.distance());
                let residual = match tree {
                    Tree::Source => g.arc_residual(g.find_arc(p, v).unwrap()),
                    Tree::Sink => g.arc_residual(g.find_arc(v, p).unwrap()),
                };
                assert!(residual > 0, "tree arc {v} -> {p} is saturated");
            }
        }
        for a in g.arcs_of(v) {
            if g.arc_residual(a) == 0 {
                continue;
            }
            let head = g.node_label(g.arc_head(a));
            if tree == Tree::Source {
                assert_eq!(head.tree(), Some(Tree::Source), "source tree leaks at {v}");
            }
            if head.tree() == Some(Tree::Sink) {
                assert_eq!(tree, Tree::Sink, "sink tree is entered from {v}");
            }
        }
    }
}

/// Residuals, excesses and flow of a session taken right before a solve.
pub struct FlowSnapshot {
    flow: Capacity,
    excess: Vec<Capacity>,
    residual: Vec<Capacity>,
}

impl FlowSnapshot {
    pub fn take(g: &IbfsGraph) -> Self {
        Self {
            flow: g.flow(),
            excess: (0..g.node_count()).map(|v| g.node_excess(v)).collect(),
            residual: (0..g.arc_count()).map(|a| g.arc_residual(a)).collect(),
        }
    }

    fn pushed(&self, g: &IbfsGraph, a: ArcId) -> Capacity {
        self.residual[a] - g.arc_residual(a)
    }

    /// The solve since the snapshot only moved flow: every arc pair keeps its total capacity,
    /// each node's net outflow equals the excess it gave up, and the flow grew by exactly the
    /// source excess that was routed.
    pub fn assert_conserved(&self, g: &IbfsGraph) {
        for a in 0..g.arc_count() {
            let rev = g.arc_reverse(a);
            assert_eq!(
                g.arc_residual(a) + g.arc_residual(rev),
                self.residual[a] + self.residual[rev],
                "capacity of arc pair {a}/{rev} changed"
            );
        }

        let mut routed = 0;
        for v in 0..g.node_count() {
            let outflow: Capacity = g.arcs_of(v).map(|a| self.pushed(g, a)).sum();
            let before = self.excess[v];
            let after = g.node_excess(v);
            assert_eq!(outflow, before - after, "flow is not conserved at node {v}");
            assert!(
                before.signum() * after.signum() >= 0,
                "excess of node {v} changed sign"
            );
            if before > 0 {
                routed += before - after;
            }
        }
        assert_eq!(g.flow(), self.flow + routed);
    }
}
