use crate::graph::{ArcId, Capacity, IbfsGraph, NodeId};
use crate::tree::Tree;

impl IbfsGraph {
    /// Pushes the bottleneck amount along source root → … → tail(bridge) → head(bridge) → … →
    /// sink root, orphans every child whose parent arc saturates, then repairs both trees.
    ///
    /// `bridge` must be a residual arc from a source-tree node to a sink-tree node, and both trees
    /// must be free of pending orphans.
    pub(crate) fn augment(&mut self, bridge: ArcId) {
        debug_assert!(self.orphans.iter().all(|b| b.is_empty()));
        let source_end = self.arc_tail(bridge);
        let sink_end = self.arcs[bridge].head;

        let mut bottleneck = self.arcs[bridge].rcap;
        let mut len = 1u32;
        let (source_root, steps) = self.walk_to_root(source_end, Tree::Source, &mut bottleneck);
        len += steps;
        bottleneck = bottleneck.min(self.nodes[source_root].excess);
        let (sink_root, steps) = self.walk_to_root(sink_end, Tree::Sink, &mut bottleneck);
        len += steps;
        bottleneck = bottleneck.min(-self.nodes[sink_root].excess);
        debug_assert!(bottleneck > 0, "augmenting along a saturated path");

        self.aug_timestamp = self.aug_timestamp.wrapping_add(1);
        self.push_flow(bridge, bottleneck);
        self.push_along(source_end, Tree::Source, bottleneck);
        self.push_along(sink_end, Tree::Sink, bottleneck);
        self.flow += bottleneck;

        if self.options.collect_stats {
            self.stats.record_path(len);
        }
        self.adopt(Tree::Source);
        self.adopt(Tree::Sink);
    }

    /// Follows parent arcs from `node` to its root, lowering `bottleneck` to the smallest tree
    /// residual on the way. Returns the root and the number of arcs walked.
    fn walk_to_root(&self, node: NodeId, tree: Tree, bottleneck: &mut Capacity) -> (NodeId, u32) {
        let mut v = node;
        let mut steps = 0;
        while let Some(a) = self.nodes[v].parent {
            *bottleneck = (*bottleneck).min(self.tree_residual(a, tree));
            v = self.arcs[a].head;
            steps += 1;
        }
        (v, steps)
    }

    fn push_along(&mut self, node: NodeId, tree: Tree, amount: Capacity) {
        let mut v = node;
        while let Some(a) = self.nodes[v].parent {
            let parent = self.arcs[a].head;
            let carrier = match tree {
                Tree::Source => self.arcs[a].rev,
                Tree::Sink => a,
            };
            self.push_flow(carrier, amount);
            if self.arcs[carrier].rcap == 0 {
                self.detach(v);
                self.make_orphan(v, tree);
            }
            v = parent;
        }

        let root = &mut self.nodes[v];
        match tree {
            Tree::Source => root.excess -= amount,
            Tree::Sink => root.excess += amount,
        }
        if root.excess == 0 {
            self.make_orphan(v, tree);
        }
    }
}
