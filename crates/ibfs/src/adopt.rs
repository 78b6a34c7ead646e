//! Orphan adoption.
//!
//! Orphans are drained in increasing distance order. A node at distance `d` may only hang below a
//! node at distance `d - 1`, so labels strictly decrease toward the roots and no cycle can form
//! even when the chosen parent is itself still waiting in a later bucket: if that parent is later
//! relabeled or freed it re-orphans its children.

use crate::graph::{ArcId, IbfsGraph, NodeId};
use crate::tree::Tree;

impl IbfsGraph {
    pub(crate) fn adopt(&mut self, tree: Tree) {
        while let Some(v) = self.orphans[tree.index()].pop_min() {
            self.adopt_orphan(v, tree);
        }
    }

    /// Highest label an adopted node may take: the growing tree may extend into the layer it is
    /// building, the other tree stops at its frontier.
    fn label_limit(&self, tree: Tree) -> i32 {
        let top = self.top[tree.index()];
        if self.growing == Some(tree) { top + 1 } else { top }
    }

    fn adopt_orphan(&mut self, v: NodeId, tree: Tree) {
        debug_assert!(self.nodes[v].parent.is_none());
        debug_assert_eq!(Tree::of_label(self.nodes[v].label), Some(tree));
        if self.options.collect_stats {
            self.stats.orphans += 1;
        }
        let distance = self.nodes[v].label.abs();

        if distance > 1 {
            if let Some(a) = self.same_distance_parent(v, tree, distance) {
                self.attach(v, a);
                return;
            }
        }

        // Full rescan for the closest neighbour still in the tree.
        let mut best: Option<(i32, ArcId)> = None;
        for a in self.arcs_of(v) {
            if !self.is_tree_residual(a, tree) {
                continue;
            }
            let label = self.nodes[self.arcs[a].head].label;
            if Tree::of_label(label) != Some(tree) {
                continue;
            }
            let d = label.abs();
            if best.is_none_or(|(m, _)| d < m) {
                best = Some((d, a));
            }
        }

        let limit = self.label_limit(tree);
        match best {
            Some((m, a)) if m < limit => {
                let new_distance = m + 1;
                if new_distance != distance {
                    self.orphan_children(v, tree);
                    self.nodes[v].label = tree.label(new_distance);
                    if new_distance == limit {
                        self.frontier_list(tree).push(v);
                    }
                }
                self.attach(v, a);
            }
            _ => {
                self.orphan_children(v, tree);
                debug_assert_eq!(self.nodes[v].excess, 0, "freeing a node that holds excess");
                self.nodes[v].label = 0;
            }
        }
    }

    /// Resumes the scan at the current-arc cursor looking for a parent one layer closer to the roots.
    fn same_distance_parent(&self, v: NodeId, tree: Tree, distance: i32) -> Option<ArcId> {
        let want = tree.label(distance - 1);
        (self.nodes[v].current..self.arc_start[v + 1]).find(|&a| {
            self.is_tree_residual(a, tree) && self.nodes[self.arcs[a].head].label == want
        })
    }

    /// Worklist that receives nodes relabeled onto `tree`'s outermost allowed layer.
    fn frontier_list(&mut self, tree: Tree) -> &mut crate::buckets::ActiveList {
        if self.growing == Some(tree) {
            &mut self.next[tree.index()]
        } else {
            &mut self.active[tree.index()]
        }
    }
}
