//! Tree growth: one BFS layer per pass.

use crate::graph::{IbfsGraph, NodeId};
use crate::tree::Tree;

impl IbfsGraph {
    /// Scans every frontier node of `tree` (distance `top`), labeling free neighbours at `top + 1`
    /// and augmenting through every bridge into the opposite tree. Afterwards the newly labeled
    /// layer becomes the frontier.
    pub(crate) fn grow(&mut self, tree: Tree) {
        let t = tree.index();
        let mut frontier = std::mem::take(&mut self.active[t]);
        let label = tree.label(self.top[t]);
        tracing::trace!(?tree, top = self.top[t], frontier = frontier.len(), "growth pass");

        self.growing = Some(tree);
        for &x in frontier.as_slice() {
            // Relabeled or freed since it was queued.
            if self.nodes[x].label != label {
                continue;
            }
            match tree {
                Tree::Source => self.scan_source(x, label),
                Tree::Sink => self.scan_sink(x, label),
            }
        }
        self.growing = None;

        frontier.clear();
        self.active[t] = std::mem::replace(&mut self.next[t], frontier);
        self.top[t] += 1;
        if self.options.collect_stats {
            match tree {
                Tree::Source => self.stats.growth_passes_source += 1,
                Tree::Sink => self.stats.growth_passes_sink += 1,
            }
        }
    }

    fn scan_source(&mut self, x: NodeId, label: i32) {
        let end = self.arc_start[x + 1];
        let mut a = self.arc_start[x];
        while a < end && self.nodes[x].label == label {
            if self.arcs[a].rcap == 0 {
                a += 1;
                continue;
            }
            let y = self.arcs[a].head;
            match self.nodes[y].label {
                0 => {
                    self.nodes[y].label = label + 1;
                    self.attach(y, self.arcs[a].rev);
                    self.next[Tree::Source.index()].push(y);
                    a += 1;
                }
                // The same arc may still carry more flow after this augmentation.
                l if l < 0 => self.augment(a),
                _ => a += 1,
            }
        }
    }

    fn scan_sink(&mut self, x: NodeId, label: i32) {
        let end = self.arc_start[x + 1];
        let mut a = self.arc_start[x];
        while a < end && self.nodes[x].label == label {
            if !self.arcs[a].rev_residual {
                a += 1;
                continue;
            }
            let y = self.arcs[a].head;
            match self.nodes[y].label {
                0 => {
                    self.nodes[y].label = label - 1;
                    self.attach(y, self.arcs[a].rev);
                    self.next[Tree::Sink.index()].push(y);
                    a += 1;
                }
                l if l > 0 => self.augment(self.arcs[a].rev),
                _ => a += 1,
            }
        }
    }
}
