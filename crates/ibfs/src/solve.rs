use crate::error::{Error, Result};
use crate::graph::{Capacity, GraphState, IbfsGraph, NodeId};
use crate::options::GrowthStrategy;
use crate::tree::Tree;

impl IbfsGraph {
    /// Solves from freshly seeded trees. Flow already routed by earlier solves is kept; only the
    /// search trees are rebuilt from the current node excesses.
    pub fn compute_max_flow(&mut self) -> Result<Capacity> {
        self.expect_state(
            "compute_max_flow",
            &[GraphState::Populated, GraphState::Solved],
        )?;
        self.ensure_flow_bound()?;
        if self.state == GraphState::Solved || !self.perturbed.is_empty() {
            self.reset_trees();
        }
        self.run();
        Ok(self.flow)
    }

    /// Final partition: source tree → `true`, sink tree → `false`, free nodes → `default_if_free`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn is_node_on_src_side(&self, node: NodeId, default_if_free: bool) -> bool {
        match Tree::of_label(self.nodes[node].label) {
            Some(Tree::Source) => true,
            Some(Tree::Sink) => false,
            None => default_if_free,
        }
    }

    /// Alternates growth passes (each augmenting through every bridge it meets) until both
    /// frontiers are exhausted.
    pub(crate) fn run(&mut self) {
        let mut last = Tree::Sink;
        loop {
            let source = &self.active[Tree::Source.index()];
            let sink = &self.active[Tree::Sink.index()];
            let tree = match (source.is_empty(), sink.is_empty()) {
                (true, true) => break,
                (false, true) => Tree::Source,
                (true, false) => Tree::Sink,
                (false, false) => match self.options.growth {
                    GrowthStrategy::Alternate => last.opposite(),
                    GrowthStrategy::SmallerFrontier => {
                        if source.len() <= sink.len() {
                            Tree::Source
                        } else {
                            Tree::Sink
                        }
                    }
                },
            };
            self.grow(tree);
            last = tree;
        }
        self.state = GraphState::Solved;
        tracing::debug!(
            flow = self.flow,
            augmentations = self.stats.augmentations,
            orphans = self.stats.orphans,
            top_source = self.top[Tree::Source.index()],
            top_sink = self.top[Tree::Sink.index()],
            "max flow computed"
        );
    }

    /// Every unit of positive excess may end up as flow; refuse to start if that sum cannot be
    /// represented.
    pub(crate) fn ensure_flow_bound(&self) -> Result<()> {
        self.nodes
            .iter()
            .filter(|n| n.excess > 0)
            .try_fold(self.flow, |acc, n| acc.checked_add(n.excess))
            .map(|_| ())
            .ok_or(Error::CapacityOverflow {
                context: "total flow bound",
            })
    }
}
