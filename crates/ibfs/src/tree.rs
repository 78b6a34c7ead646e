//! Tree membership at the API boundary.
//!
//! Internally a node stores one signed `i32` label; this module is the only place that knows the
//! sign convention.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tree {
    Source,
    Sink,
}

impl Tree {
    pub fn opposite(self) -> Self {
        match self {
            Tree::Source => Tree::Sink,
            Tree::Sink => Tree::Source,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tree::Source => 0,
            Tree::Sink => 1,
        }
    }

    /// Signed label for a node at `distance` in this tree.
    pub(crate) fn label(self, distance: i32) -> i32 {
        match self {
            Tree::Source => distance,
            Tree::Sink => -distance,
        }
    }

    pub(crate) fn of_label(label: i32) -> Option<Self> {
        match label.signum() {
            1 => Some(Tree::Source),
            -1 => Some(Tree::Sink),
            _ => None,
        }
    }

    /// Whether an excess of this sign makes a node a root of this tree.
    pub(crate) fn owns_excess(self, excess: i64) -> bool {
        match self {
            Tree::Source => excess > 0,
            Tree::Sink => excess < 0,
        }
    }
}

/// Decoded node label: which tree a node belongs to and its BFS distance from that tree's roots.
/// Roots sit at distance 1 after a cold start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeLabel {
    Free,
    Source(u32),
    Sink(u32),
}

impl NodeLabel {
    pub(crate) fn from_raw(label: i32) -> Self {
        match Tree::of_label(label) {
            Some(Tree::Source) => NodeLabel::Source(label.unsigned_abs()),
            Some(Tree::Sink) => NodeLabel::Sink(label.unsigned_abs()),
            None => NodeLabel::Free,
        }
    }

    pub fn tree(self) -> Option<Tree> {
        match self {
            NodeLabel::Free => None,
            NodeLabel::Source(_) => Some(Tree::Source),
            NodeLabel::Sink(_) => Some(Tree::Sink),
        }
    }

    pub fn distance(self) -> u32 {
        match self {
            NodeLabel::Free => 0,
            NodeLabel::Source(d) | NodeLabel::Sink(d) => d,
        }
    }

    pub fn is_free(self) -> bool {
        matches!(self, NodeLabel::Free)
    }
}
