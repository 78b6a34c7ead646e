//! Frontier and orphan worklists indexed by BFS distance.

use crate::graph::NodeId;

/// Nodes of one tree layer waiting to be scanned.
///
/// Entries can go stale (the node was relabeled or freed after being queued); the grower filters
/// them on pop, so no removal is needed here.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveList {
    nodes: Vec<NodeId>,
}

impl ActiveList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    pub(crate) fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

/// Orphans of one tree bucketed by distance, popped in increasing distance order.
///
/// Each bucket is an intrusive singly-linked list threaded through `next`, so a node can sit in
/// at most one bucket of this structure at a time.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrphanBuckets {
    heads: Vec<Option<NodeId>>,
    next: Vec<Option<NodeId>>,
    min_bucket: usize,
    len: usize,
}

impl OrphanBuckets {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            heads: Vec::new(),
            next: vec![None; node_count],
            min_bucket: 0,
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, distance: usize, node: NodeId) {
        if distance >= self.heads.len() {
            self.heads.resize(distance + 1, None);
        }
        self.next[node] = self.heads[distance];
        self.heads[distance] = Some(node);
        if self.len == 0 || distance < self.min_bucket {
            self.min_bucket = distance;
        }
        self.len += 1;
    }

    /// Removes a node from the lowest non-empty bucket.
    pub(crate) fn pop_min(&mut self) -> Option<NodeId> {
        if self.len == 0 {
            return None;
        }
        while self.min_bucket < self.heads.len() {
            if let Some(node) = self.heads[self.min_bucket] {
                self.heads[self.min_bucket] = self.next[node];
                self.next[node] = None;
                self.len -= 1;
                return Some(node);
            }
            self.min_bucket += 1;
        }
        None
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        for head in &mut self.heads {
            *head = None;
        }
        self.next.fill(None);
        self.min_bucket = 0;
        self.len = 0;
    }
}
