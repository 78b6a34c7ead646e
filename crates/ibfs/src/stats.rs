use serde::Serialize;

/// Counters collected while solving (when `SolverOptions::collect_stats` is set).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub augmentations: u64,
    /// Arcs whose residual capacity changed during augmentation.
    pub pushes: u64,
    pub growth_passes_source: u64,
    pub growth_passes_sink: u64,
    pub orphans: u64,
    /// Number of times both trees were discarded and reseeded from excesses.
    pub tree_resets: u64,
    pub shortest_path: Option<u32>,
    pub longest_path: Option<u32>,
}

impl SolverStats {
    pub(crate) fn record_path(&mut self, len: u32) {
        self.augmentations += 1;
        self.pushes += u64::from(len);
        self.shortest_path = Some(self.shortest_path.map_or(len, |m| m.min(len)));
        self.longest_path = Some(self.longest_path.map_or(len, |m| m.max(len)));
    }
}
