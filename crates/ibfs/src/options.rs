use serde::{Deserialize, Serialize};

/// Which tree grows next when both frontiers are non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStrategy {
    /// Strictly alternate between the source tree and the sink tree.
    Alternate,
    /// Grow the tree whose current frontier holds fewer nodes.
    #[default]
    SmallerFrontier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub growth: GrowthStrategy,
    /// Incremental solves discard both trees once the number of orphans seen since the last
    /// reset reaches `reset_factor * node_count`.
    pub reset_factor: f64,
    pub collect_stats: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            growth: GrowthStrategy::SmallerFrontier,
            reset_factor: 2.0,
            collect_stats: true,
        }
    }
}
