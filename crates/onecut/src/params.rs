use ibfs::SolverOptions;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Pixel neighbourhood used for the smoothness term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Connectivity {
    Grid4,
    #[default]
    Grid8,
    Grid16,
}

impl Connectivity {
    /// Half-neighbourhood offsets; the other half is covered by the reverse arcs.
    const SHIFTS: [(i64, i64); 8] = [
        (1, 0),
        (0, 1),
        (1, 1),
        (1, -1),
        (2, -1),
        (2, 1),
        (1, 2),
        (-1, 2),
    ];

    pub fn neighbors(self) -> u32 {
        match self {
            Connectivity::Grid4 => 4,
            Connectivity::Grid8 => 8,
            Connectivity::Grid16 => 16,
        }
    }

    pub fn shifts(self) -> &'static [(i64, i64)] {
        &Self::SHIFTS[..self.neighbors() as usize / 2]
    }
}

impl TryFrom<u32> for Connectivity {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Connectivity::Grid4),
            8 => Ok(Connectivity::Grid8),
            16 => Ok(Connectivity::Grid16),
            other => Err(Error::Connectivity(other)),
        }
    }
}

impl From<Connectivity> for u32 {
    fn from(value: Connectivity) -> Self {
        value.neighbors()
    }
}

/// Max-flow implementation used to cut the energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Ibfs,
    Dinic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneCutParams {
    /// Width of one color bin per channel (so `ceil(256 / color_bin_size)` bins per channel).
    pub color_bin_size: u32,
    pub connectivity: Connectivity,
    pub potts_weight: f64,
    /// Relative weight of the L1 color separation term.
    pub color_separation_beta: f64,
    /// Fixed-point factor applied to every floating weight before it reaches the solver.
    pub scale: f64,
    pub backend: Backend,
    pub solver: SolverOptions,
}

impl Default for OneCutParams {
    fn default() -> Self {
        Self {
            color_bin_size: 8,
            connectivity: Connectivity::Grid8,
            potts_weight: 9.0,
            color_separation_beta: 0.9,
            scale: 1000.0,
            backend: Backend::Ibfs,
            solver: SolverOptions::default(),
        }
    }
}
