#![forbid(unsafe_code)]

//! Incremental breadth-first search (IBFS) maximum-flow / minimum-cut solver.
//!
//! Baseline: Goldberg, Hed, Kaplan, Tarjan, Werneck, "Maximum flows by incremental breadth-first
//! search" (ESA'11) and the dynamic variant from "Faster and More Dynamic Maximum Flow by
//! Incremental Breadth-First Search" (ESA'15).
//!
//! The solver keeps two search trees over one arena of nodes: the source tree (positive labels)
//! and the sink tree (negative labels). Terminal capacities are folded into a per-node signed
//! `excess`, so there are no explicit source/sink vertices. A typical session:
//!
//! ```
//! use ibfs::{IbfsGraph, SolverOptions};
//!
//! let mut g = IbfsGraph::new(SolverOptions::default());
//! g.init_size(2, 1).unwrap();
//! g.add_node(0, 10, 0).unwrap();
//! g.add_node(1, 0, 10).unwrap();
//! g.add_edge(0, 1, 4, 0).unwrap();
//! g.init_graph().unwrap();
//! assert_eq!(g.compute_max_flow().unwrap(), 4);
//! assert!(g.is_node_on_src_side(0, false));
//! assert!(!g.is_node_on_src_side(1, true));
//! ```

mod adopt;
mod augment;
pub mod backend;
mod buckets;
pub mod dinic;
pub mod error;
pub mod graph;
mod grow;
mod incremental;
pub mod options;
mod solve;
pub mod stats;
pub mod tree;

pub use backend::MaxFlow;
pub use dinic::DinicGraph;
pub use error::{Error, Result};
pub use graph::{ArcId, Capacity, GraphState, INFINITE_CAPACITY, IbfsGraph, NodeId};
pub use options::{GrowthStrategy, SolverOptions};
pub use stats::SolverStats;
pub use tree::{NodeLabel, Tree};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
