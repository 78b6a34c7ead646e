use ibfs::{Error, GraphState, IbfsGraph, NodeLabel, SolverOptions, Tree};

fn grid_2x2(cap: i64) -> IbfsGraph {
    // 0 1
    // 2 3
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(4, 4).unwrap();
    g.add_node(0, 10, 0).unwrap();
    g.add_node(3, 0, 10).unwrap();
    for (u, v) in [(0, 1), (2, 3), (0, 2), (1, 3)] {
        g.add_edge(u, v, cap, cap).unwrap();
    }
    g
}

#[test]
fn grid_2x2_routes_both_disjoint_paths() {
    let mut g = grid_2x2(5);
    g.init_graph().unwrap();
    assert_eq!(g.compute_max_flow().unwrap(), 10);
    assert_eq!(g.state(), GraphState::Solved);
    // Both terminals are exhausted, so nothing stays attached to either tree.
    for v in 0..4 {
        assert_eq!(g.node_label(v), NodeLabel::Free, "node {v}");
        assert!(g.is_node_on_src_side(v, true));
        assert!(!g.is_node_on_src_side(v, false));
    }
}

#[test]
fn grid_2x2_with_a_single_bottleneck_arc() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(4, 4).unwrap();
    g.add_node(0, 10, 0).unwrap();
    g.add_node(3, 0, 10).unwrap();
    g.add_edge(0, 1, 5, 5).unwrap();
    g.add_edge(1, 3, 5, 5).unwrap();
    g.add_edge(0, 2, 5, 5).unwrap();
    g.add_edge(2, 3, 0, 0).unwrap();
    g.init_graph().unwrap();
    assert_eq!(g.compute_max_flow().unwrap(), 5);
    assert!(g.is_node_on_src_side(0, false));
    assert!(!g.is_node_on_src_side(3, true));
    // Node 2 hangs off the source and cannot reach the sink.
    assert_eq!(g.node_label(2).tree(), Some(Tree::Source));
}

#[test]
fn overlapping_terminal_capacities_are_routed_immediately() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(1, 0).unwrap();
    g.add_node(0, 3, 7).unwrap();
    assert_eq!(g.flow(), 3);
    assert_eq!(g.node_excess(0), -4);
    g.init_graph().unwrap();
    assert_eq!(g.compute_max_flow().unwrap(), 3);
    assert!(!g.is_node_on_src_side(0, true));
    assert_eq!(g.node_label(0), NodeLabel::Sink(1));
}

#[test]
fn repeated_add_node_calls_accumulate() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(1, 0).unwrap();
    g.add_node(0, 5, 0).unwrap();
    g.add_node(0, 0, 2).unwrap();
    assert_eq!(g.flow(), 2);
    assert_eq!(g.node_excess(0), 3);
    // Cancelling source capacity the node still has is fine ...
    g.add_node(0, -3, 0).unwrap();
    assert_eq!(g.node_excess(0), 0);
    // ... going below zero is not.
    assert_eq!(
        g.add_node(0, -1, 0),
        Err(Error::NegativeCapacity {
            what: "terminal capacity of node",
            index: 0
        })
    );
}

#[test]
fn construction_rejects_bad_indices_and_capacities() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    assert!(matches!(
        g.add_node(0, 1, 0),
        Err(Error::InvalidState {
            op: "add_node",
            state: GraphState::Uninitialized
        })
    ));
    g.init_size(3, 2).unwrap();
    assert_eq!(
        g.add_node(3, 1, 0),
        Err(Error::NodeOutOfRange {
            node: 3,
            node_count: 3
        })
    );
    assert!(matches!(
        g.add_edge(0, 7, 1, 1),
        Err(Error::NodeOutOfRange { node: 7, .. })
    ));
    assert!(matches!(
        g.add_edge(0, 1, -1, 1),
        Err(Error::NegativeCapacity { what: "edge", .. })
    ));
    assert!(matches!(
        g.add_edge(0, 1, i64::MAX, 1),
        Err(Error::CapacityOverflow { .. })
    ));
}

#[test]
fn solving_before_init_graph_is_an_invalid_state() {
    let mut g = grid_2x2(1);
    assert_eq!(
        g.compute_max_flow(),
        Err(Error::InvalidState {
            op: "compute_max_flow",
            state: GraphState::Sized
        })
    );
    g.init_graph().unwrap();
    assert!(matches!(
        g.add_edge(0, 1, 1, 1),
        Err(Error::InvalidState { op: "add_edge", .. })
    ));
    assert!(matches!(
        g.init_graph(),
        Err(Error::InvalidState { op: "init_graph", .. })
    ));
}

#[test]
fn self_loops_are_dropped() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(2, 2).unwrap();
    g.add_edge(0, 0, 9, 9).unwrap();
    g.add_edge(0, 1, 2, 0).unwrap();
    g.init_graph().unwrap();
    assert_eq!(g.arc_count(), 2);
}

#[test]
fn arcs_are_grouped_by_tail_with_reverse_links() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(3, 3).unwrap();
    g.add_edge(2, 0, 4, 1).unwrap();
    g.add_edge(0, 1, 3, 0).unwrap();
    g.add_edge(1, 2, 5, 6).unwrap();
    g.init_graph().unwrap();
    assert_eq!(g.arc_count(), 6);
    for v in 0..3 {
        for a in g.arcs_of(v) {
            assert_eq!(g.arc_tail(a), v);
            let r = g.arc_reverse(a);
            assert_eq!(g.arc_reverse(r), a);
            assert_eq!(g.arc_head(r), v);
        }
    }
    let a = g.find_arc(2, 0).unwrap();
    assert_eq!(g.arc_residual(a), 4);
    assert_eq!(g.arc_residual(g.arc_reverse(a)), 1);
    let b = g.find_arc(1, 0).unwrap();
    assert_eq!(g.arc_residual(b), 0);
    assert_eq!(g.find_arc(0, 0), None);
}

#[test]
fn init_graph_seeds_both_trees_from_excess() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(3, 0).unwrap();
    g.add_node(0, 4, 0).unwrap();
    g.add_node(2, 0, 1).unwrap();
    g.init_graph().unwrap();
    assert_eq!(g.node_label(0), NodeLabel::Source(1));
    assert_eq!(g.node_label(1), NodeLabel::Free);
    assert_eq!(g.node_label(2), NodeLabel::Sink(1));
    assert_eq!(g.state(), GraphState::Populated);
}

#[test]
fn isolated_nodes_take_the_caller_default() {
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(3, 1).unwrap();
    g.add_node(0, 2, 0).unwrap();
    g.add_node(1, 0, 2).unwrap();
    g.add_edge(0, 1, 1, 0).unwrap();
    g.init_graph().unwrap();
    assert_eq!(g.compute_max_flow().unwrap(), 1);
    assert!(g.is_node_on_src_side(2, true));
    assert!(!g.is_node_on_src_side(2, false));
}

#[test]
fn init_size_starts_a_new_session() {
    let mut g = grid_2x2(5);
    g.init_graph().unwrap();
    g.compute_max_flow().unwrap();
    g.init_size(1, 0).unwrap();
    assert_eq!(g.state(), GraphState::Sized);
    assert_eq!(g.flow(), 0);
    assert_eq!(g.node_count(), 1);
}

#[test]
fn a_chain_path_saturates_its_weakest_link() {
    let n = 50;
    let mut g = IbfsGraph::new(SolverOptions::default());
    g.init_size(n, n - 1).unwrap();
    g.add_node(0, 100, 0).unwrap();
    g.add_node(n - 1, 0, 100).unwrap();
    for v in 0..n - 1 {
        let cap = if v == 31 { 7 } else { 20 + v as i64 };
        g.add_edge(v, v + 1, cap, 0).unwrap();
    }
    g.init_graph().unwrap();
    assert_eq!(g.compute_max_flow().unwrap(), 7);
    for v in 0..=31 {
        assert!(g.is_node_on_src_side(v, false), "node {v}");
    }
    for v in 32..n {
        assert!(!g.is_node_on_src_side(v, true), "node {v}");
    }
    let stats = g.stats();
    assert_eq!(stats.augmentations, 1);
    assert_eq!(stats.shortest_path, Some(n as u32 - 1));
}
