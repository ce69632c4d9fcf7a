//! Bulk route computation over the reference PON layout
//!
//! One OLT, two NNI ports, two PON ports, 256 ONUs per PON port.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use voltha_graph::{DeviceGraph, Hop, LookupContext, RouteLookup};
use voltha_graph_test::{FixtureLookup, PonTopology, RouteVerifier};

fn graph(topology: &PonTopology) -> (DeviceGraph, Arc<FixtureLookup>) {
    let lookup = Arc::new(FixtureLookup::from_topology(topology));
    (DeviceGraph::new("ld-olt", lookup.clone()), lookup)
}

/// Scenario:
/// 1. Compute routes for all 514 logical ports at once
/// 2. Verify 2048 routes, every device looked up exactly once
/// 3. Verify every route's hops
#[tokio::test]
async fn test_compute_routes_reference_layout() {
    let topology = PonTopology::standard();
    let (graph, lookup) = graph(&topology);

    let report = graph
        .compute_routes(&LookupContext::new(), &topology.logical_ports())
        .await
        .expect("compute_routes failed");

    assert!(report.is_complete(), "skipped: {:?}", report.skipped);
    assert_eq!(report.routes_installed, 2048);
    assert_eq!(report.lookups, 513);
    assert_eq!(lookup.calls(), 513);
    assert_eq!(lookup.max_calls_per_device(), 1);

    let routes = graph.routes();
    let verifier = RouteVerifier::new(&routes);
    verifier.assert_route_count(topology.expected_routes()).unwrap();
    verifier.assert_topology_routes(&topology, &[]).unwrap();
    verifier.assert_no_same_kind_routes().unwrap();
    verifier.assert_symmetric().unwrap();
}

#[tokio::test]
async fn test_specific_routes() {
    let topology = PonTopology::standard();
    let (graph, _) = graph(&topology);
    graph
        .compute_routes(&LookupContext::new(), &topology.logical_ports())
        .await
        .unwrap();

    // uni-300 sits behind PON port 5
    let down = graph.route("nni-1", "uni-300");
    assert_eq!(
        down.route().map(|r| r.hops().to_vec()),
        Some(vec![Hop::new("olt", 3, 5), Hop::new("onu300", 1, 2)])
    );
    let up = graph.route("uni-0", "nni-0");
    assert_eq!(
        up.route().map(|r| r.to_string()),
        Some("onu0[2->1] olt[4->2]".to_string())
    );

    assert_eq!(graph.route("nni-0", "nni-1"), RouteLookup::NoRoute);
    assert_eq!(graph.route("uni-1", "uni-2"), RouteLookup::NoRoute);
    assert_eq!(graph.route("uni-1", "uni-1"), RouteLookup::NoRoute);
    assert_eq!(graph.route("nni-0", "uni-512"), RouteLookup::NotComputed);
}

#[tokio::test]
async fn test_ofp_queries() {
    let topology = PonTopology::standard();
    let (graph, _) = graph(&topology);
    graph
        .compute_routes(&LookupContext::new(), &topology.logical_ports())
        .await
        .unwrap();

    assert!(graph.is_root_port(1));
    assert!(graph.is_root_port(2));
    assert!(!graph.is_root_port(3));
    assert!(!graph.is_root_port(9999));

    let routes = graph.routes();
    // ofp 3 is uni-0
    let by_ofp = routes.get_by_ofp(1, 3).expect("route by ofp");
    assert_eq!(Some(by_ofp), routes.get("nni-0", "uni-0"));
    assert!(routes.get_by_ofp(1, 2).is_none());
}

/// Scenario: recompute with unchanged input is idempotent and served from
/// the memoized topology
#[tokio::test]
async fn test_recompute_is_idempotent() {
    let topology = PonTopology::standard();
    let (graph, lookup) = graph(&topology);
    let ctx = LookupContext::new();

    graph.compute_routes(&ctx, &topology.logical_ports()).await.unwrap();
    let first = graph.routes();

    let report = graph
        .compute_routes(&ctx, &topology.logical_ports())
        .await
        .unwrap();
    assert_eq!(report.lookups, 0);
    assert_eq!(report.routes_installed, 2048);
    assert_eq!(lookup.calls(), 513);
    assert_eq!(*graph.routes(), *first);
    assert_eq!(graph.device_ids().await.len(), 513);
}

/// Scenario: a recompute over a smaller port set drops the routes of
/// ports no longer present
#[tokio::test]
async fn test_recompute_replaces_port_set() {
    let topology = PonTopology::standard();
    let (graph, _) = graph(&topology);
    let ctx = LookupContext::new();

    graph.compute_routes(&ctx, &topology.logical_ports()).await.unwrap();

    let mut ports = topology.root_ports();
    ports.extend(topology.leaf_ports().into_iter().take(10));
    let report = graph.compute_routes(&ctx, &ports).await.unwrap();

    assert_eq!(report.routes_installed, 40);
    assert_eq!(graph.routes().len(), 40);
    assert_eq!(graph.route("nni-0", "uni-10"), RouteLookup::NotComputed);
}

#[tokio::test]
async fn test_dump_lists_routes() {
    let topology = PonTopology::new("olt")
        .with_nni_ports([2])
        .with_pon_ports([4])
        .with_onus_per_pon(1);
    let (graph, _) = graph(&topology);
    graph
        .compute_routes(&LookupContext::new(), &topology.logical_ports())
        .await
        .unwrap();

    let dump = graph.dump().await;
    assert!(dump.starts_with("logical device ld-olt"));
    assert!(dump.contains("olt[2->4] onu0[1->2]"));
    assert!(dump.contains("onu0[2->1] olt[4->2]"));
    graph.print().await;
}
