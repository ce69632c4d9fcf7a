//! Readers running alongside mutations
//!
//! A reader snapshot must never show a logical port without all of its
//! routes, nor a route without its reverse.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voltha_graph::{DeviceGraph, LookupContext, RouteTable};
use voltha_graph_test::{FixtureLookup, PonTopology, RouteVerifier};

fn topology() -> PonTopology {
    PonTopology::new("olt")
        .with_nni_ports([2, 3])
        .with_pon_ports([4, 5])
        .with_onus_per_pon(32)
}

/// Every known (root, leaf) pair has both routes.
fn assert_consistent(table: &RouteTable) {
    let (roots, leaves): (Vec<_>, Vec<_>) = table.ports().partition(|p| p.root_port);
    for root in &roots {
        for leaf in &leaves {
            assert!(
                table.get(&root.id, &leaf.id).is_some() && table.get(&leaf.id, &root.id).is_some(),
                "partial state: {} <-> {} missing",
                root.id,
                leaf.id
            );
        }
    }
    assert_eq!(table.len(), 2 * roots.len() * leaves.len());
    RouteVerifier::new(table).assert_symmetric().unwrap();
}

/// Scenario:
/// 1. A writer adds every port one at a time
/// 2. Four readers snapshot the table in a loop
/// 3. No snapshot is ever partially updated
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_updates() {
    let topology = topology();
    let lookup = Arc::new(
        FixtureLookup::from_topology(&topology).with_delay(Duration::from_micros(50)),
    );
    let graph = Arc::new(DeviceGraph::new("ld", lookup));
    let done = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let graph = graph.clone();
        let done = done.clone();
        readers.push(tokio::spawn(async move {
            let mut snapshots = 0usize;
            while !done.load(Ordering::SeqCst) {
                assert_consistent(&graph.routes());
                snapshots += 1;
                tokio::task::yield_now().await;
            }
            snapshots
        }));
    }

    let ctx = LookupContext::new();
    for port in topology.logical_ports_roots_last() {
        graph.add_port(&ctx, port).await.unwrap();
        tokio::task::yield_now().await;
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        let snapshots = reader.await.expect("reader panicked");
        assert!(snapshots > 0);
    }
    assert_eq!(graph.routes().len(), topology.expected_routes());
}

/// Scenario: many add_port calls race each other; serialization makes the
/// outcome identical to a bulk computation
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_port_calls() {
    let topology = topology();
    let lookup = Arc::new(FixtureLookup::from_topology(&topology));
    let graph = Arc::new(DeviceGraph::new("ld", lookup.clone()));

    let mut writers = Vec::new();
    for port in topology.logical_ports() {
        let graph = graph.clone();
        writers.push(tokio::spawn(async move {
            graph.add_port(&LookupContext::new(), port).await
        }));
    }
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let bulk = DeviceGraph::new("ld", Arc::new(FixtureLookup::from_topology(&topology)));
    bulk.compute_routes(&LookupContext::new(), &topology.logical_ports())
        .await
        .unwrap();

    assert_eq!(*graph.routes(), *bulk.routes());
    assert_eq!(lookup.max_calls_per_device(), 1);
    assert_consistent(&graph.routes());
}

/// Scenario: a bulk recompute swaps the table in one step while readers
/// hold older snapshots
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshot_survives_recompute() {
    let topology = topology();
    let graph = Arc::new(DeviceGraph::new(
        "ld",
        Arc::new(FixtureLookup::from_topology(&topology)),
    ));
    let ctx = LookupContext::new();
    graph
        .compute_routes(&ctx, &topology.logical_ports())
        .await
        .unwrap();
    let old = graph.routes();

    let reduced = topology.root_ports();
    let reader = {
        let graph = graph.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                assert_consistent(&graph.routes());
                tokio::task::yield_now().await;
            }
        })
    };
    let mut ports = reduced;
    ports.extend(topology.leaf_ports().into_iter().step_by(2));
    graph.compute_routes(&ctx, &ports).await.unwrap();
    reader.await.unwrap();

    assert_eq!(old.len(), topology.expected_routes());
    assert_eq!(graph.routes().len(), topology.expected_routes() / 2);
}
