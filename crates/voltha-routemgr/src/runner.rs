//! One route computation run over a topology snapshot.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voltha_graph::{ComputeReport, DeviceGraph, LookupContext};
use voltha_model::{MemoryStore, ModelProxyManager};

use crate::config::RouteMgrConfig;
use crate::error::Result;
use crate::topology::TopologyFile;

/// How logical ports are handed to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// One `compute_routes` call over every port.
    #[default]
    Bulk,
    /// One `add_port` call per port, in file order.
    Incremental,
}

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Overall deadline for device lookups.
    pub deadline: Option<Duration>,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunSummary {
    pub graph: DeviceGraph,
    pub report: ComputeReport,
}

/// Seeds a model store from `topology`, builds a device graph over it and
/// computes routes.
pub async fn run(
    topology: &TopologyFile,
    config: &RouteMgrConfig,
    options: &RunOptions,
) -> Result<RunSummary> {
    let store = MemoryStore::new();
    topology.seed(&store);
    let manager = Arc::new(ModelProxyManager::new(store));
    let graph = DeviceGraph::new(topology.logical_device_id.clone(), manager)
        .with_config(config.graph.clone());

    let ctx = match options.deadline {
        Some(deadline) => LookupContext::new().with_timeout(deadline),
        None => LookupContext::new(),
    };

    info!(
        logical_device_id = %topology.logical_device_id,
        devices = topology.devices.len(),
        logical_ports = topology.logical_ports.len(),
        mode = ?options.mode,
        "Computing routes"
    );

    let report = match options.mode {
        RunMode::Bulk => graph.compute_routes(&ctx, &topology.logical_ports).await?,
        RunMode::Incremental => {
            let mut total = ComputeReport::default();
            for port in &topology.logical_ports {
                let report = graph.add_port(&ctx, port.clone()).await?;
                absorb(&mut total, report);
            }
            total
        }
    };

    for skipped in &report.skipped {
        warn!(
            ingress = %skipped.ingress,
            egress = %skipped.egress,
            reason = %skipped.reason,
            "No route"
        );
    }
    Ok(RunSummary { graph, report })
}

fn absorb(total: &mut ComputeReport, report: ComputeReport) {
    total.routes_installed += report.routes_installed;
    total.lookups += report.lookups;
    total.skipped.extend(report.skipped);
    total.lookup_failures.extend(report.lookup_failures);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use voltha_graph::GraphError;
    use voltha_types::{Device, LogicalPort, Port, PortType};

    fn topology(onus: usize) -> TopologyFile {
        let mut pon = Port::new("olt", 4, PortType::PonOlt);
        let mut devices = Vec::new();
        let mut logical_ports = vec![LogicalPort::root("nni-0", "olt", 2, 1)];
        for i in 0..onus {
            let id = format!("onu{i}");
            pon = pon.with_peer(id.clone(), 1);
            devices.push(
                Device::new(id.clone(), "olt")
                    .with_port(Port::new(id.clone(), 1, PortType::PonOnu).with_peer("olt", 4))
                    .with_port(Port::new(id.clone(), 2, PortType::EthernetUni)),
            );
            logical_ports.push(LogicalPort::new(format!("uni-{i}"), id, 2, 2 + i as u32));
        }
        devices.insert(
            0,
            Device::new("olt", "")
                .with_port(Port::new("olt", 2, PortType::EthernetNni))
                .with_port(pon),
        );
        TopologyFile {
            logical_device_id: "ld-test".to_string(),
            devices,
            logical_ports,
        }
    }

    #[tokio::test]
    async fn test_bulk_and_incremental_agree() {
        let topo = topology(4);
        let config = RouteMgrConfig::default();

        let bulk = run(&topo, &config, &RunOptions::default()).await.unwrap();
        let incremental = run(
            &topo,
            &config,
            &RunOptions {
                mode: RunMode::Incremental,
                ..RunOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(bulk.report.routes_installed, 8);
        assert_eq!(incremental.report.routes_installed, 8);
        assert_eq!(bulk.report.lookups, 5);
        assert_eq!(incremental.report.lookups, 5);
        assert_eq!(*bulk.graph.routes(), *incremental.graph.routes());
        assert_eq!(bulk.graph.logical_device_id(), "ld-test");
    }

    #[tokio::test]
    async fn test_missing_device_is_reported() {
        let mut topo = topology(2);
        topo.devices.retain(|d| d.id != "onu1");

        let summary = run(&topo, &RouteMgrConfig::default(), &RunOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.report.routes_installed, 2);
        assert_eq!(summary.report.skipped.len(), 2);
        assert!(summary.report.lookup_failures.contains_key("onu1"));
    }

    #[tokio::test]
    async fn test_empty_port_set_fails() {
        let mut topo = topology(1);
        topo.logical_ports.clear();

        let err = run(&topo, &RouteMgrConfig::default(), &RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::RouteMgrError::Graph(GraphError::EmptyPortSet)
        ));
    }
}
