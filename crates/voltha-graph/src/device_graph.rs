//! Device graph controller.
//!
//! Owns the topology and route table of one logical device. Mutations
//! (`compute_routes`, `add_port`, `remove_port`, invalidation) are serialized
//! by an async mutex held across device lookups. Readers take a snapshot of
//! the route table through a separate RW lock and never wait on lookups.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use voltha_types::LogicalPort;

use crate::config::DeviceGraphConfig;
use crate::error::{GraphError, LookupError, Result, SkipReason};
use crate::lookup::{fetch_device, DeviceLookup, LookupContext};
use crate::report::ComputeReport;
use crate::route::{Route, RouteLookup, RouteTable};
use crate::topology::{PathTree, PortNode, TopologyGraph};

type Endpoint = std::result::Result<PortNode, SkipReason>;
type Tree = std::result::Result<PathTree, SkipReason>;

/// Route engine for one logical device.
pub struct DeviceGraph {
    logical_device_id: String,
    lookup: Arc<dyn DeviceLookup>,
    config: DeviceGraphConfig,
    topology: Mutex<TopologyGraph>,
    routes: RwLock<Arc<RouteTable>>,
}

impl DeviceGraph {
    /// Creates an empty graph. No lookups are made until the first mutation.
    pub fn new(logical_device_id: impl Into<String>, lookup: Arc<dyn DeviceLookup>) -> Self {
        Self {
            logical_device_id: logical_device_id.into(),
            lookup,
            config: DeviceGraphConfig::default(),
            topology: Mutex::new(TopologyGraph::new()),
            routes: RwLock::new(Arc::new(RouteTable::new())),
        }
    }

    /// Replaces the default configuration.
    pub fn with_config(mut self, config: DeviceGraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logical_device_id(&self) -> &str {
        &self.logical_device_id
    }

    pub fn config(&self) -> &DeviceGraphConfig {
        &self.config
    }

    /// Snapshot of the current route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes.read())
    }

    /// Looks up one route in the current snapshot.
    pub fn route(&self, ingress: &str, egress: &str) -> RouteLookup {
        self.routes().lookup(ingress, egress)
    }

    /// Returns true if `ofp_port_no` belongs to a known root logical port.
    pub fn is_root_port(&self, ofp_port_no: u32) -> bool {
        self.routes().is_root_ofp_port(ofp_port_no)
    }

    /// Resolves topology for `ports` and rebuilds the route table from scratch.
    ///
    /// `ports` is the complete logical port set of the logical device and
    /// replaces whatever set the graph held before. Unresolvable devices and
    /// missing backing ports only drop the affected pairs; they are listed in
    /// the returned report.
    pub async fn compute_routes(
        &self,
        ctx: &LookupContext,
        ports: &[LogicalPort],
    ) -> Result<ComputeReport> {
        if ports.is_empty() {
            return Err(GraphError::EmptyPortSet);
        }
        if let Some(port_id) = ports.iter().map(|p| p.id.as_str()).duplicates().next() {
            return Err(GraphError::DuplicatePort {
                port_id: port_id.to_string(),
            });
        }
        if let Some(ofp_port_no) = ports.iter().map(|p| p.ofp_port_no).duplicates().next() {
            let port_id = ports
                .iter()
                .find(|p| p.ofp_port_no == ofp_port_no)
                .map(|p| p.id.clone())
                .unwrap_or_default();
            return Err(GraphError::DuplicateOfpPort {
                ofp_port_no,
                port_id,
            });
        }

        let mut topology = self.topology.lock().await;
        let mut resolver = Resolver::new(self.lookup.as_ref(), ctx, &self.config);
        let mut report = ComputeReport::default();

        let mut endpoints = Vec::with_capacity(ports.len());
        for port in ports {
            endpoints.push(resolver.endpoint(&mut topology, port).await);
        }

        let (roots, leaves): (Vec<_>, Vec<_>) = ports
            .iter()
            .zip(endpoints.iter())
            .partition(|(port, _)| port.root_port);

        let mut table = RouteTable::with_ports(ports.iter().cloned());
        for &(root, root_end) in &roots {
            let tree = path_tree(&topology, root_end);
            for &(leaf, leaf_end) in &leaves {
                match pair_route(&tree, leaf_end) {
                    Ok(route) => {
                        let reverse = route.reversed();
                        table.insert_route(root, leaf, Arc::new(route));
                        table.insert_route(leaf, root, Arc::new(reverse));
                        report.routes_installed += 2;
                    }
                    Err(reason) => {
                        report.skip(&root.id, &leaf.id, reason.clone());
                        report.skip(&leaf.id, &root.id, reason);
                    }
                }
            }
        }
        resolver.finish(&mut report);

        *self.routes.write() = Arc::new(table);

        info!(
            logical_device_id = %self.logical_device_id,
            roots = roots.len(),
            leaves = leaves.len(),
            routes = report.routes_installed,
            skipped = report.skipped.len(),
            lookups = report.lookups,
            "Computed routes"
        );
        Ok(report)
    }

    /// Adds one logical port and installs its routes against the ports
    /// already known, leaving existing routes untouched.
    ///
    /// Fails with [`GraphError::DuplicatePort`] if the id is already known and
    /// with [`GraphError::DuplicateOfpPort`] if its OpenFlow port number is.
    pub async fn add_port(&self, ctx: &LookupContext, port: LogicalPort) -> Result<ComputeReport> {
        let mut topology = self.topology.lock().await;

        let others: Vec<LogicalPort> = {
            let current = self.routes();
            if current.contains_port(&port.id) {
                return Err(GraphError::DuplicatePort { port_id: port.id });
            }
            if let Some(owner) = current.port_by_ofp(port.ofp_port_no) {
                return Err(GraphError::DuplicateOfpPort {
                    ofp_port_no: port.ofp_port_no,
                    port_id: owner.id.clone(),
                });
            }
            current
                .ports()
                .filter(|p| p.root_port != port.root_port)
                .sorted_by(|a, b| a.id.cmp(&b.id))
                .cloned()
                .collect()
        };

        let mut resolver = Resolver::new(self.lookup.as_ref(), ctx, &self.config);
        let mut report = ComputeReport::default();

        let port_end = resolver.endpoint(&mut topology, &port).await;
        let mut other_ends = Vec::with_capacity(others.len());
        for other in &others {
            other_ends.push(resolver.endpoint(&mut topology, other).await);
        }

        let mut installs = Vec::new();
        if port.root_port {
            let tree = path_tree(&topology, &port_end);
            for (leaf, leaf_end) in others.iter().zip(&other_ends) {
                stage_pair(&mut installs, &mut report, &port, leaf, &tree, leaf_end);
            }
        } else {
            for (root, root_end) in others.iter().zip(&other_ends) {
                let tree = path_tree(&topology, root_end);
                stage_pair(&mut installs, &mut report, root, &port, &tree, &port_end);
            }
        }
        resolver.finish(&mut report);
        report.routes_installed = installs.len();

        // Copy-on-write: a reader still holding the previous snapshot forces a
        // full table clone here, so each add is O(routes) while snapshots are
        // outstanding. Bulk loads should go through compute_routes.
        {
            let mut guard = self.routes.write();
            let table = Arc::make_mut(&mut *guard);
            table.insert_port(port.clone());
            for (ingress, egress, route) in installs {
                table.insert_route(ingress, egress, Arc::new(route));
            }
        }

        info!(
            logical_device_id = %self.logical_device_id,
            port = %port,
            routes = report.routes_installed,
            skipped = report.skipped.len(),
            lookups = report.lookups,
            "Added logical port"
        );
        Ok(report)
    }

    /// Removes a logical port and every route touching it.
    ///
    /// Returns false if the port was not known.
    pub async fn remove_port(&self, port_id: &str) -> bool {
        let _topology = self.topology.lock().await;
        let mut guard = self.routes.write();
        if !guard.contains_port(port_id) {
            return false;
        }
        let removed = Arc::make_mut(&mut *guard).remove_port(port_id);
        debug!(logical_device_id = %self.logical_device_id, port_id, "Removed logical port");
        removed
    }

    /// Forgets a memoized device so the next mutation fetches it again.
    ///
    /// Installed routes are kept until the next computation.
    pub async fn invalidate_device(&self, device_id: &str) -> bool {
        self.topology.lock().await.remove_device(device_id)
    }

    /// Forgets every memoized device.
    pub async fn invalidate_all(&self) {
        self.topology.lock().await.clear();
    }

    /// Ids of the devices currently in the topology.
    pub async fn device_ids(&self) -> BTreeSet<String> {
        self.topology.lock().await.device_ids().cloned().collect()
    }

    /// Human-readable dump of topology and routes.
    pub async fn dump(&self) -> String {
        let topology = self.topology.lock().await;
        format!(
            "logical device {}\n{}{}",
            self.logical_device_id,
            topology,
            self.routes()
        )
    }

    /// Logs [`dump`](Self::dump) line by line at debug level.
    pub async fn print(&self) {
        for line in self.dump().await.lines() {
            debug!("{}", line);
        }
    }
}

impl fmt::Debug for DeviceGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceGraph")
            .field("logical_device_id", &self.logical_device_id)
            .field("config", &self.config)
            .field("routes", &self.routes.read().len())
            .finish_non_exhaustive()
    }
}

fn path_tree(topology: &TopologyGraph, root_end: &Endpoint) -> Tree {
    root_end
        .as_ref()
        .map(|node| topology.path_tree(node))
        .map_err(|reason| reason.clone())
}

/// Queues both directions of a (root, leaf) pair, or records why it was skipped.
fn stage_pair<'p>(
    installs: &mut Vec<(&'p LogicalPort, &'p LogicalPort, Route)>,
    report: &mut ComputeReport,
    root: &'p LogicalPort,
    leaf: &'p LogicalPort,
    tree: &Tree,
    leaf_end: &Endpoint,
) {
    match pair_route(tree, leaf_end) {
        Ok(route) => {
            let reverse = route.reversed();
            installs.push((root, leaf, route));
            installs.push((leaf, root, reverse));
        }
        Err(reason) => {
            report.skip(&root.id, &leaf.id, reason.clone());
            report.skip(&leaf.id, &root.id, reason);
        }
    }
}

fn pair_route(tree: &Tree, leaf_end: &Endpoint) -> std::result::Result<Route, SkipReason> {
    let tree = tree.as_ref().map_err(|reason| reason.clone())?;
    let leaf = leaf_end.as_ref().map_err(|reason| reason.clone())?;
    tree.route_to(leaf).ok_or(SkipReason::NoPath)
}

/// Device resolution state for a single mutation.
///
/// Failures are remembered only here, so the next mutation tries again.
struct Resolver<'a> {
    lookup: &'a dyn DeviceLookup,
    ctx: &'a LookupContext,
    config: &'a DeviceGraphConfig,
    failures: BTreeMap<String, LookupError>,
    lookups: usize,
}

impl<'a> Resolver<'a> {
    fn new(lookup: &'a dyn DeviceLookup, ctx: &'a LookupContext, config: &'a DeviceGraphConfig) -> Self {
        Self {
            lookup,
            ctx,
            config,
            failures: BTreeMap::new(),
            lookups: 0,
        }
    }

    /// Ensures `device_id` and every device reachable through declared peers
    /// is in the topology.
    async fn resolve(
        &mut self,
        topology: &mut TopologyGraph,
        device_id: &str,
    ) -> std::result::Result<(), LookupError> {
        let mut pending = VecDeque::from([device_id.to_string()]);
        while let Some(id) = pending.pop_front() {
            if topology.contains_device(&id) || self.failures.contains_key(&id) {
                continue;
            }
            if topology.device_count() >= self.config.max_devices {
                let err = LookupError::DeviceLimit {
                    device_id: id.clone(),
                    limit: self.config.max_devices,
                };
                warn!(%err, "Device not resolved");
                self.failures.insert(id, err);
                continue;
            }

            if self.ctx.is_cancelled() {
                let err = LookupError::Cancelled { device_id: id.clone() };
                debug!(%err, "Device not resolved");
                self.failures.insert(id, err);
                continue;
            }

            self.lookups += 1;
            match fetch_device(self.lookup, self.ctx, &id, self.config.lookup_timeout()).await {
                Ok(device) => {
                    debug!(device_id = %id, ports = device.ports.len(), "Resolved device");
                    pending.extend(topology.insert_device(device));
                }
                Err(err) => {
                    warn!(%err, "Device not resolved");
                    self.failures.insert(id, err);
                }
            }
        }

        match self.failures.get(device_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Resolves the physical port backing a logical port.
    async fn endpoint(&mut self, topology: &mut TopologyGraph, port: &LogicalPort) -> Endpoint {
        self.resolve(topology, &port.device_id)
            .await
            .map_err(SkipReason::DeviceUnresolved)?;

        let node = PortNode::new(port.device_id.clone(), port.device_port_no);
        if !topology.contains_port(&node) {
            warn!(logical_port = %port, "Backing port not found on device");
            return Err(SkipReason::PortNotFound {
                device_id: port.device_id.clone(),
                port_no: port.device_port_no,
            });
        }
        Ok(node)
    }

    fn finish(self, report: &mut ComputeReport) {
        report.lookups = self.lookups;
        report.lookup_failures = self.failures;
    }
}
