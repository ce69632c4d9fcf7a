//! Physical topology graph.
//!
//! Nodes are device ports, edges are the peer links each port declares.
//! Devices are added one snapshot at a time as they are resolved, so an edge
//! may point at a device that is not in the graph yet. Traversal treats a
//! link as usable from either end, which keeps paths intact when only one
//! side of a link declares it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use voltha_types::Device;

use crate::route::{Hop, Route};

/// A physical port: (device id, port number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortNode {
    pub device_id: String,
    pub port_no: u32,
}

impl PortNode {
    pub fn new(device_id: impl Into<String>, port_no: u32) -> Self {
        Self {
            device_id: device_id.into(),
            port_no,
        }
    }
}

impl fmt::Display for PortNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_id, self.port_no)
    }
}

/// In-memory port graph built from resolved device snapshots.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    devices: HashMap<String, Arc<Device>>,
    /// Declared edges: port -> peers it names.
    edges: BTreeMap<PortNode, BTreeSet<PortNode>>,
    /// Reverse index: peer -> ports that name it.
    reverse: HashMap<PortNode, BTreeSet<PortNode>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_device(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    pub fn device(&self, device_id: &str) -> Option<&Arc<Device>> {
        self.devices.get(device_id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &String> {
        self.devices.keys()
    }

    /// Number of declared edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Returns true if `node` names a port on a device in the graph.
    pub fn contains_port(&self, node: &PortNode) -> bool {
        self.devices
            .get(&node.device_id)
            .is_some_and(|d| d.has_port(node.port_no))
    }

    /// Adds a device snapshot and its declared peer edges.
    ///
    /// Returns the ids of peer devices not yet in the graph, sorted and
    /// deduplicated. A device already present is left untouched.
    pub fn insert_device(&mut self, device: Device) -> Vec<String> {
        if self.devices.contains_key(&device.id) {
            return Vec::new();
        }

        let mut unseen = BTreeSet::new();
        for port in &device.ports {
            let node = PortNode::new(device.id.clone(), port.port_no);
            let peers = self.edges.entry(node.clone()).or_default();
            for peer in &port.peers {
                let peer_node = PortNode::new(peer.device_id.clone(), peer.port_no);
                self.reverse
                    .entry(peer_node.clone())
                    .or_default()
                    .insert(node.clone());
                peers.insert(peer_node);
                if peer.device_id != device.id && !self.devices.contains_key(&peer.device_id) {
                    unseen.insert(peer.device_id.clone());
                }
            }
        }

        self.devices.insert(device.id.clone(), Arc::new(device));
        unseen.into_iter().collect()
    }

    /// Removes a device and the edges it declared.
    ///
    /// Edges declared by other devices towards it stay, so re-adding the
    /// device restores connectivity.
    pub fn remove_device(&mut self, device_id: &str) -> bool {
        let Some(device) = self.devices.remove(device_id) else {
            return false;
        };
        for port in &device.ports {
            let node = PortNode::new(device_id, port.port_no);
            let Some(peers) = self.edges.remove(&node) else {
                continue;
            };
            for peer in peers {
                if let Some(declarers) = self.reverse.get_mut(&peer) {
                    declarers.remove(&node);
                    if declarers.is_empty() {
                        self.reverse.remove(&peer);
                    }
                }
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.devices.clear();
        self.edges.clear();
        self.reverse.clear();
    }

    /// Ports linked to `node`, whichever side declared the link.
    pub fn links(&self, node: &PortNode) -> BTreeSet<&PortNode> {
        let declared = self.edges.get(node).into_iter().flatten();
        let declaring = self.reverse.get(node).into_iter().flatten();
        declared.chain(declaring).collect()
    }

    /// Walks outward from `source` and records how every reachable device
    /// was entered.
    ///
    /// Only links whose far end is a real port on a resolved device are
    /// followed. Each device is visited once, so cycles terminate.
    pub fn path_tree(&self, source: &PortNode) -> PathTree {
        let mut arrivals = HashMap::new();
        let mut visited = HashSet::from([source.device_id.as_str()]);
        let mut queue = VecDeque::from([source.device_id.as_str()]);

        while let Some(device_id) = queue.pop_front() {
            let Some(device) = self.devices.get(device_id) else {
                continue;
            };
            for port in &device.ports {
                let node = PortNode::new(device_id, port.port_no);
                for peer in self.links(&node) {
                    if visited.contains(peer.device_id.as_str()) || !self.contains_port(peer) {
                        continue;
                    }
                    visited.insert(peer.device_id.as_str());
                    arrivals.insert(
                        peer.device_id.clone(),
                        Arrival {
                            from_device: device_id.to_string(),
                            egress: port.port_no,
                            ingress: peer.port_no,
                        },
                    );
                    queue.push_back(peer.device_id.as_str());
                }
            }
        }

        PathTree {
            source: source.clone(),
            arrivals,
        }
    }
}

impl fmt::Display for TopologyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.devices.keys().collect();
        ids.sort();
        writeln!(f, "devices ({}):", ids.len())?;
        for id in ids {
            let device = &self.devices[id];
            writeln!(f, "  {} parent='{}'", id, device.parent_id)?;
            for port in &device.ports {
                write!(f, "    port {} [{}]", port.port_no, port.port_type)?;
                let node = PortNode::new(id.as_str(), port.port_no);
                let links = self.links(&node);
                if !links.is_empty() {
                    let peers: Vec<String> = links.iter().map(|p| p.to_string()).collect();
                    write!(f, " -> {}", peers.join(", "))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Arrival {
    from_device: String,
    /// Port left on `from_device`.
    egress: u32,
    /// Port entered on the arriving device.
    ingress: u32,
}

/// Single-source traversal result, used to extract paths to many targets.
#[derive(Debug, Clone)]
pub struct PathTree {
    source: PortNode,
    arrivals: HashMap<String, Arrival>,
}

impl PathTree {
    pub fn source(&self) -> &PortNode {
        &self.source
    }

    /// Returns true if `device_id` was reached.
    pub fn reaches(&self, device_id: &str) -> bool {
        device_id == self.source.device_id || self.arrivals.contains_key(device_id)
    }

    /// Builds the route from the source port to `target`.
    ///
    /// The caller is expected to have checked that `target` exists.
    pub fn route_to(&self, target: &PortNode) -> Option<Route> {
        if *target == self.source {
            return None;
        }

        let mut hops = Vec::new();
        let mut device_id = target.device_id.as_str();
        let mut egress = target.port_no;
        while device_id != self.source.device_id {
            let arrival = self.arrivals.get(device_id)?;
            hops.push(Hop::new(device_id, arrival.ingress, egress));
            egress = arrival.egress;
            device_id = arrival.from_device.as_str();
        }
        hops.push(Hop::new(device_id, self.source.port_no, egress));
        hops.reverse();

        Some(Route::new(hops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use voltha_types::{Port, PortType};

    fn olt(onus: &[&str]) -> Device {
        let mut pon = Port::new("olt", 4, PortType::PonOlt);
        for onu in onus {
            pon = pon.with_peer(*onu, 1);
        }
        Device::new("olt", "")
            .with_port(Port::new("olt", 2, PortType::EthernetNni))
            .with_port(pon)
    }

    fn onu(id: &str) -> Device {
        Device::new(id, "olt")
            .with_port(Port::new(id, 1, PortType::PonOnu).with_peer("olt", 4))
            .with_port(Port::new(id, 2, PortType::EthernetUni))
    }

    #[test]
    fn test_insert_reports_unseen_peers() {
        let mut graph = TopologyGraph::new();
        let unseen = graph.insert_device(olt(&["onu1", "onu0", "onu1"]));
        assert_eq!(unseen, vec!["onu0".to_string(), "onu1".to_string()]);

        let unseen = graph.insert_device(onu("onu0"));
        assert!(unseen.is_empty());

        // Second insert is a no-op.
        assert!(graph.insert_device(olt(&["onu9"])).is_empty());
        assert_eq!(graph.device_count(), 2);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_route_root_to_leaf() {
        let mut graph = TopologyGraph::new();
        graph.insert_device(olt(&["onu0", "onu1"]));
        graph.insert_device(onu("onu0"));
        graph.insert_device(onu("onu1"));

        let tree = graph.path_tree(&PortNode::new("olt", 2));
        let route = tree.route_to(&PortNode::new("onu1", 2)).unwrap();
        assert_eq!(
            route.hops(),
            &[Hop::new("olt", 2, 4), Hop::new("onu1", 1, 2)]
        );

        let back = route.reversed();
        assert_eq!(back.hops(), &[Hop::new("onu1", 2, 1), Hop::new("olt", 4, 2)]);
    }

    #[test]
    fn test_one_sided_link_is_traversable() {
        // The OLT does not list the ONU; only the ONU declares the link.
        let mut graph = TopologyGraph::new();
        graph.insert_device(olt(&[]));
        graph.insert_device(onu("onu0"));

        let tree = graph.path_tree(&PortNode::new("olt", 2));
        assert!(tree.reaches("onu0"));
        let route = tree.route_to(&PortNode::new("onu0", 2)).unwrap();
        assert_eq!(route.hops()[1], Hop::new("onu0", 1, 2));
    }

    #[test]
    fn test_bogus_peer_port_ignored() {
        // OLT names a port the ONU does not have; the ONU's own declaration wins.
        let mut graph = TopologyGraph::new();
        let bad = Device::new("olt", "")
            .with_port(Port::new("olt", 2, PortType::EthernetNni))
            .with_port(Port::new("olt", 4, PortType::PonOlt).with_peer("onu0", 4));
        graph.insert_device(bad);
        graph.insert_device(onu("onu0"));

        let route = graph
            .path_tree(&PortNode::new("olt", 2))
            .route_to(&PortNode::new("onu0", 2))
            .unwrap();
        assert_eq!(route.hops()[1], Hop::new("onu0", 1, 2));
    }

    #[test]
    fn test_cycle_terminates() {
        let a = Device::new("a", "")
            .with_port(Port::new("a", 1, PortType::EthernetNni))
            .with_port(Port::new("a", 2, PortType::PonOlt).with_peer("b", 1));
        let b = Device::new("b", "a")
            .with_port(Port::new("b", 1, PortType::PonOnu).with_peer("a", 2))
            .with_port(Port::new("b", 2, PortType::PonOlt).with_peer("c", 1));
        let c = Device::new("c", "b")
            .with_port(Port::new("c", 1, PortType::PonOnu).with_peer("a", 2))
            .with_port(Port::new("c", 2, PortType::EthernetUni));

        let mut graph = TopologyGraph::new();
        graph.insert_device(a);
        graph.insert_device(b);
        graph.insert_device(c);

        let route = graph
            .path_tree(&PortNode::new("a", 1))
            .route_to(&PortNode::new("c", 2))
            .unwrap();
        assert_eq!(route.hops(), &[Hop::new("a", 1, 2), Hop::new("c", 1, 2)]);
    }

    #[test]
    fn test_unreachable_and_same_port() {
        let mut graph = TopologyGraph::new();
        graph.insert_device(olt(&["onu0"]));
        graph.insert_device(onu("onu5"));
        let tree = graph.path_tree(&PortNode::new("olt", 2));

        // onu5 names port 4 on the OLT, so it is reachable.
        assert!(tree.reaches("onu5"));
        assert!(tree.route_to(&PortNode::new("ghost", 2)).is_none());
        assert!(tree.route_to(&PortNode::new("olt", 2)).is_none());

        let same_device = tree.route_to(&PortNode::new("olt", 4)).unwrap();
        assert_eq!(same_device.hops(), &[Hop::new("olt", 2, 4)]);
    }

    #[test]
    fn test_remove_device_keeps_foreign_edges() {
        let mut graph = TopologyGraph::new();
        graph.insert_device(olt(&["onu0"]));
        graph.insert_device(onu("onu0"));
        assert_eq!(graph.edge_count(), 2);

        assert!(graph.remove_device("onu0"));
        assert!(!graph.remove_device("onu0"));
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.path_tree(&PortNode::new("olt", 2)).reaches("onu0"));

        graph.insert_device(onu("onu0"));
        assert!(graph.path_tree(&PortNode::new("olt", 2)).reaches("onu0"));
    }
}
