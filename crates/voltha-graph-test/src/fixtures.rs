//! PON topology fixtures
//!
//! Builds one OLT with a configurable set of NNI and PON ports and a fixed
//! number of ONUs behind each PON port, plus the logical ports a logical
//! device would expose over them.

use voltha_types::{Device, LogicalPort, Port, PortType};

/// Port number of the PON port on every ONU
pub const ONU_PON_PORT: u32 = 1;
/// Port number of the UNI port on every ONU
pub const ONU_UNI_PORT: u32 = 2;

/// One OLT with ONUs fanned out behind its PON ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PonTopology {
    /// OLT device id
    pub olt_id: String,
    /// OLT NNI port numbers, one root logical port each
    pub nni_ports: Vec<u32>,
    /// OLT PON port numbers
    pub pon_ports: Vec<u32>,
    /// ONUs attached to each PON port
    pub onus_per_pon: usize,
}

impl PonTopology {
    /// OLT with no ports
    pub fn new(olt_id: impl Into<String>) -> Self {
        Self {
            olt_id: olt_id.into(),
            nni_ports: Vec::new(),
            pon_ports: Vec::new(),
            onus_per_pon: 0,
        }
    }

    /// The reference layout: OLT "olt" with NNI ports 2 and 3, PON ports 4
    /// and 5, and 256 ONUs on each PON port.
    pub fn standard() -> Self {
        Self::new("olt")
            .with_nni_ports([2, 3])
            .with_pon_ports([4, 5])
            .with_onus_per_pon(256)
    }

    pub fn with_nni_ports(mut self, ports: impl IntoIterator<Item = u32>) -> Self {
        self.nni_ports = ports.into_iter().collect();
        self
    }

    pub fn with_pon_ports(mut self, ports: impl IntoIterator<Item = u32>) -> Self {
        self.pon_ports = ports.into_iter().collect();
        self
    }

    pub fn with_onus_per_pon(mut self, count: usize) -> Self {
        self.onus_per_pon = count;
        self
    }

    /// Total ONU count
    pub fn onu_count(&self) -> usize {
        self.pon_ports.len() * self.onus_per_pon
    }

    /// Id of the ONU with global index `index`
    pub fn onu_id(&self, index: usize) -> String {
        format!("onu{}", index)
    }

    /// OLT PON port the ONU with global index `index` hangs off
    pub fn pon_port_of(&self, index: usize) -> Option<u32> {
        if self.onus_per_pon == 0 {
            return None;
        }
        self.pon_ports.get(index / self.onus_per_pon).copied()
    }

    /// All ONU ids in index order
    pub fn onu_ids(&self) -> Vec<String> {
        (0..self.onu_count()).map(|i| self.onu_id(i)).collect()
    }

    /// OLT device with every PON port listing its ONUs as peers
    pub fn olt(&self) -> Device {
        let mut olt = Device::new(self.olt_id.clone(), "");
        for &port_no in &self.nni_ports {
            olt = olt.with_port(Port::new(self.olt_id.clone(), port_no, PortType::EthernetNni));
        }
        for (p, &port_no) in self.pon_ports.iter().enumerate() {
            let mut pon = Port::new(self.olt_id.clone(), port_no, PortType::PonOlt);
            for j in 0..self.onus_per_pon {
                pon = pon.with_peer(self.onu_id(p * self.onus_per_pon + j), ONU_PON_PORT);
            }
            olt = olt.with_port(pon);
        }
        olt
    }

    /// ONU with global index `index`
    pub fn onu(&self, index: usize) -> Option<Device> {
        let pon_port = self.pon_port_of(index)?;
        let id = self.onu_id(index);
        Some(
            Device::new(id.clone(), self.olt_id.clone())
                .with_port(
                    Port::new(id.clone(), ONU_PON_PORT, PortType::PonOnu)
                        .with_peer(self.olt_id.clone(), pon_port),
                )
                .with_port(Port::new(id, ONU_UNI_PORT, PortType::EthernetUni)),
        )
    }

    /// OLT followed by every ONU
    pub fn devices(&self) -> Vec<Device> {
        std::iter::once(self.olt())
            .chain((0..self.onu_count()).filter_map(|i| self.onu(i)))
            .collect()
    }

    /// `nni-i` root ports, one per NNI port, numbered from OpenFlow port 1
    pub fn root_ports(&self) -> Vec<LogicalPort> {
        self.nni_ports
            .iter()
            .enumerate()
            .map(|(i, &port_no)| {
                LogicalPort::root(format!("nni-{}", i), self.olt_id.clone(), port_no, i as u32 + 1)
            })
            .collect()
    }

    /// `uni-i` leaf ports, one per ONU, numbered after the root ports
    pub fn leaf_ports(&self) -> Vec<LogicalPort> {
        let base = self.nni_ports.len() as u32 + 1;
        (0..self.onu_count())
            .map(|i| {
                LogicalPort::new(format!("uni-{}", i), self.onu_id(i), ONU_UNI_PORT, base + i as u32)
            })
            .collect()
    }

    /// Root ports followed by leaf ports
    pub fn logical_ports(&self) -> Vec<LogicalPort> {
        let mut ports = self.root_ports();
        ports.extend(self.leaf_ports());
        ports
    }

    /// Leaf ports followed by root ports
    pub fn logical_ports_roots_last(&self) -> Vec<LogicalPort> {
        let mut ports = self.leaf_ports();
        ports.extend(self.root_ports());
        ports
    }

    /// Routes a complete computation installs: both directions of every
    /// (root, leaf) pair
    pub fn expected_routes(&self) -> usize {
        2 * self.nni_ports.len() * self.onu_count()
    }

    /// Lookups a cold computation makes: the OLT plus every ONU, once each
    pub fn expected_lookups(&self) -> usize {
        1 + self.onu_count()
    }
}

/// Deterministic permutation of `items`, stable for a given `seed`.
///
/// Uses a linear congruential generator so scenario orderings reproduce
/// without pulling in a random number crate.
pub fn scrambled<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut state = seed;
    for i in (1..items.len()).rev() {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let j = (state >> 33) as usize % (i + 1);
        items.swap(i, j);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let topo = PonTopology::standard();
        assert_eq!(topo.onu_count(), 512);
        assert_eq!(topo.devices().len(), 513);
        assert_eq!(topo.expected_routes(), 2048);
        assert_eq!(topo.expected_lookups(), 513);

        let olt = topo.olt();
        assert_eq!(olt.ports.len(), 4);
        assert_eq!(olt.port(4).map(|p| p.peers.len()), Some(256));
        assert_eq!(topo.pon_port_of(0), Some(4));
        assert_eq!(topo.pon_port_of(256), Some(5));
        assert_eq!(topo.pon_port_of(512), None);
    }

    #[test]
    fn test_logical_ports() {
        let topo = PonTopology::new("olt")
            .with_nni_ports([2])
            .with_pon_ports([4])
            .with_onus_per_pon(2);
        let ports = topo.logical_ports();
        assert_eq!(ports.len(), 3);
        assert!(ports[0].root_port);
        assert_eq!(ports[0].ofp_port_no, 1);
        assert_eq!(ports[2].id, "uni-1");
        assert_eq!(ports[2].device_id, "onu1");
        assert_eq!(ports[2].ofp_port_no, 3);
        assert!(!topo.logical_ports_roots_last()[0].root_port);
    }

    #[test]
    fn test_onu_peers_back_to_olt() {
        let topo = PonTopology::standard();
        let onu = topo.onu(300).unwrap();
        let pon = onu.port(ONU_PON_PORT).unwrap();
        assert_eq!(pon.peers[0].device_id, "olt");
        assert_eq!(pon.peers[0].port_no, 5);
    }

    #[test]
    fn test_scrambled_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut shuffled = scrambled(items.clone(), 7);
        assert_ne!(shuffled, items);
        assert_eq!(shuffled, scrambled(items.clone(), 7));
        shuffled.sort();
        assert_eq!(shuffled, items);
    }
}
