//! Physical device and port records.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of a physical device port.
///
/// Mirrors the port classes reported by the southbound adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    /// Port type not reported by the adapter.
    #[default]
    Unknown,
    /// Network-facing Ethernet port on the aggregation device.
    EthernetNni,
    /// Subscriber-facing Ethernet port on an ONU.
    EthernetUni,
    /// Point-to-multipoint trunk port on the OLT.
    PonOlt,
    /// Trunk-side port on an ONU.
    PonOnu,
    /// Virtual Ethernet port on the OLT.
    VenetOlt,
    /// Virtual Ethernet port on an ONU.
    VenetOnu,
}

impl PortType {
    /// Returns true if this port faces the upstream network.
    pub const fn is_network_facing(&self) -> bool {
        matches!(self, PortType::EthernetNni)
    }

    /// Returns true if this port faces a subscriber.
    pub const fn is_subscriber_facing(&self) -> bool {
        matches!(self, PortType::EthernetUni)
    }

    /// Returns true if this port sits on the shared PON medium.
    pub const fn is_trunk(&self) -> bool {
        matches!(self, PortType::PonOlt | PortType::PonOnu)
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortType::Unknown => "unknown",
            PortType::EthernetNni => "ethernet_nni",
            PortType::EthernetUni => "ethernet_uni",
            PortType::PonOlt => "pon_olt",
            PortType::PonOnu => "pon_onu",
            PortType::VenetOlt => "venet_olt",
            PortType::VenetOnu => "venet_onu",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PortType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(PortType::Unknown),
            "ethernet_nni" | "nni" => Ok(PortType::EthernetNni),
            "ethernet_uni" | "uni" => Ok(PortType::EthernetUni),
            "pon_olt" => Ok(PortType::PonOlt),
            "pon_onu" => Ok(PortType::PonOnu),
            "venet_olt" => Ok(PortType::VenetOlt),
            "venet_onu" => Ok(PortType::VenetOnu),
            _ => Err(ParseError::InvalidPortType(s.to_string())),
        }
    }
}

/// A declared physical wiring from one port to a port on another device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerPort {
    /// Device at the far end of the link.
    pub device_id: String,
    /// Port number on the far device.
    pub port_no: u32,
}

impl PeerPort {
    pub fn new(device_id: impl Into<String>, port_no: u32) -> Self {
        Self {
            device_id: device_id.into(),
            port_no,
        }
    }
}

impl fmt::Display for PeerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_id, self.port_no)
    }
}

impl FromStr for PeerPort {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device_id, port_no) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidPeer(s.to_string()))?;
        if device_id.is_empty() {
            return Err(ParseError::InvalidPeer(s.to_string()));
        }
        let port_no = port_no
            .parse()
            .map_err(|_| ParseError::InvalidPeer(s.to_string()))?;
        Ok(Self::new(device_id, port_no))
    }
}

/// A physical port on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port number, unique within the owning device.
    pub port_no: u32,
    /// Owning device.
    pub device_id: String,
    /// Port role.
    #[serde(rename = "type", default)]
    pub port_type: PortType,
    /// Declared peers. Trunk ports on the OLT carry one per attached ONU.
    #[serde(default)]
    pub peers: Vec<PeerPort>,
}

impl Port {
    /// Creates a port with no peers.
    pub fn new(device_id: impl Into<String>, port_no: u32, port_type: PortType) -> Self {
        Self {
            port_no,
            device_id: device_id.into(),
            port_type,
            peers: Vec::new(),
        }
    }

    /// Adds a peer link.
    pub fn with_peer(mut self, device_id: impl Into<String>, port_no: u32) -> Self {
        self.peers.push(PeerPort::new(device_id, port_no));
        self
    }

    /// Returns the peer entry that points at `device_id`, if any.
    pub fn peer_on(&self, device_id: &str) -> Option<&PeerPort> {
        self.peers.iter().find(|p| p.device_id == device_id)
    }
}

/// A physical device snapshot as held by the model store.
///
/// Never mutated by the route engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Unique device id.
    pub id: String,
    /// Parent device id; empty for the root aggregation device.
    #[serde(default)]
    pub parent_id: String,
    /// Ports in adapter-reported order.
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl Device {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            ports: Vec::new(),
        }
    }

    /// Appends a port.
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Returns true if this device has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// Looks up a port by number.
    pub fn port(&self, port_no: u32) -> Option<&Port> {
        self.ports.iter().find(|p| p.port_no == port_no)
    }

    /// Returns true if the device has a port with this number.
    pub fn has_port(&self, port_no: u32) -> bool {
        self.port(port_no).is_some()
    }
}
