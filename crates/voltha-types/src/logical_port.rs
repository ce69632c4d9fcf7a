//! Logical ports exposed by a logical device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An externally addressable port over which flows are installed.
///
/// Supplied by the caller; the route engine never discovers these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalPort {
    /// Logical port id (e.g. "nni-0", "uni-17").
    pub id: String,
    /// Backing physical device.
    pub device_id: String,
    /// Backing physical port number on `device_id`.
    pub device_port_no: u32,
    /// True for network-facing ports.
    #[serde(default)]
    pub root_port: bool,
    /// OpenFlow port number assigned by the flow layer. Opaque here.
    pub ofp_port_no: u32,
}

impl LogicalPort {
    /// Creates a non-root logical port.
    pub fn new(
        id: impl Into<String>,
        device_id: impl Into<String>,
        device_port_no: u32,
        ofp_port_no: u32,
    ) -> Self {
        Self {
            id: id.into(),
            device_id: device_id.into(),
            device_port_no,
            root_port: false,
            ofp_port_no,
        }
    }

    /// Creates a root (network-facing) logical port.
    pub fn root(
        id: impl Into<String>,
        device_id: impl Into<String>,
        device_port_no: u32,
        ofp_port_no: u32,
    ) -> Self {
        Self {
            root_port: true,
            ..Self::new(id, device_id, device_port_no, ofp_port_no)
        }
    }
}

impl fmt::Display for LogicalPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}:{}{})",
            self.id,
            self.device_id,
            self.device_port_no,
            if self.root_port { ", root" } else { "" }
        )
    }
}
