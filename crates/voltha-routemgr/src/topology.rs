//! Topology snapshot file
//!
//! A JSON document holding the devices of one logical device and the
//! logical ports it exposes:
//!
//! ```json
//! {
//!   "logical_device_id": "ld-olt",
//!   "devices": [{ "id": "olt", "ports": [...] }, ...],
//!   "logical_ports": [{ "id": "nni-0", "device_id": "olt", ... }, ...]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use voltha_model::MemoryStore;
use voltha_types::{Device, LogicalPort};

use crate::error::{Result, RouteMgrError};

fn default_logical_device_id() -> String {
    "ld-1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyFile {
    #[serde(default = "default_logical_device_id")]
    pub logical_device_id: String,
    #[serde(default)]
    pub devices: Vec<Device>,
    pub logical_ports: Vec<LogicalPort>,
}

impl TopologyFile {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let topology: Self = serde_json::from_str(content)?;
        topology.validate()?;
        Ok(topology)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RouteMgrError::TopologyIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Rejects snapshots that name the same device twice.
    ///
    /// Duplicate logical ports are left for the graph to reject.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.id.as_str()) {
                return Err(RouteMgrError::TopologyInvalid(format!(
                    "device '{}' listed more than once",
                    device.id
                )));
            }
        }
        Ok(())
    }

    /// Writes every device into `store`.
    pub fn seed(&self, store: &MemoryStore) {
        for device in &self.devices {
            store.put(device.clone());
        }
    }
}
