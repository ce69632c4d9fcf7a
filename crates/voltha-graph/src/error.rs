//! Error types for device lookup and route computation.
//!
//! Two tiers: [`LookupError`] and [`SkipReason`] are recovered locally and
//! reported through [`crate::ComputeReport`]; [`GraphError`] is a structural
//! misuse that fails the whole call.

use std::time::Duration;
use thiserror::Error;

/// Failure to resolve a device through the lookup capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("device '{device_id}' not found")]
    NotFound { device_id: String },

    #[error("lookup of device '{device_id}' timed out after {after:?}")]
    Timeout { device_id: String, after: Duration },

    #[error("lookup of device '{device_id}' was cancelled")]
    Cancelled { device_id: String },

    #[error("lookup of device '{device_id}' failed: {message}")]
    Transport { device_id: String, message: String },

    #[error("device '{device_id}' not fetched: graph already holds {limit} devices")]
    DeviceLimit { device_id: String, limit: usize },
}

impl LookupError {
    /// Creates a not-found error.
    pub fn not_found(device_id: impl Into<String>) -> Self {
        Self::NotFound {
            device_id: device_id.into(),
        }
    }

    /// Creates a transport error preserving the underlying cause.
    pub fn transport(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            device_id: device_id.into(),
            message: message.into(),
        }
    }

    /// Returns the device id the failure refers to.
    pub fn device_id(&self) -> &str {
        match self {
            LookupError::NotFound { device_id }
            | LookupError::Timeout { device_id, .. }
            | LookupError::Cancelled { device_id }
            | LookupError::Transport { device_id, .. }
            | LookupError::DeviceLimit { device_id, .. } => device_id,
        }
    }

    /// Returns true if the device may resolve on a later attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self, LookupError::NotFound { .. })
    }
}

/// Why a (ingress, egress) pair got no route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("{0}")]
    DeviceUnresolved(LookupError),

    #[error("port {port_no} not found on device '{device_id}'")]
    PortNotFound { device_id: String, port_no: u32 },

    #[error("no path between the backing ports")]
    NoPath,
}

/// Errors that fail a mutation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("logical port set is empty")]
    EmptyPortSet,

    #[error("logical port '{port_id}' is already present")]
    DuplicatePort { port_id: String },

    #[error("OpenFlow port {ofp_port_no} is already assigned to logical port '{port_id}'")]
    DuplicateOfpPort { ofp_port_no: u32, port_id: String },
}

/// Result type for controller mutations.
pub type Result<T> = std::result::Result<T, GraphError>;
