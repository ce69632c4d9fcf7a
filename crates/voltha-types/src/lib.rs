//! Common record types for the access-network control plane.
//!
//! These are snapshots of what the model store holds about physical
//! devices and the logical ports exposed on top of them:
//!
//! - [`Device`]: a physical network element (OLT or ONU) and its ports
//! - [`Port`]: a physical port with its declared [`PeerPort`] wiring
//! - [`PortType`]: network-facing, trunk and subscriber-facing roles
//! - [`LogicalPort`]: an externally addressable port backed by a physical port

mod device;
mod logical_port;

pub use device::{Device, PeerPort, Port, PortType};
pub use logical_port::LogicalPort;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid port type: {0}")]
    InvalidPortType(String),

    #[error("invalid peer reference: {0} (expected <device>:<port>)")]
    InvalidPeer(String),
}
