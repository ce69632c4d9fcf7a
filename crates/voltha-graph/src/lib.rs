//! Device topology graph and route engine for access-network logical devices.
//!
//! A logical device exposes logical ports backed by physical ports on an OLT
//! (network-facing, "root") and on the ONUs wired to it through PON trunks
//! (subscriber-facing, "leaf"). This crate discovers the physical topology by
//! following declared peer links and records, for every root/leaf pair in
//! both directions, the hops a flow takes through the physical devices.
//!
//! - [`DeviceGraph`]: controller with bulk ([`DeviceGraph::compute_routes`])
//!   and incremental ([`DeviceGraph::add_port`]) entry points
//! - [`DeviceLookup`]: the injected capability that fetches device records
//! - [`TopologyGraph`]: port graph built from fetched devices
//! - [`RouteTable`]: (ingress, egress) logical port pair -> [`Route`]
//!
//! # Example
//!
//! ```ignore
//! use voltha_graph::{DeviceGraph, LookupContext};
//!
//! let graph = DeviceGraph::new("ld-1", lookup);
//! let report = graph.compute_routes(&LookupContext::new(), &ports).await?;
//! if let Some(route) = graph.routes().get("nni-0", "uni-12") {
//!     for hop in route.hops() {
//!         // program hop.device_id with hop.ingress_port -> hop.egress_port
//!     }
//! }
//! ```

mod config;
mod device_graph;
mod error;
mod lookup;
mod report;
mod route;
mod topology;

pub use config::{ConfigError, DeviceGraphConfig};
pub use device_graph::DeviceGraph;
pub use error::{GraphError, LookupError, Result, SkipReason};
pub use lookup::{DeviceLookup, LookupContext};
pub use report::{ComputeReport, SkippedPair};
pub use route::{Hop, Route, RouteKey, RouteLookup, RouteTable};
pub use topology::{PathTree, PortNode, TopologyGraph};
