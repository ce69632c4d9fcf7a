//! routemgrd library
//!
//! Loads a topology snapshot into the model store, resolves it through a
//! device graph and reports the routes of one logical device.

pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod topology;

pub use config::{LoggingConfig, RouteMgrConfig, DEFAULT_CONFIG_PATH};
pub use error::{Result, RouteMgrError};
pub use logging::init_logging;
pub use runner::{run, RunMode, RunOptions, RunSummary};
pub use topology::TopologyFile;
