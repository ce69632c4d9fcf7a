//! Test infrastructure for the device graph
//!
//! Provides:
//! - PON topology fixtures (OLT, ONUs, logical ports)
//! - A counting, fault-injecting device lookup
//! - Route table verification helpers

pub mod fixtures;
mod lookup;
mod verification;

pub use fixtures::*;
pub use lookup::FixtureLookup;
pub use verification::*;
