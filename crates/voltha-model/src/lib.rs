//! Data model access for the core.
//!
//! Records live in a shared [`MemoryStore`] keyed by kind and id.
//! [`ModelProxyManager`] hands out typed views of them and implements
//! [`voltha_graph::DeviceLookup`] so a device graph can resolve devices
//! straight from the model.

mod error;
mod manager;
mod record;
mod store;

pub use error::{ModelError, Result};
pub use manager::{ModelProxyManager, SENTINEL_ADAPTER_ID};
pub use record::{
    Adapter, AlarmFilter, AlarmFilterRule, CoreInstance, DataModelType, DeviceGroup, DeviceType,
    ModelRecord, Voltha,
};
pub use store::{MemoryStore, ModelProxy};
