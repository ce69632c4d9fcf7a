//! Records held by the model store.
//!
//! Every record the store can return is one variant of [`ModelRecord`];
//! callers match on it instead of down-casting.

use serde::{Deserialize, Serialize};
use std::fmt;
use voltha_types::Device;

/// Kinds of data kept under the cluster data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataModelType {
    Adapters,
    AlarmFilters,
    CoreInstances,
    DeviceTypes,
    DeviceGroups,
    Devices,
}

impl DataModelType {
    /// Store path segment for this kind.
    pub const fn path(&self) -> &'static str {
        match self {
            DataModelType::Adapters => "adapters",
            DataModelType::AlarmFilters => "alarm_filters",
            DataModelType::CoreInstances => "core_instances",
            DataModelType::DeviceTypes => "device_types",
            DataModelType::DeviceGroups => "device_groups",
            DataModelType::Devices => "devices",
        }
    }
}

impl fmt::Display for DataModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataModelType::Adapters => "Adapters",
            DataModelType::AlarmFilters => "AlarmFilters",
            DataModelType::CoreInstances => "CoreInstances",
            DataModelType::DeviceTypes => "DeviceTypes",
            DataModelType::DeviceGroups => "DeviceGroups",
            DataModelType::Devices => "Devices",
        };
        write!(f, "{}", s)
    }
}

/// A registered device adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adapter {
    pub id: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub version: String,
}

/// A device type an adapter can manage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: String,
    /// Adapter that handles this type.
    pub adapter: String,
    #[serde(default)]
    pub accepts_bulk_flow_update: bool,
    #[serde(default)]
    pub accepts_add_remove_flow_updates: bool,
}

/// A group of devices managed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: String,
    #[serde(default)]
    pub device_ids: Vec<String>,
}

/// A single key/value match inside an alarm filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmFilterRule {
    pub key: String,
    pub value: String,
}

/// Suppresses alarms matching all of its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmFilter {
    pub id: String,
    #[serde(default)]
    pub rules: Vec<AlarmFilterRule>,
}

/// A running core instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreInstance {
    pub instance_id: String,
    #[serde(default)]
    pub healthy: bool,
}

/// Version information of the running core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voltha {
    pub version: String,
}

/// Closed set of records the store can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ModelRecord {
    Adapter(Adapter),
    AlarmFilter(AlarmFilter),
    CoreInstance(CoreInstance),
    DeviceType(DeviceType),
    DeviceGroup(DeviceGroup),
    Device(Device),
}

impl ModelRecord {
    /// Kind the record is stored under.
    pub fn kind(&self) -> DataModelType {
        match self {
            ModelRecord::Adapter(_) => DataModelType::Adapters,
            ModelRecord::AlarmFilter(_) => DataModelType::AlarmFilters,
            ModelRecord::CoreInstance(_) => DataModelType::CoreInstances,
            ModelRecord::DeviceType(_) => DataModelType::DeviceTypes,
            ModelRecord::DeviceGroup(_) => DataModelType::DeviceGroups,
            ModelRecord::Device(_) => DataModelType::Devices,
        }
    }

    /// Key the record is stored under.
    pub fn id(&self) -> &str {
        match self {
            ModelRecord::Adapter(r) => &r.id,
            ModelRecord::AlarmFilter(r) => &r.id,
            ModelRecord::CoreInstance(r) => &r.instance_id,
            ModelRecord::DeviceType(r) => &r.id,
            ModelRecord::DeviceGroup(r) => &r.id,
            ModelRecord::Device(r) => &r.id,
        }
    }
}

impl From<Device> for ModelRecord {
    fn from(device: Device) -> Self {
        ModelRecord::Device(device)
    }
}

impl From<Adapter> for ModelRecord {
    fn from(adapter: Adapter) -> Self {
        ModelRecord::Adapter(adapter)
    }
}

impl From<DeviceType> for ModelRecord {
    fn from(device_type: DeviceType) -> Self {
        ModelRecord::DeviceType(device_type)
    }
}

impl From<AlarmFilter> for ModelRecord {
    fn from(filter: AlarmFilter) -> Self {
        ModelRecord::AlarmFilter(filter)
    }
}
