//! Typed accessors over the model store.
//!
//! [`ModelProxyManager`] creates one [`ModelProxy`] per kind on first use and
//! turns raw store values into typed records. It also serves as the
//! [`DeviceLookup`] a [`DeviceGraph`](voltha_graph::DeviceGraph) resolves
//! devices through.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use voltha_graph::{DeviceLookup, LookupError};
use voltha_types::Device;

use crate::error::{ModelError, Result};
use crate::record::{
    Adapter, AlarmFilter, CoreInstance, DataModelType, DeviceGroup, DeviceType, ModelRecord,
    Voltha,
};
use crate::store::{MemoryStore, ModelProxy};

/// Adapter entry written as a placeholder; never returned from listings.
pub const SENTINEL_ADAPTER_ID: &str = "adapter_sentinel";

/// Typed access to every model kind.
#[derive(Debug)]
pub struct ModelProxyManager {
    store: MemoryStore,
    proxies: Mutex<HashMap<DataModelType, Arc<ModelProxy>>>,
}

impl ModelProxyManager {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            proxies: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Proxy for `kind`, created on first request.
    pub fn proxy(&self, kind: DataModelType) -> Arc<ModelProxy> {
        let mut proxies = self.proxies.lock();
        Arc::clone(proxies.entry(kind).or_insert_with(|| {
            trace!(%kind, path = kind.path(), "Creating model proxy");
            Arc::new(ModelProxy::new(kind, self.store.clone()))
        }))
    }

    /// Registered adapters, without the sentinel entry.
    pub fn list_adapters(&self) -> Result<Vec<Adapter>> {
        let adapters = self
            .list_kind(DataModelType::Adapters)?
            .into_iter()
            .filter_map(|record| match record {
                ModelRecord::Adapter(a) if a.id != SENTINEL_ADAPTER_ID => Some(a),
                _ => None,
            })
            .collect();
        Ok(adapters)
    }

    pub fn get_device_type(&self, id: &str) -> Result<DeviceType> {
        match self.single(DataModelType::DeviceTypes, id)? {
            ModelRecord::DeviceType(t) => Ok(t),
            other => Err(wrong_kind(DataModelType::DeviceTypes, &other)),
        }
    }

    pub fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        Ok(self
            .list_kind(DataModelType::DeviceTypes)?
            .into_iter()
            .filter_map(|record| match record {
                ModelRecord::DeviceType(t) => Some(t),
                _ => None,
            })
            .collect())
    }

    pub fn get_device_group(&self, id: &str) -> Result<DeviceGroup> {
        match self.single(DataModelType::DeviceGroups, id)? {
            ModelRecord::DeviceGroup(g) => Ok(g),
            other => Err(wrong_kind(DataModelType::DeviceGroups, &other)),
        }
    }

    pub fn list_device_groups(&self) -> Result<Vec<DeviceGroup>> {
        Ok(self
            .list_kind(DataModelType::DeviceGroups)?
            .into_iter()
            .filter_map(|record| match record {
                ModelRecord::DeviceGroup(g) => Some(g),
                _ => None,
            })
            .collect())
    }

    pub fn get_alarm_filter(&self, id: &str) -> Result<AlarmFilter> {
        match self.single(DataModelType::AlarmFilters, id)? {
            ModelRecord::AlarmFilter(f) => Ok(f),
            other => Err(wrong_kind(DataModelType::AlarmFilters, &other)),
        }
    }

    pub fn list_alarm_filters(&self) -> Result<Vec<AlarmFilter>> {
        Ok(self
            .list_kind(DataModelType::AlarmFilters)?
            .into_iter()
            .filter_map(|record| match record {
                ModelRecord::AlarmFilter(f) => Some(f),
                _ => None,
            })
            .collect())
    }

    pub fn list_core_instances(&self) -> Result<Vec<CoreInstance>> {
        Ok(self
            .list_kind(DataModelType::CoreInstances)?
            .into_iter()
            .filter_map(|record| match record {
                ModelRecord::CoreInstance(c) => Some(c),
                _ => None,
            })
            .collect())
    }

    pub fn get_core_instance(&self, id: &str) -> Result<CoreInstance> {
        match self.single(DataModelType::CoreInstances, id)? {
            ModelRecord::CoreInstance(c) => Ok(c),
            other => Err(wrong_kind(DataModelType::CoreInstances, &other)),
        }
    }

    /// Version of this build; not backed by the store.
    pub fn get_voltha(&self) -> Voltha {
        Voltha {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn get_device(&self, id: &str) -> Result<Device> {
        match self.single(DataModelType::Devices, id)? {
            ModelRecord::Device(d) => Ok(d),
            other => Err(wrong_kind(DataModelType::Devices, &other)),
        }
    }

    /// Exactly one record under `id`.
    fn single(&self, kind: DataModelType, id: &str) -> Result<ModelRecord> {
        debug!(%kind, id, "Model get");
        let mut values = self
            .proxy(kind)
            .get(id)
            .ok_or_else(|| ModelError::not_found(kind, id))?;
        if values.len() > 1 {
            return Err(ModelError::MultipleValues {
                kind,
                id: id.to_string(),
                count: values.len(),
            });
        }
        values.pop().ok_or_else(|| ModelError::not_found(kind, id))
    }

    /// Every record of `kind`; an empty kind is reported as not found.
    fn list_kind(&self, kind: DataModelType) -> Result<Vec<ModelRecord>> {
        debug!(%kind, "Model list");
        let values = self.proxy(kind).list();
        if values.is_empty() {
            return Err(ModelError::not_found(kind, kind.path()));
        }
        Ok(values)
    }
}

fn wrong_kind(expected: DataModelType, found: &ModelRecord) -> ModelError {
    ModelError::WrongKind {
        expected,
        found: found.kind(),
        id: found.id().to_string(),
    }
}

#[async_trait]
impl DeviceLookup for ModelProxyManager {
    async fn get_device(&self, device_id: &str) -> std::result::Result<Device, LookupError> {
        ModelProxyManager::get_device(self, device_id).map_err(|err| match err {
            ModelError::NotFound { .. } => LookupError::not_found(device_id),
            other => LookupError::transport(device_id, other.to_string()),
        })
    }
}
