//! Counting device lookup with fault injection

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use voltha_graph::{DeviceLookup, LookupError};
use voltha_types::Device;

use crate::fixtures::PonTopology;

#[derive(Debug, Clone)]
struct Failure {
    error: LookupError,
    /// Remaining failing calls; `None` fails forever
    remaining: Option<usize>,
}

/// In-memory [`DeviceLookup`] that counts calls and can fail or stall
/// selected devices
#[derive(Debug, Default)]
pub struct FixtureLookup {
    devices: HashMap<String, Device>,
    failures: Mutex<HashMap<String, Failure>>,
    delays: HashMap<String, Duration>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    per_device: Mutex<HashMap<String, usize>>,
}

impl FixtureLookup {
    /// Lookup serving `devices`
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
            ..Self::default()
        }
    }

    /// Lookup serving every device of `topology`
    pub fn from_topology(topology: &PonTopology) -> Self {
        Self::new(topology.devices())
    }

    /// Drops a device so lookups for it return not-found
    pub fn without(mut self, device_id: &str) -> Self {
        self.devices.remove(device_id);
        self
    }

    /// Fails every lookup of `device_id` with `error`
    pub fn failing(self, device_id: impl Into<String>, error: LookupError) -> Self {
        self.failures.lock().insert(
            device_id.into(),
            Failure {
                error,
                remaining: None,
            },
        );
        self
    }

    /// Fails the next `times` lookups of `device_id` with `error`
    pub fn failing_times(self, device_id: impl Into<String>, error: LookupError, times: usize) -> Self {
        self.failures.lock().insert(
            device_id.into(),
            Failure {
                error,
                remaining: Some(times),
            },
        );
        self
    }

    /// Delays every lookup by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delays lookups of `device_id` by `delay`, overriding the global delay
    pub fn with_device_delay(mut self, device_id: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(device_id.into(), delay);
        self
    }

    /// Total lookups served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups served for one device
    pub fn calls_for(&self, device_id: &str) -> usize {
        self.per_device.lock().get(device_id).copied().unwrap_or(0)
    }

    /// Highest per-device call count
    pub fn max_calls_per_device(&self) -> usize {
        self.per_device.lock().values().copied().max().unwrap_or(0)
    }

    /// Resets every counter
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.per_device.lock().clear();
    }

    fn injected_failure(&self, device_id: &str) -> Option<LookupError> {
        let mut failures = self.failures.lock();
        let failure = failures.get_mut(device_id)?;
        match failure.remaining {
            None => Some(failure.error.clone()),
            Some(0) => None,
            Some(ref mut n) => {
                *n -= 1;
                Some(failure.error.clone())
            }
        }
    }
}

#[async_trait]
impl DeviceLookup for FixtureLookup {
    async fn get_device(&self, device_id: &str) -> Result<Device, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .per_device
            .lock()
            .entry(device_id.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delays.get(device_id).copied().or(self.delay) {
            debug!(device_id, ?delay, "Delaying fixture lookup");
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.injected_failure(device_id) {
            return Err(err);
        }
        self.devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| LookupError::not_found(device_id))
    }
}
