//! Device lookup capability consumed by the graph.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use voltha_types::Device;

use crate::error::LookupError;

/// Resolves a device id to its full record.
///
/// Implementations may be a local cache, an RPC client or a read through the
/// model proxy. The graph never retries; retry policy belongs here.
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    /// Returns the device with `device_id`, or [`LookupError::NotFound`].
    async fn get_device(&self, device_id: &str) -> Result<Device, LookupError>;
}

/// Caller-supplied bounds for the lookups issued by one mutation.
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl LookupContext {
    /// Creates an unbounded context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an absolute deadline for every lookup made under this context.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Ties this context to an external cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns true once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time a single lookup may take: the smaller of `per_lookup` and what is
    /// left before the deadline.
    pub(crate) fn budget(&self, per_lookup: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => per_lookup.min(deadline.saturating_duration_since(Instant::now())),
            None => per_lookup,
        }
    }
}

/// Runs one bounded lookup.
pub(crate) async fn fetch_device(
    lookup: &dyn DeviceLookup,
    ctx: &LookupContext,
    device_id: &str,
    per_lookup: Duration,
) -> Result<Device, LookupError> {
    if ctx.is_cancelled() {
        return Err(LookupError::Cancelled {
            device_id: device_id.to_string(),
        });
    }

    let budget = ctx.budget(per_lookup);
    debug!(device_id, ?budget, "Fetching device");

    let device = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => {
            return Err(LookupError::Cancelled {
                device_id: device_id.to_string(),
            });
        }
        res = tokio::time::timeout(budget, lookup.get_device(device_id)) => match res {
            Ok(res) => res?,
            Err(_) => {
                return Err(LookupError::Timeout {
                    device_id: device_id.to_string(),
                    after: budget,
                });
            }
        },
    };

    if device.id != device_id {
        return Err(LookupError::transport(
            device_id,
            format!("lookup returned device '{}'", device.id),
        ));
    }
    Ok(device)
}
