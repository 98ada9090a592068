// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-device status cache and request coalescer.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::config::BridgeConfig;
use crate::error::{DeviceError, Error, ProtocolError};
use crate::event::{BridgeEvent, DeviceId, EventBus};
use crate::protocol::{HttpTransport, Transport};
use crate::state::DeviceStatus;
use crate::types::{OutputIndex, OutputState};

/// Maximum age of a cached status served to a non-forced read. Doubles
/// as the re-poll interval: a device is polled exactly as often as its
/// cache expires.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(30);

/// How long a failed state write is held back before it is reported,
/// giving the device time to settle before the host re-reads.
pub const WRITE_FAILURE_BACKOFF: Duration = Duration::from_secs(3);

/// Per-device cache slot. The entry mutex guards the fetch state
/// machine; the at-most-one-in-flight invariant rests on `in_flight`
/// being checked and set under that lock.
struct DeviceSlot {
    address: String,
    transport: Arc<dyn Transport>,
    entry: Mutex<CacheEntry>,
}

/// Mutable fetch state for one device.
///
/// `waiters` is non-empty only while a fetch is outstanding; it is
/// swapped out wholesale when the fetch resolves so every queued caller
/// is served from the same completion, in enqueue order.
#[derive(Default)]
struct CacheEntry {
    status: Option<DeviceStatus>,
    fetched_at: Option<Instant>,
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Result<DeviceStatus, Error>>>,
    refresh_timer: Option<JoinHandle<()>>,
}

struct CacheInner {
    devices: HashMap<DeviceId, DeviceSlot>,
    freshness: Duration,
    write_backoff: Duration,
    push_updates: bool,
    events: EventBus,
}

/// Per-device status cache with request coalescing.
///
/// The cache is a cheap-to-clone shared handle; clones operate on the
/// same device table. Devices are registered once at construction and
/// never change afterward.
///
/// # Examples
///
/// ```no_run
/// use shellor_lib::cache::StatusCache;
/// use shellor_lib::config::BridgeConfig;
/// use shellor_lib::event::DeviceId;
///
/// # async fn example() -> shellor_lib::Result<()> {
/// let config = BridgeConfig::from_json(
///     r#"{"devices": [{"name": "Hall", "ip": "10.0.0.9"}]}"#,
/// )?;
/// let cache = StatusCache::from_config(&config)?;
///
/// let status = cache.read(&DeviceId::indexed(0), false).await?;
/// if let Some(output) = status.output(0) {
///     println!("Hall is {}", if output.power { "on" } else { "off" });
/// }
/// # Ok(())
/// # }
/// ```
pub struct StatusCache {
    inner: Arc<CacheInner>,
}

impl StatusCache {
    /// Builds a cache from a validated bridge configuration, creating an
    /// HTTP transport per device. Device IDs are assigned by
    /// configuration position.
    ///
    /// When a notification port is configured the cache runs in push
    /// mode and never schedules polling timers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an invalid device set and transport
    /// errors if an HTTP client cannot be created.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut builder = Self::builder().with_push_updates(config.push_updates());
        for (index, device) in config.devices.iter().enumerate() {
            builder = builder.add_device(
                DeviceId::indexed(index),
                device.ip.clone(),
                Arc::new(HttpTransport::for_device(device)?),
            );
        }
        Ok(builder.build())
    }

    /// Creates a cache builder for custom transports or tuning.
    #[must_use]
    pub fn builder() -> StatusCacheBuilder {
        StatusCacheBuilder::new()
    }

    // =========================================================================
    // Host adapter interface
    // =========================================================================

    /// Reads a device's status.
    ///
    /// A non-forced read inside the freshness window is served from the
    /// cache without touching the network. Otherwise the caller either
    /// joins an already outstanding fetch or starts one; concurrent
    /// callers of the same device always share a single request and all
    /// receive its result.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for an unregistered device, or
    /// the fetch error shared by every caller queued on the failed
    /// request.
    pub async fn read(&self, id: &DeviceId, forced: bool) -> Result<DeviceStatus, Error> {
        let slot = self.inner.devices.get(id).ok_or(Error::DeviceNotFound)?;

        let rx = {
            let mut entry = slot.entry.lock();

            if !forced
                && let (Some(status), Some(fetched_at)) = (&entry.status, entry.fetched_at)
                && fetched_at.elapsed() < self.inner.freshness
            {
                tracing::debug!(device = %id, "Returning cached status");
                return Ok(status.clone());
            }

            let (tx, rx) = oneshot::channel();

            if entry.in_flight {
                // A fetch is already outstanding; join its queue instead
                // of issuing a second request.
                tracing::debug!(device = %id, "Queueing caller on in-flight fetch");
                entry.waiters.push(tx);
            } else {
                entry.in_flight = true;
                entry.waiters.push(tx);
                if let Some(timer) = entry.refresh_timer.take() {
                    timer.abort();
                }
                self.spawn_fetch(id.clone());
            }

            rx
        };

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::ChannelClosed(
                "status fetch dropped its waiters".to_string(),
            )
            .into()),
        }
    }

    /// Writes the desired state of one output.
    ///
    /// On success the decoded response is merged into the cache as the
    /// new known state and an unforced read is triggered to reconcile
    /// devices whose set response omits full state. On failure the error
    /// is held back for the settle backoff, a forced read is triggered
    /// to resynchronize, and only then is the failure reported.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for an unregistered device or
    /// the transport error after the backoff.
    pub async fn write(
        &self,
        id: &DeviceId,
        index: OutputIndex,
        state: OutputState,
    ) -> Result<(), Error> {
        let slot = self.inner.devices.get(id).ok_or(Error::DeviceNotFound)?;

        tracing::debug!(device = %id, output = %index, power = state.power, "Writing output state");

        match slot.transport.set_state(index, &state).await {
            Ok(reported) => {
                let merged = {
                    let mut entry = slot.entry.lock();
                    entry.fetched_at = Some(Instant::now());
                    let status = entry.status.get_or_insert_with(DeviceStatus::new);
                    status.merge(&reported);
                    status.clone()
                };
                self.inner
                    .events
                    .publish(BridgeEvent::status_updated(id.clone(), merged));

                self.spawn_refresh(id.clone(), false);

                Ok(())
            }
            Err(error) => {
                tracing::warn!(device = %id, error = %error, "State write failed");

                // Hold the failure back so the host does not flap its
                // displayed state faster than the device can settle,
                // then resynchronize with a fresh read.
                tokio::time::sleep(self.inner.write_backoff).await;
                self.spawn_refresh(id.clone(), true);

                Err(error)
            }
        }
    }

    /// Probes which of a device's inputs can be exposed as discrete
    /// buttons.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::NoOutputs` when the configuration query
    /// reports no output channels - a probe failure, not "no button" -
    /// or the transport error of the failed query.
    pub async fn exposable_inputs(&self, id: &DeviceId) -> Result<BTreeSet<u8>, Error> {
        let slot = self.inner.devices.get(id).ok_or(Error::DeviceNotFound)?;

        let profile = slot.transport.get_configuration().await?;
        if profile.has_no_outputs() {
            return Err(DeviceError::NoOutputs.into());
        }
        Ok(profile.inputs)
    }

    /// Returns the last cached status of a device without touching the
    /// network, if any fetch has succeeded yet.
    #[must_use]
    pub fn status(&self, id: &DeviceId) -> Option<DeviceStatus> {
        self.inner
            .devices
            .get(id)?
            .entry
            .lock()
            .status
            .clone()
    }

    /// Triggers a forced refresh of every registered device.
    ///
    /// Refreshes run in the background; results surface as
    /// [`BridgeEvent::StatusUpdated`] events.
    pub fn refresh_all(&self) {
        for id in self.inner.devices.keys() {
            self.spawn_refresh(id.clone(), true);
        }
    }

    /// Subscribes to bridge events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.inner.events.subscribe()
    }

    /// Returns a handle to the event bus.
    #[must_use]
    pub fn event_bus(&self) -> EventBus {
        self.inner.events.clone()
    }

    /// Returns the registered device IDs in stable order.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.inner.devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns each registered device with its configured network
    /// address, in stable order.
    #[must_use]
    pub fn device_addresses(&self) -> Vec<(DeviceId, String)> {
        let mut addresses: Vec<(DeviceId, String)> = self
            .inner
            .devices
            .iter()
            .map(|(id, slot)| (id.clone(), slot.address.clone()))
            .collect();
        addresses.sort();
        addresses
    }

    /// Returns `true` if the cache runs in push mode (no polling).
    #[must_use]
    pub fn push_updates(&self) -> bool {
        self.inner.push_updates
    }

    // =========================================================================
    // Fetch state machine
    // =========================================================================

    fn spawn_fetch(&self, id: DeviceId) {
        let cache = self.clone();
        tokio::spawn(async move {
            cache.run_fetch(&id).await;
        });
    }

    fn spawn_refresh(&self, id: DeviceId, forced: bool) {
        let cache = self.clone();
        tokio::spawn(async move {
            let _ = cache.read(&id, forced).await;
        });
    }

    /// Runs one fetch to completion and drains the waiter queue.
    ///
    /// Runs in its own task so an in-flight request is never cancelled
    /// by a caller giving up.
    async fn run_fetch(&self, id: &DeviceId) {
        let Some(slot) = self.inner.devices.get(id) else {
            return;
        };

        tracing::debug!(device = %id, "Fetching device status");
        let result = slot.transport.get_state().await;

        let waiters = {
            let mut entry = slot.entry.lock();
            match &result {
                Ok(status) => {
                    entry.status = Some(status.clone());
                    entry.fetched_at = Some(Instant::now());
                }
                Err(error) => {
                    // The previous cached value stays untouched.
                    tracing::warn!(device = %id, error = %error, "Status fetch failed");
                }
            }
            entry.in_flight = false;
            std::mem::take(&mut entry.waiters)
        };

        tracing::debug!(device = %id, count = waiters.len(), "Draining queued status callbacks");
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }

        if let Ok(status) = result {
            self.inner
                .events
                .publish(BridgeEvent::status_updated(id.clone(), status));
        }

        // Polling continues after a failure too; retry frequency stays
        // bounded to once per interval.
        self.schedule_refresh(id);
    }

    /// Arms the next refresh timer, replacing (and cancelling) any
    /// previous one. Push mode disables polling entirely.
    fn schedule_refresh(&self, id: &DeviceId) {
        if self.inner.push_updates {
            return;
        }
        let Some(slot) = self.inner.devices.get(id) else {
            return;
        };

        let cache = self.clone();
        let device = id.clone();
        let interval = self.inner.freshness;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            // Drop our own handle first so starting the fetch does not
            // abort the firing task.
            cache.clear_refresh_timer(&device);
            if let Err(error) = cache.read(&device, true).await {
                tracing::warn!(device = %device, error = %error, "Scheduled refresh failed");
            }
        });

        let mut entry = slot.entry.lock();
        if let Some(previous) = entry.refresh_timer.replace(handle) {
            previous.abort();
        }
    }

    fn clear_refresh_timer(&self, id: &DeviceId) {
        if let Some(slot) = self.inner.devices.get(id) {
            slot.entry.lock().refresh_timer = None;
        }
    }
}

impl Clone for StatusCache {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for StatusCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCache")
            .field("devices", &self.inner.devices.len())
            .field("freshness", &self.inner.freshness)
            .field("push_updates", &self.inner.push_updates)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`StatusCache`] with custom transports or tuning.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use shellor_lib::cache::StatusCache;
/// use shellor_lib::event::DeviceId;
/// use shellor_lib::protocol::HttpTransport;
///
/// # fn example() -> shellor_lib::Result<()> {
/// let cache = StatusCache::builder()
///     .with_freshness(Duration::from_secs(10))
///     .add_device(
///         DeviceId::indexed(0),
///         "10.0.0.9",
///         Arc::new(HttpTransport::new("10.0.0.9")?),
///     )
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct StatusCacheBuilder {
    devices: Vec<(DeviceId, String, Arc<dyn Transport>)>,
    freshness: Duration,
    write_backoff: Duration,
    push_updates: bool,
}

impl StatusCacheBuilder {
    /// Creates a builder with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            freshness: DEFAULT_FRESHNESS,
            write_backoff: WRITE_FAILURE_BACKOFF,
            push_updates: false,
        }
    }

    /// Registers a device with its network address and transport.
    #[must_use]
    pub fn add_device(
        mut self,
        id: DeviceId,
        address: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        self.devices.push((id, address.into(), transport));
        self
    }

    /// Sets the freshness window. The same duration is the re-poll
    /// interval: the cache deliberately keeps a single knob for both.
    #[must_use]
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Sets how long a failed write is held back before reporting.
    #[must_use]
    pub fn with_write_backoff(mut self, backoff: Duration) -> Self {
        self.write_backoff = backoff;
        self
    }

    /// Enables push mode: devices notify the bridge, so no polling
    /// timers are ever scheduled.
    #[must_use]
    pub fn with_push_updates(mut self, push_updates: bool) -> Self {
        self.push_updates = push_updates;
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> StatusCache {
        let devices = self
            .devices
            .into_iter()
            .map(|(id, address, transport)| {
                (
                    id,
                    DeviceSlot {
                        address,
                        transport,
                        entry: Mutex::new(CacheEntry::default()),
                    },
                )
            })
            .collect();

        StatusCache {
            inner: Arc::new(CacheInner {
                devices,
                freshness: self.freshness,
                write_backoff: self.write_backoff,
                push_updates: self.push_updates,
                events: EventBus::new(),
            }),
        }
    }
}

impl Default for StatusCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
