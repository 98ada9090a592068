// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound push notifications from devices.
//!
//! Devices configured with an action URL call back into the bridge to
//! report status changes and button presses. The [`NotificationServer`]
//! resolves the calling device by its source address against a
//! [`SubscriptionTable`] built once at startup, and dispatches exactly
//! one event per request.

mod server;

pub use server::NotificationServer;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::StatusCache;
use crate::event::{BridgeEvent, DeviceId, PressKind};

/// Receiver of push notifications for a single device.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// The device reported a status change; its cached state is stale.
    async fn update(&self);

    /// The device reported a short button press.
    async fn short_press(&self, index: u8);

    /// The device reported a long button press.
    async fn long_press(&self, index: u8);

    /// The device reported a double button press.
    async fn double_press(&self, index: u8);
}

/// Mapping from device source address to its notification sink.
///
/// Built once at startup from the configured devices and never mutated
/// afterward. Addresses are canonicalized on insert and lookup so an
/// IPv6-mapped IPv4 peer (`::ffff:10.0.0.5`) resolves the device
/// configured as `10.0.0.5`; peers are matched exactly, never by
/// substring.
#[derive(Default)]
pub struct SubscriptionTable {
    subscriptions: HashMap<IpAddr, Arc<dyn NotificationSink>>,
}

impl SubscriptionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table for every cache device whose configured address
    /// is an IP address. Devices configured by hostname cannot be
    /// resolved from a raw peer address; they are skipped and keep
    /// working in polling mode.
    #[must_use]
    pub fn for_cache(cache: &StatusCache) -> Self {
        let mut table = Self::new();
        for (id, address) in cache.device_addresses() {
            match address.parse::<IpAddr>() {
                Ok(ip) => {
                    let sink = CacheSink::new(cache.clone(), id);
                    table.subscribe(ip, Arc::new(sink));
                }
                Err(_) => {
                    tracing::warn!(
                        device = %id,
                        address = %address,
                        "Device address is not an IP; push notifications will not resolve it"
                    );
                }
            }
        }
        table
    }

    /// Registers a sink for a device address.
    pub fn subscribe(&mut self, address: IpAddr, sink: Arc<dyn NotificationSink>) {
        tracing::debug!(address = %address, "Registering notification subscriber");
        self.subscriptions.insert(address.to_canonical(), sink);
    }

    /// Resolves the sink for a peer address, if one is registered.
    #[must_use]
    pub fn resolve(&self, peer: IpAddr) -> Option<Arc<dyn NotificationSink>> {
        self.subscriptions.get(&peer.to_canonical()).cloned()
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl std::fmt::Debug for SubscriptionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionTable")
            .field("subscribers", &self.subscriptions.len())
            .finish()
    }
}

/// Notification sink wired to the status cache and event bus.
///
/// A status push forces a cache refresh in the background; button
/// presses are published as [`BridgeEvent::Button`] immediately,
/// independent of the cache.
pub struct CacheSink {
    cache: StatusCache,
    device: DeviceId,
}

impl CacheSink {
    /// Creates a sink for one device.
    #[must_use]
    pub fn new(cache: StatusCache, device: DeviceId) -> Self {
        Self { cache, device }
    }

    fn publish_press(&self, input: u8, press: PressKind) {
        self.cache
            .event_bus()
            .publish(BridgeEvent::button(self.device.clone(), input, press));
    }
}

#[async_trait]
impl NotificationSink for CacheSink {
    async fn update(&self) {
        // Refresh in the background so the device gets its response
        // without waiting on its own status endpoint.
        let cache = self.cache.clone();
        let device = self.device.clone();
        tokio::spawn(async move {
            if let Err(error) = cache.read(&device, true).await {
                tracing::warn!(device = %device, error = %error, "Pushed refresh failed");
            }
        });
    }

    async fn short_press(&self, index: u8) {
        self.publish_press(index, PressKind::Short);
    }

    async fn long_press(&self, index: u8) {
        self.publish_press(index, PressKind::Long);
    }

    async fn double_press(&self, index: u8) {
        self.publish_press(index, PressKind::Double);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct CountingSink {
        updates: AtomicUsize,
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        async fn update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
        async fn short_press(&self, _index: u8) {}
        async fn long_press(&self, _index: u8) {}
        async fn double_press(&self, _index: u8) {}
    }

    #[test]
    fn resolve_registered_peer() {
        let mut table = SubscriptionTable::new();
        table.subscribe("10.0.0.5".parse().unwrap(), Arc::new(CountingSink::default()));

        assert!(table.resolve("10.0.0.5".parse().unwrap()).is_some());
        assert!(table.resolve("10.0.0.6".parse().unwrap()).is_none());
    }

    #[test]
    fn resolve_canonicalizes_mapped_ipv6() {
        let mut table = SubscriptionTable::new();
        table.subscribe("10.0.0.5".parse().unwrap(), Arc::new(CountingSink::default()));

        // An IPv6-mapped IPv4 peer must resolve the IPv4 registration.
        assert!(table.resolve("::ffff:10.0.0.5".parse().unwrap()).is_some());
    }

    #[test]
    fn prefix_overlap_does_not_resolve() {
        let mut table = SubscriptionTable::new();
        table.subscribe("10.0.0.5".parse().unwrap(), Arc::new(CountingSink::default()));

        // Exact matching: 10.0.0.50 is not 10.0.0.5.
        assert!(table.resolve("10.0.0.50".parse().unwrap()).is_none());
    }

    #[test]
    fn empty_table() {
        let table = SubscriptionTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
