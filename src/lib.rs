// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ShelloR` Lib - A Rust library to bridge Shelly relay and dimmer
//! devices.
//!
//! This library connects a home-automation host to first-generation
//! Shelly devices over their HTTP+JSON control protocol. Its core is a
//! per-device status cache that coalesces concurrent reads into a single
//! request, serves cached state inside a freshness window and re-polls
//! devices that do not push notifications.
//!
//! # Supported Features
//!
//! - **Output control**: Turn relay and dimmer outputs on/off, set
//!   brightness
//! - **Status caching**: Coalesced, freshness-bounded status reads with
//!   automatic re-polling
//! - **Push notifications**: Inbound listener for device-initiated
//!   status updates and button press events
//! - **Button probing**: Detect which inputs report discrete press
//!   events
//!
//! # Quick Start
//!
//! ## Polling mode
//!
//! ```no_run
//! use shellor_lib::cache::StatusCache;
//! use shellor_lib::config::BridgeConfig;
//! use shellor_lib::event::DeviceId;
//! use shellor_lib::types::{OutputIndex, OutputState};
//!
//! #[tokio::main]
//! async fn main() -> shellor_lib::Result<()> {
//!     let config = BridgeConfig::from_json(
//!         r#"{"devices": [{"name": "Hall", "ip": "192.168.1.100"}]}"#,
//!     )?;
//!     let cache = StatusCache::from_config(&config)?;
//!
//!     let hall = DeviceId::indexed(0);
//!
//!     // Served from the cache when fresh, fetched otherwise
//!     let status = cache.read(&hall, false).await?;
//!     println!("outputs known: {}", status.len());
//!
//!     // Drive the first output
//!     cache.write(&hall, OutputIndex::first(), OutputState::on()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Push mode with the notification server
//!
//! ```no_run
//! use shellor_lib::cache::StatusCache;
//! use shellor_lib::config::BridgeConfig;
//! use shellor_lib::event::BridgeEvent;
//! use shellor_lib::notify::{NotificationServer, SubscriptionTable};
//!
//! #[tokio::main]
//! async fn main() -> shellor_lib::Result<()> {
//!     let config = BridgeConfig::from_json(
//!         r#"{
//!             "devices": [{"name": "Hall", "ip": "192.168.1.100"}],
//!             "notification_port": 3599
//!         }"#,
//!     )?;
//!     let cache = StatusCache::from_config(&config)?;
//!
//!     // Devices push status changes; polling timers are disabled
//!     if let Some(port) = config.notification_port {
//!         let table = SubscriptionTable::for_cache(&cache);
//!         tokio::spawn(NotificationServer::new(port, table).run());
//!     }
//!
//!     let mut events = cache.subscribe();
//!     cache.refresh_all();
//!
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             BridgeEvent::StatusUpdated { device_id, status } => {
//!                 println!("{device_id}: {} outputs", status.len());
//!             }
//!             BridgeEvent::Button { device_id, input, press } => {
//!                 println!("{device_id}: button {input} {press:?}");
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod coder;
pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod protocol;
pub mod state;
pub mod types;

pub use cache::{DEFAULT_FRESHNESS, StatusCache, StatusCacheBuilder, WRITE_FAILURE_BACKOFF};
pub use coder::{Gen1Coder, RequestCoder};
pub use config::{BridgeConfig, DeviceConfig};
pub use error::{ConfigError, DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{BridgeEvent, DeviceId, EventBus, PressKind};
pub use notify::{CacheSink, NotificationServer, NotificationSink, SubscriptionTable};
pub use protocol::{DEFAULT_TIMEOUT, HttpTransport, Transport};
pub use state::{DeviceProfile, DeviceStatus};
pub use types::{Brightness, DeviceKind, OutputIndex, OutputState};
