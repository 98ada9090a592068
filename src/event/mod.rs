// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for the bridge.
//!
//! The accessory adapter subscribes to the [`EventBus`] to learn about
//! polled or pushed status changes and about button press events.

mod bridge_event;
mod device_id;
mod event_bus;

pub use bridge_event::{BridgeEvent, PressKind};
pub use device_id::DeviceId;
pub use event_bus::EventBus;
