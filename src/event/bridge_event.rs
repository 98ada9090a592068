// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge event types.

use crate::state::DeviceStatus;

use super::DeviceId;

/// Kind of a button press reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressKind {
    /// A short press.
    Short,
    /// A long press.
    Long,
    /// A double press.
    Double,
}

impl PressKind {
    /// Parses the press token used on the notification path.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            _ => None,
        }
    }
}

/// Events emitted by the bridge.
///
/// The accessory adapter subscribes to these to keep host
/// characteristics in sync and to forward button presses.
///
/// # Examples
///
/// ```
/// use shellor_lib::event::{BridgeEvent, DeviceId, PressKind};
///
/// let event = BridgeEvent::button(DeviceId::indexed(0), 1, PressKind::Long);
/// assert_eq!(event.device_id().as_str(), "switch0");
/// ```
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A device reported fresh status, through polling, a forced push
    /// refresh or a state write.
    StatusUpdated {
        /// The device that reported.
        device_id: DeviceId,
        /// The complete cached status after the update.
        status: DeviceStatus,
    },

    /// A device reported a button press. Dispatched independently of
    /// the status cache.
    Button {
        /// The device that reported.
        device_id: DeviceId,
        /// The input position of the pressed button.
        input: u8,
        /// The kind of press.
        press: PressKind,
    },
}

impl BridgeEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::StatusUpdated { device_id, .. } | Self::Button { device_id, .. } => device_id,
        }
    }

    /// Creates a status update event.
    #[must_use]
    pub fn status_updated(device_id: DeviceId, status: DeviceStatus) -> Self {
        Self::StatusUpdated { device_id, status }
    }

    /// Creates a button press event.
    #[must_use]
    pub fn button(device_id: DeviceId, input: u8, press: PressKind) -> Self {
        Self::Button {
            device_id,
            input,
            press,
        }
    }
}
