// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared device family tag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared family of a configured device.
///
/// The tag decides which control endpoint is used for a device: relay
/// outputs are driven through `/relay/<n>`, dimmer outputs through
/// `/light/<n>` with an optional brightness parameter.
///
/// # Examples
///
/// ```
/// use shellor_lib::types::DeviceKind;
///
/// assert!(!DeviceKind::Switch.is_dimmer());
/// assert!(DeviceKind::Dimmer.is_dimmer());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// A relay output device (on/off only).
    #[default]
    Switch,
    /// A dimmer output device (on/off plus brightness).
    Dimmer,
}

impl DeviceKind {
    /// Returns `true` if outputs of this device carry a brightness level.
    #[must_use]
    pub const fn is_dimmer(&self) -> bool {
        matches!(self, Self::Dimmer)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::Dimmer => write!(f, "dimmer"),
        }
    }
}
