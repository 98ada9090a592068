// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device configuration.

use std::collections::BTreeSet;

/// Decoded configuration of a device: which output channels exist and
/// which input positions are exposable as discrete buttons.
///
/// An input is exposable when its declared button type is `momentary` or
/// `detached` - those report press events instead of acting as a toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Indices of the controllable output channels.
    pub outputs: BTreeSet<u8>,
    /// Indices of the exposable button inputs.
    pub inputs: BTreeSet<u8>,
}

impl DeviceProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the device reported no outputs at all.
    #[must_use]
    pub fn has_no_outputs(&self) -> bool {
        self.outputs.is_empty()
    }
}
