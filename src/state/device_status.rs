// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device status.

use std::collections::BTreeMap;

use crate::types::OutputState;

/// Decoded status of a device: a 0-indexed mapping from output channel
/// to its reported state.
///
/// A status can be partial. A state-write response for a single output
/// decodes into a one-entry status; the cache merges it into whatever is
/// already known about the other channels.
///
/// # Examples
///
/// ```
/// use shellor_lib::state::DeviceStatus;
/// use shellor_lib::types::OutputState;
///
/// let mut status = DeviceStatus::new();
/// status.set_output(0, OutputState::on());
/// assert!(status.output(0).unwrap().power);
/// assert!(status.output(1).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    outputs: BTreeMap<u8, OutputState>,
}

impl DeviceStatus {
    /// Creates an empty status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of a specific output, if known.
    #[must_use]
    pub fn output(&self, index: u8) -> Option<&OutputState> {
        self.outputs.get(&index)
    }

    /// Sets the state of a specific output.
    pub fn set_output(&mut self, index: u8, state: OutputState) {
        self.outputs.insert(index, state);
    }

    /// Returns `true` if no output state is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Returns the number of outputs with known state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Merges another status into this one.
    ///
    /// Entries present in `other` overwrite the corresponding entries
    /// here; entries absent from `other` are left untouched.
    pub fn merge(&mut self, other: &Self) {
        for (index, state) in &other.outputs {
            self.outputs.insert(*index, *state);
        }
    }

    /// Iterates over `(index, state)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &OutputState)> {
        self.outputs.iter().map(|(i, s)| (*i, s))
    }
}

impl FromIterator<(u8, OutputState)> for DeviceStatus {
    fn from_iter<T: IntoIterator<Item = (u8, OutputState)>>(iter: T) -> Self {
        Self {
            outputs: iter.into_iter().collect(),
        }
    }
}
