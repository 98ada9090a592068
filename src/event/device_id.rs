// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

/// Stable identifier for a configured device.
///
/// Identifiers are generated from the device's position in the
/// configuration at registration time (`switch0`, `switch1`, ...), are
/// unique per configured device and stay stable for the process
/// lifetime. They key cache entries, waiter queues and refresh timers.
///
/// # Examples
///
/// ```
/// use shellor_lib::event::DeviceId;
///
/// let id = DeviceId::indexed(0);
/// assert_eq!(id.as_str(), "switch0");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates an identifier from an explicit handle.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the identifier for the device at the given configuration
    /// position.
    #[must_use]
    pub fn indexed(index: usize) -> Self {
        Self(format!("switch{index}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_ids_are_stable() {
        assert_eq!(DeviceId::indexed(0), DeviceId::indexed(0));
        assert_eq!(DeviceId::indexed(3).as_str(), "switch3");
    }

    #[test]
    fn indexed_ids_are_unique() {
        assert_ne!(DeviceId::indexed(0), DeviceId::indexed(1));
    }

    #[test]
    fn display_format() {
        assert_eq!(DeviceId::indexed(1).to_string(), "switch1");
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", DeviceId::indexed(1)), "DeviceId(switch1)");
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        let id = DeviceId::indexed(2);
        set.insert(id.clone());
        assert!(set.contains(&id));
    }
}
