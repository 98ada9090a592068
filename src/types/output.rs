// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output channel addressing and desired output state.

use std::fmt;

use crate::error::ValueError;
use crate::types::Brightness;

/// Index of an output channel on a multi-channel device.
///
/// Shelly devices expose up to four relay or dimmer outputs, indexed
/// from 0.
///
/// # Examples
///
/// ```
/// use shellor_lib::types::OutputIndex;
///
/// let idx = OutputIndex::new(1).unwrap();
/// assert_eq!(idx.value(), 1);
///
/// // Invalid index returns error
/// assert!(OutputIndex::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct OutputIndex(u8);

impl OutputIndex {
    /// Maximum valid output index (four channels, 0-3).
    pub const MAX: u8 = 3;

    /// Creates a new output index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if index is greater than 3.
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX),
                actual: u16::from(index),
            });
        }
        Ok(Self(index))
    }

    /// Creates the index of the first output channel.
    #[must_use]
    pub const fn first() -> Self {
        Self(0)
    }

    /// Returns the raw index value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for OutputIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for OutputIndex {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Desired or reported state of a single output channel.
///
/// Brightness is only meaningful for dimmer outputs and is omitted from
/// encoded requests when absent.
///
/// # Examples
///
/// ```
/// use shellor_lib::types::{Brightness, OutputState};
///
/// let on = OutputState::on();
/// assert!(on.power);
/// assert!(on.brightness.is_none());
///
/// let dimmed = OutputState::on().with_brightness(Brightness::new(42).unwrap());
/// assert_eq!(dimmed.brightness.unwrap().value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputState {
    /// Whether the output is (to be) powered.
    pub power: bool,
    /// Brightness level for dimmer outputs.
    pub brightness: Option<Brightness>,
}

impl OutputState {
    /// Creates a powered-on state without a brightness level.
    #[must_use]
    pub const fn on() -> Self {
        Self {
            power: true,
            brightness: None,
        }
    }

    /// Creates a powered-off state.
    #[must_use]
    pub const fn off() -> Self {
        Self {
            power: false,
            brightness: None,
        }
    }

    /// Creates a state from a power flag.
    #[must_use]
    pub const fn powered(power: bool) -> Self {
        Self {
            power,
            brightness: None,
        }
    }

    /// Attaches a brightness level.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }
}
