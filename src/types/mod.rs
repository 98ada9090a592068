// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types for Shelly devices.
//!
//! This module provides type-safe representations of the values exchanged
//! with devices: output channel addressing, desired output state and
//! brightness levels, plus the declared device family tag.

mod brightness;
mod device_kind;
mod output;

pub use brightness::Brightness;
pub use device_kind::DeviceKind;
pub use output::{OutputIndex, OutputState};
