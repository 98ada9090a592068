// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request coders: pure mappings between desired state and the device
//! wire protocol.
//!
//! A coder encodes a desired output state into a request path and decodes
//! raw JSON bodies into normalized [`DeviceStatus`] / [`DeviceProfile`]
//! values. Coders are stateless; the default [`Gen1Coder`] covers the
//! first-generation HTTP API, and the trait leaves room for other device
//! families.

mod gen1;

pub use gen1::Gen1Coder;

use crate::error::ParseError;
use crate::state::{DeviceProfile, DeviceStatus};
use crate::types::{OutputIndex, OutputState};

/// Pure mapping between normalized state and a device family's wire
/// protocol.
pub trait RequestCoder: Send + Sync {
    /// Builds the request path that drives one output to the desired
    /// state.
    fn encode_state_url(&self, index: OutputIndex, state: &OutputState) -> String;

    /// Decodes a raw status body into a per-output state mapping.
    ///
    /// An absent output list yields an empty mapping, never an error.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not valid JSON.
    fn decode_state_response(&self, raw: &str) -> Result<DeviceStatus, ParseError>;

    /// Decodes the body returned by a state write into a (partial)
    /// status for the written output.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not valid JSON.
    fn decode_set_response(
        &self,
        index: OutputIndex,
        raw: &str,
    ) -> Result<DeviceStatus, ParseError>;

    /// Decodes a raw settings body into the device's output channels and
    /// exposable button inputs.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not valid JSON.
    fn decode_configuration_response(&self, raw: &str) -> Result<DeviceProfile, ParseError>;

    /// Path of the status query.
    fn status_path(&self) -> &str {
        "/status"
    }

    /// Path of the configuration query.
    fn configuration_path(&self) -> &str {
        "/settings"
    }
}
