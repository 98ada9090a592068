// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementations for communicating with Shelly devices.
//!
//! The [`Transport`] trait is the seam between the status cache and the
//! network: it returns decoded, normalized values and never retries -
//! retry policy belongs to the cache layer. [`HttpTransport`] is the
//! production implementation over HTTP.

mod http;

pub use http::{DEFAULT_TIMEOUT, HttpTransport};

use async_trait::async_trait;

use crate::error::Error;
use crate::state::{DeviceProfile, DeviceStatus};
use crate::types::{OutputIndex, OutputState};

/// Transport to a single device.
///
/// Implementations are held behind `Arc<dyn Transport>` by the cache so
/// fetches can run in spawned tasks and tests can substitute fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Drives one output to the desired state and returns the decoded
    /// (possibly partial) status reported back by the device.
    ///
    /// # Errors
    ///
    /// Returns `Error` if the request fails or the response cannot be
    /// decoded.
    async fn set_state(&self, index: OutputIndex, state: &OutputState)
    -> Result<DeviceStatus, Error>;

    /// Fetches and decodes the device's current status.
    ///
    /// # Errors
    ///
    /// Returns `Error` if the request fails or the response cannot be
    /// decoded.
    async fn get_state(&self) -> Result<DeviceStatus, Error>;

    /// Fetches and decodes the device's configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error` if the request fails or the response cannot be
    /// decoded.
    async fn get_configuration(&self) -> Result<DeviceProfile, Error>;
}
