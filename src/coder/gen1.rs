// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Default coder for the first-generation Shelly HTTP API.

use serde::Deserialize;

use crate::coder::RequestCoder;
use crate::error::ParseError;
use crate::state::{DeviceProfile, DeviceStatus};
use crate::types::{Brightness, DeviceKind, OutputIndex, OutputState};

/// Raw output record as it appears in `relays`, `lights` and set
/// responses.
#[derive(Debug, Deserialize, Default)]
struct RawOutput {
    #[serde(default)]
    ison: bool,
    brightness: Option<u8>,
    btn_type: Option<String>,
}

impl RawOutput {
    /// An input reports discrete press events only when declared
    /// momentary or detached; any other button type acts as a toggle.
    fn is_exposable(&self) -> bool {
        matches!(self.btn_type.as_deref(), Some("momentary" | "detached"))
    }
}

/// Raw `/status` body. Relay devices report `relays`, dimmers `lights`.
#[derive(Debug, Deserialize, Default)]
struct RawStatus {
    relays: Option<Vec<RawOutput>>,
    lights: Option<Vec<RawOutput>>,
}

/// Raw `/settings` body.
#[derive(Debug, Deserialize, Default)]
struct RawSettings {
    relays: Option<Vec<RawOutput>>,
    inputs: Option<Vec<RawOutput>>,
}

/// Coder for the first-generation Shelly HTTP API.
///
/// Carries the declared device family tag; the tag selects the control
/// endpoint (`/relay/<n>` vs. `/light/<n>`) when encoding state URLs.
///
/// # Examples
///
/// ```
/// use shellor_lib::coder::{Gen1Coder, RequestCoder};
/// use shellor_lib::types::{DeviceKind, OutputIndex, OutputState};
///
/// let coder = Gen1Coder::new(DeviceKind::Switch);
/// let path = coder.encode_state_url(OutputIndex::first(), &OutputState::on());
/// assert_eq!(path, "/relay/0?turn=on");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Gen1Coder {
    kind: DeviceKind,
}

impl Gen1Coder {
    /// Creates a coder for the given device family.
    #[must_use]
    pub const fn new(kind: DeviceKind) -> Self {
        Self { kind }
    }

    /// Returns the declared device family.
    #[must_use]
    pub const fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn decode_outputs(records: &[RawOutput], with_brightness: bool) -> DeviceStatus {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut state = OutputState::powered(record.ison);
                if with_brightness && let Some(level) = record.brightness {
                    state = state.with_brightness(Brightness::clamped(level));
                }
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u8;
                (index, state)
            })
            .collect()
    }
}

impl RequestCoder for Gen1Coder {
    fn encode_state_url(&self, index: OutputIndex, state: &OutputState) -> String {
        let turn = if state.power { "on" } else { "off" };
        if self.kind.is_dimmer() {
            match state.brightness {
                Some(level) => {
                    format!("/light/{index}?turn={turn}&brightness={}", level.value())
                }
                None => format!("/light/{index}?turn={turn}"),
            }
        } else {
            format!("/relay/{index}?turn={turn}")
        }
    }

    fn decode_state_response(&self, raw: &str) -> Result<DeviceStatus, ParseError> {
        let status: RawStatus =
            serde_json::from_str(raw).map_err(|e| ParseError::json(e, raw))?;

        // Exactly one output list is consulted; absence of both is an
        // empty status, not an error.
        let decoded = if let Some(relays) = &status.relays {
            Self::decode_outputs(relays, false)
        } else if let Some(lights) = &status.lights {
            Self::decode_outputs(lights, true)
        } else {
            DeviceStatus::new()
        };

        Ok(decoded)
    }

    fn decode_set_response(
        &self,
        index: OutputIndex,
        raw: &str,
    ) -> Result<DeviceStatus, ParseError> {
        let record: RawOutput =
            serde_json::from_str(raw).map_err(|e| ParseError::json(e, raw))?;

        let mut state = OutputState::powered(record.ison);
        if self.kind.is_dimmer() && let Some(level) = record.brightness {
            state = state.with_brightness(Brightness::clamped(level));
        }

        let mut status = DeviceStatus::new();
        status.set_output(index.value(), state);
        Ok(status)
    }

    fn decode_configuration_response(&self, raw: &str) -> Result<DeviceProfile, ParseError> {
        let settings: RawSettings =
            serde_json::from_str(raw).map_err(|e| ParseError::json(e, raw))?;

        let mut profile = DeviceProfile::new();

        // Relay devices declare their button types per relay; everything
        // else declares a top-level input list. Only one shape applies.
        if let Some(relays) = &settings.relays {
            for (index, relay) in relays.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u8;
                profile.outputs.insert(index);
                if relay.is_exposable() {
                    profile.inputs.insert(index);
                }
            }
        } else if let Some(inputs) = &settings.inputs {
            for (index, input) in inputs.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u8;
                if input.is_exposable() {
                    profile.inputs.insert(index);
                }
            }
        }

        Ok(profile)
    }
}
