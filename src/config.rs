// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static bridge configuration.
//!
//! The host adapter owns the configuration file; this module provides the
//! deserializable shape and the fail-fast validation applied before any
//! device is registered. Device records are immutable after load.

use serde::Deserialize;

use crate::error::{ConfigError, Error, ParseError};
use crate::types::DeviceKind;

/// Configuration of a single device.
///
/// # Examples
///
/// ```
/// use shellor_lib::config::DeviceConfig;
/// use shellor_lib::types::DeviceKind;
///
/// let device = DeviceConfig::new("Bedroom Light", "10.0.0.5")
///     .with_kind(DeviceKind::Dimmer)
///     .with_credential("admin:secret");
///
/// assert!(device.device_type.is_dimmer());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Display name of the device.
    #[serde(default)]
    pub name: String,
    /// Network address of the device.
    #[serde(default)]
    pub ip: String,
    /// HTTP port, when not the default 80.
    pub port: Option<u16>,
    /// Declared device family.
    #[serde(default, alias = "deviceType")]
    pub device_type: DeviceKind,
    /// Static credential passed through as a Basic header.
    pub authentication: Option<String>,
    /// Output channel this entry controls, when not the first.
    pub output: Option<u8>,
}

impl DeviceConfig {
    /// Creates a device entry with the given name and address.
    #[must_use]
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip: ip.into(),
            port: None,
            device_type: DeviceKind::default(),
            authentication: None,
            output: None,
        }
    }

    /// Sets a non-default HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the declared device family.
    #[must_use]
    pub fn with_kind(mut self, kind: DeviceKind) -> Self {
        self.device_type = kind;
        self
    }

    /// Sets the static credential.
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.authentication = Some(credential.into());
        self
    }

    /// Sets the controlled output channel.
    #[must_use]
    pub fn with_output(mut self, output: u8) -> Self {
        self.output = Some(output);
        self
    }

    /// Returns the output channel this entry controls (first by default).
    #[must_use]
    pub fn output_index(&self) -> u8 {
        self.output.unwrap_or(0)
    }
}

/// Top-level bridge configuration: the device list plus the optional
/// notification listener port.
///
/// No notification port means pure polling mode - the listener is never
/// started and the cache re-polls devices on its own timers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// The configured devices.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    /// Port of the inbound notification listener.
    pub notification_port: Option<u16>,
}

impl BridgeConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON and a `ConfigError` for
    /// an invalid device set.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ParseError::json(e, raw))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the device set.
    ///
    /// Validation is fail-fast: the first missing address or name aborts
    /// startup - no partial device set is accepted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the offending entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, device) in self.devices.iter().enumerate() {
            if device.ip.is_empty() {
                return Err(ConfigError::MissingAddress { index });
            }
            if device.name.is_empty() {
                return Err(ConfigError::MissingName { index });
            }
        }
        Ok(())
    }

    /// Returns `true` if push notifications are configured.
    #[must_use]
    pub fn push_updates(&self) -> bool {
        self.notification_port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_builder_chain() {
        let device = DeviceConfig::new("Hall", "10.0.0.9")
            .with_port(8080)
            .with_kind(DeviceKind::Dimmer)
            .with_credential("admin:pw")
            .with_output(1);

        assert_eq!(device.name, "Hall");
        assert_eq!(device.ip, "10.0.0.9");
        assert_eq!(device.port, Some(8080));
        assert!(device.device_type.is_dimmer());
        assert_eq!(device.authentication.as_deref(), Some("admin:pw"));
        assert_eq!(device.output_index(), 1);
    }

    #[test]
    fn output_index_defaults_to_first() {
        let device = DeviceConfig::new("Hall", "10.0.0.9");
        assert_eq!(device.output_index(), 0);
    }

    #[test]
    fn from_json_full_config() {
        let config = BridgeConfig::from_json(
            r#"{
                "devices": [
                    {"name": "Hall", "ip": "10.0.0.9"},
                    {"name": "Bedroom", "ip": "10.0.0.5", "deviceType": "dimmer"}
                ],
                "notification_port": 3599
            }"#,
        )
        .unwrap();

        assert_eq!(config.devices.len(), 2);
        assert!(config.devices[1].device_type.is_dimmer());
        assert_eq!(config.notification_port, Some(3599));
        assert!(config.push_updates());
    }

    #[test]
    fn from_json_snake_case_device_type() {
        let config = BridgeConfig::from_json(
            r#"{"devices": [{"name": "A", "ip": "10.0.0.1", "device_type": "dimmer"}]}"#,
        )
        .unwrap();
        assert!(config.devices[0].device_type.is_dimmer());
    }

    #[test]
    fn missing_address_is_fatal() {
        let config = BridgeConfig {
            devices: vec![
                DeviceConfig::new("Hall", "10.0.0.9"),
                DeviceConfig::new("Broken", ""),
            ],
            notification_port: None,
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::MissingAddress { index: 1 }
        );
    }

    #[test]
    fn missing_name_is_fatal() {
        let config = BridgeConfig {
            devices: vec![DeviceConfig::new("", "10.0.0.9")],
            notification_port: None,
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::MissingName { index: 0 }
        );
    }

    #[test]
    fn from_json_rejects_invalid_device() {
        let result = BridgeConfig::from_json(r#"{"devices": [{"name": "NoIp"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn no_notification_port_means_polling() {
        let config = BridgeConfig::from_json(r#"{"devices": []}"#).unwrap();
        assert!(!config.push_updates());
    }
}
