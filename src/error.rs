// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ShelloR` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! value validation, protocol communication, response parsing, device
//! operations and configuration loading.
//!
//! The whole tree is `Clone`: a single failed status fetch is reported to
//! every caller queued on it, so the error must be fan-out-able. Sources
//! that are not `Clone` themselves (`reqwest::Error`, `serde_json::Error`)
//! are shared through an `Arc`.

use std::sync::Arc;

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when bridging
/// Shelly devices.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Invalid static configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device was not registered with the cache.
    #[error("device not found")]
    DeviceNotFound,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A brightness value is outside the valid range (0-100).
    #[error("brightness value {0} is out of range [0, 100]")]
    InvalidBrightness(u8),
}

/// Errors related to HTTP communication with a device.
#[derive(Debug, Error, Clone)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(Arc<reqwest::Error>),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device rejected the configured credential.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

impl From<reqwest::Error> for ProtocolError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

/// Errors related to parsing device responses.
#[derive(Debug, Error, Clone)]
pub enum ParseError {
    /// JSON parsing failed. Carries the unparsed response body so callers
    /// can log exactly what the device sent.
    #[error("JSON parse error: {error} (body: {body:?})")]
    Json {
        /// The underlying deserialization error.
        error: Arc<serde_json::Error>,
        /// The raw response body that failed to parse.
        body: String,
    },

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

impl ParseError {
    /// Creates a JSON parse error that preserves the unparsed body.
    #[must_use]
    pub fn json(error: serde_json::Error, body: impl Into<String>) -> Self {
        Self::Json {
            error: Arc::new(error),
            body: body.into(),
        }
    }
}

/// Errors related to device operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A configuration query reported no controllable outputs.
    ///
    /// Callers probing button capability must treat this as a probe
    /// failure, not as "no button".
    #[error("device reported no outputs")]
    NoOutputs,

    /// Command was rejected by the device.
    #[error("command rejected: {0}")]
    CommandRejected(String),
}

/// Errors in the static bridge configuration.
///
/// These are fatal at startup: no partial device set is accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A device entry has no network address.
    #[error("device {index} has no ip address configured")]
    MissingAddress {
        /// Position of the offending device entry.
        index: usize,
    },

    /// A device entry has no name.
    #[error("device {index} has no name configured")]
    MissingName {
        /// Position of the offending device entry.
        index: usize,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 3,
            actual: 7,
        };
        assert_eq!(err.to_string(), "value 7 is out of range [0, 3]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidBrightness(130);
        let err: Error = value_err.into();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidBrightness(130))
        ));
    }

    #[test]
    fn parse_error_keeps_unparsed_body() {
        let source = serde_json::from_str::<serde_json::Value>("nonsense").unwrap_err();
        let err = ParseError::json(source, "nonsense");
        if let ParseError::Json { body, .. } = &err {
            assert_eq!(body, "nonsense");
        } else {
            panic!("expected ParseError::Json");
        }
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingAddress { index: 2 };
        assert_eq!(err.to_string(), "device 2 has no ip address configured");
    }

    #[test]
    fn errors_are_cloneable() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = ParseError::json(source, "{").into();
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }

    #[test]
    fn timeout_display() {
        let err = ProtocolError::Timeout(2000);
        assert_eq!(err.to_string(), "request timed out after 2000 ms");
    }
}
