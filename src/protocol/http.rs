// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for Shelly devices.

use std::sync::Arc;
use std::time::Duration;

use data_encoding::BASE64;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};

use crate::coder::{Gen1Coder, RequestCoder};
use crate::config::DeviceConfig;
use crate::error::{Error, ProtocolError};
use crate::protocol::Transport;
use crate::state::{DeviceProfile, DeviceStatus};
use crate::types::{DeviceKind, OutputIndex, OutputState};

/// Default connect/response timeout for device requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// HTTP transport to a single Shelly device.
///
/// Each request is independent: no persistent connection, no retries.
/// A configured credential is passed through unchanged as a
/// `Authorization: Basic` header.
///
/// # Examples
///
/// ```no_run
/// use shellor_lib::protocol::{HttpTransport, Transport};
///
/// # async fn example() -> shellor_lib::Result<()> {
/// let transport = HttpTransport::new("192.168.1.100")?
///     .with_credential("admin:secret");
/// let status = transport.get_state().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
    credential: Option<String>,
    coder: Arc<dyn RequestCoder>,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for the specified host, with the default
    /// relay coder and timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, Error> {
        let host = host.into();
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("http://{host}")
        };

        let client = Client::builder()
            .build()
            .map_err(ProtocolError::from)?;

        Ok(Self {
            base_url,
            client,
            credential: None,
            coder: Arc::new(Gen1Coder::new(DeviceKind::Switch)),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Creates a transport from a configured device entry: address,
    /// optional port, declared family and optional credential.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn for_device(device: &DeviceConfig) -> Result<Self, Error> {
        let host = match device.port {
            Some(port) if port != 80 => format!("{}:{port}", device.ip),
            _ => device.ip.clone(),
        };

        let mut transport =
            Self::new(host)?.with_coder(Arc::new(Gen1Coder::new(device.device_type)));
        if let Some(credential) = &device.authentication {
            transport = transport.with_credential(credential.clone());
        }
        Ok(transport)
    }

    /// Sets the static credential passed through as a Basic header.
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the request coder.
    #[must_use]
    pub fn with_coder(mut self, coder: Arc<dyn RequestCoder>) -> Self {
        self.coder = coder;
        self
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_millis(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            ProtocolError::Timeout(self.timeout_millis())
        } else {
            ProtocolError::from(err)
        }
    }

    /// Sends a request and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns error on connect failure, timeout, authentication
    /// rejection or a non-success status.
    pub async fn send_request(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
    ) -> Result<String, Error> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, method = %method, "Sending device request");

        let mut request = self
            .client
            .request(method, &url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json");

        if let Some(credential) = &self.credential {
            let encoded = BASE64.encode(credential.as_bytes());
            request = request.header(AUTHORIZATION, format!("Basic {encoded}"));
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed.into());
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        tracing::debug!(body = %body, "Received device response");

        Ok(body)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn set_state(
        &self,
        index: OutputIndex,
        state: &OutputState,
    ) -> Result<DeviceStatus, Error> {
        let path = self.coder.encode_state_url(index, state);
        let raw = self.send_request(&path, Method::GET, None).await?;
        Ok(self.coder.decode_set_response(index, &raw)?)
    }

    async fn get_state(&self) -> Result<DeviceStatus, Error> {
        let raw = self
            .send_request(self.coder.status_path(), Method::GET, None)
            .await?;
        Ok(self.coder.decode_state_response(&raw)?)
    }

    async fn get_configuration(&self) -> Result<DeviceProfile, Error> {
        let raw = self
            .send_request(self.coder.configuration_path(), Method::GET, None)
            .await?;
        Ok(self.coder.decode_configuration_response(&raw)?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
