// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP listener for device push notifications.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, State};
use axum::http::{StatusCode, Uri};
use tokio::net::TcpListener;

use crate::error::{Error, ProtocolError};
use crate::event::PressKind;
use crate::notify::SubscriptionTable;

/// Logical event recognized on a notification path.
///
/// Devices are configured with action URLs whose paths may carry an
/// arbitrary prefix, so recognition goes by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationKind {
    /// `.../status` - the device's cached status is stale.
    Status,
    /// `.../button/<index>/<short|long|double>` - a button edge event.
    Button { index: u8, press: PressKind },
}

impl NotificationKind {
    fn from_path(path: &str) -> Option<Self> {
        if path.ends_with("/status") {
            return Some(Self::Status);
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if let [.., marker, index, press] = segments.as_slice()
            && *marker == "button"
        {
            let index = index.parse().ok()?;
            let press = PressKind::from_token(press)?;
            return Some(Self::Button { index, press });
        }

        None
    }
}

/// HTTP server receiving push notifications from devices.
///
/// When no notification port is configured, this server is simply never
/// constructed and the bridge stays in polling mode.
///
/// # Examples
///
/// ```no_run
/// use shellor_lib::cache::StatusCache;
/// use shellor_lib::config::BridgeConfig;
/// use shellor_lib::notify::{NotificationServer, SubscriptionTable};
///
/// # async fn example() -> shellor_lib::Result<()> {
/// # let config = BridgeConfig::from_json("{}")?;
/// let cache = StatusCache::from_config(&config)?;
/// if let Some(port) = config.notification_port {
///     let table = SubscriptionTable::for_cache(&cache);
///     tokio::spawn(NotificationServer::new(port, table).run());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NotificationServer {
    port: u16,
    table: Arc<SubscriptionTable>,
}

impl NotificationServer {
    /// Creates a server for the given port and subscription table.
    #[must_use]
    pub fn new(port: u16, table: SubscriptionTable) -> Self {
        Self {
            port,
            table: Arc::new(table),
        }
    }

    /// Binds the listener on all interfaces and serves until the task
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be bound or the server fails.
    pub async fn run(self) -> Result<(), Error> {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)))
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(e.to_string()))?;
        self.run_on(listener).await
    }

    /// Serves notifications on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns error if the server fails.
    pub async fn run_on(self, listener: TcpListener) -> Result<(), Error> {
        tracing::debug!(port = self.port, "Started status notification server");

        let router = Router::new()
            .fallback(handle_notification)
            .with_state(self.table);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ProtocolError::ConnectionFailed(e.to_string()))?;

        Ok(())
    }
}

/// Resolves the caller, recognizes the event and dispatches it once.
async fn handle_notification(
    State(table): State<Arc<SubscriptionTable>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> (StatusCode, &'static str) {
    tracing::debug!(peer = %peer, path = %uri.path(), "Notification received");

    let Some(sink) = table.resolve(peer.ip()) else {
        tracing::debug!(peer = %peer, "Notification from unknown device");
        return (StatusCode::NOT_FOUND, "Not Found");
    };

    match NotificationKind::from_path(uri.path()) {
        Some(NotificationKind::Status) => {
            sink.update().await;
            (StatusCode::OK, "OK")
        }
        Some(NotificationKind::Button { index, press }) => {
            match press {
                PressKind::Short => sink.short_press(index).await,
                PressKind::Long => sink.long_press(index).await,
                PressKind::Double => sink.double_press(index).await,
            }
            (StatusCode::OK, "OK")
        }
        None => (StatusCode::NOT_FOUND, "Not Found"),
    }
}
