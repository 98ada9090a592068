// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the notification server with a real listener.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shellor_lib::cache::StatusCache;
use shellor_lib::event::{BridgeEvent, DeviceId, PressKind};
use shellor_lib::notify::{CacheSink, NotificationServer, NotificationSink, SubscriptionTable};
use shellor_lib::protocol::HttpTransport;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink double recording every dispatch.
#[derive(Default)]
struct RecordingSink {
    updates: AtomicUsize,
    shorts: AtomicUsize,
    longs: AtomicUsize,
    doubles: AtomicUsize,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn update(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    async fn short_press(&self, _index: u8) {
        self.shorts.fetch_add(1, Ordering::SeqCst);
    }

    async fn long_press(&self, _index: u8) {
        self.longs.fetch_add(1, Ordering::SeqCst);
    }

    async fn double_press(&self, _index: u8) {
        self.doubles.fetch_add(1, Ordering::SeqCst);
    }
}

/// Starts the server on an ephemeral local port and returns its base
/// URL.
async fn start_server(table: SubscriptionTable) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(NotificationServer::new(port, table).run_on(listener));
    format!("http://127.0.0.1:{port}")
}

fn localhost() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

#[tokio::test]
async fn status_notification_is_acknowledged() {
    let sink = Arc::new(RecordingSink::default());
    let mut table = SubscriptionTable::new();
    table.subscribe(localhost(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let base = start_server(table).await;
    let response = reqwest::get(format!("{base}/status")).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
    assert_eq!(sink.updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn button_notifications_dispatch_by_kind() {
    let sink = Arc::new(RecordingSink::default());
    let mut table = SubscriptionTable::new();
    table.subscribe(localhost(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let base = start_server(table).await;

    for suffix in ["/button/0/short", "/button/1/long", "/button/0/double"] {
        let response = reqwest::get(format!("{base}{suffix}")).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    assert_eq!(sink.shorts.load(Ordering::SeqCst), 1);
    assert_eq!(sink.longs.load(Ordering::SeqCst), 1);
    assert_eq!(sink.doubles.load(Ordering::SeqCst), 1);
    assert_eq!(sink.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_peer_gets_not_found_without_dispatch() {
    let sink = Arc::new(RecordingSink::default());
    let mut table = SubscriptionTable::new();
    // Registered for a different device address than the test client's.
    table.subscribe(
        "10.255.255.1".parse().unwrap(),
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
    );

    let base = start_server(table).await;
    let response = reqwest::get(format!("{base}/status")).await.unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.unwrap(), "Not Found");
    assert_eq!(sink.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unrecognized_path_gets_not_found() {
    let sink = Arc::new(RecordingSink::default());
    let mut table = SubscriptionTable::new();
    table.subscribe(localhost(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

    let base = start_server(table).await;

    for suffix in ["/", "/frobnicate", "/button/0/triple", "/button/x/short"] {
        let response = reqwest::get(format!("{base}{suffix}")).await.unwrap();
        assert_eq!(response.status().as_u16(), 404, "for {suffix}");
    }

    assert_eq!(sink.updates.load(Ordering::SeqCst), 0);
    assert_eq!(sink.shorts.load(Ordering::SeqCst), 0);
}

// ============================================================================
// End-to-end: push notifications through the cache sink
// ============================================================================

fn cache_for_device(device_server: &MockServer) -> (StatusCache, DeviceId) {
    let address = device_server.address();
    let host = format!("{}:{}", address.ip(), address.port());
    let transport = Arc::new(HttpTransport::new(host).unwrap());
    let id = DeviceId::indexed(0);
    let cache = StatusCache::builder()
        .with_push_updates(true)
        .add_device(id.clone(), address.ip().to_string(), transport)
        .build();
    (cache, id)
}

#[tokio::test]
async fn status_push_forces_a_cache_refresh() {
    let device_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "relays": [{"ison": true}]
        })))
        .mount(&device_server)
        .await;

    let (cache, id) = cache_for_device(&device_server);
    let mut events = cache.subscribe();

    let mut table = SubscriptionTable::new();
    table.subscribe(localhost(), Arc::new(CacheSink::new(cache.clone(), id.clone())));

    let base = start_server(table).await;
    let response = reqwest::get(format!("{base}/status")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // The forced refresh runs in the background; its result surfaces as
    // a status event.
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();

    match event {
        BridgeEvent::StatusUpdated { device_id, status } => {
            assert_eq!(device_id, id);
            assert!(status.output(0).unwrap().power);
        }
        other => panic!("expected status update, got {other:?}"),
    }
}

#[tokio::test]
async fn button_push_publishes_bridge_event() {
    let device_server = MockServer::start().await;
    let (cache, id) = cache_for_device(&device_server);
    let mut events = cache.subscribe();

    let mut table = SubscriptionTable::new();
    table.subscribe(localhost(), Arc::new(CacheSink::new(cache.clone(), id.clone())));

    let base = start_server(table).await;
    let response = reqwest::get(format!("{base}/button/1/long")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();

    match event {
        BridgeEvent::Button {
            device_id,
            input,
            press,
        } => {
            assert_eq!(device_id, id);
            assert_eq!(input, 1);
            assert_eq!(press, PressKind::Long);
        }
        other => panic!("expected button event, got {other:?}"),
    }
}
