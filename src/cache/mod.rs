// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device status cache with request coalescing.
//!
//! This is the core of the bridge: it serves cached reads inside a
//! freshness window, merges concurrent refreshes for the same device into
//! a single outstanding request, re-polls on a timer when devices do not
//! push notifications, and forwards state writes with a settle backoff on
//! failure.

mod status_cache;

pub use status_cache::{
    DEFAULT_FRESHNESS, StatusCache, StatusCacheBuilder, WRITE_FAILURE_BACKOFF,
};
