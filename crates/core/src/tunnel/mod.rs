// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Tunnel lifecycle: backend capability, profile store, and controller

pub mod backend;
pub mod controller;
pub mod store;

pub use backend::TunnelBackend;
pub use controller::{
    status_channel, StatusHandle, StatusInbox, TunnelController, TunnelDescriptor,
};
pub use store::ProfileStore;
