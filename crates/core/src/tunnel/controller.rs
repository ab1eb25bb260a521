// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Tunnel controller state machine
//!
//! Owns the connect/disconnect lifecycle: fetch config, provision the
//! profile, request start/stop, and follow the platform's asynchronous
//! status notifications. The platform tunnel subsystem owns true state;
//! the controller is a cache of it. `Connected` is only ever reached
//! through the notification inbox, never set by `connect()` itself.
//!
//! A single mutex serializes connect/disconnect sequences and status
//! application. The multi-step connect sequence (fetch, persist, reload,
//! start) is not atomic and must not interleave; a `connect()` while any
//! operation is in flight is rejected with `Busy`, while `disconnect()`
//! queues behind the in-flight operation.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use unscroll_common::{Error, Result, TunnelProfile, TunnelState};

use crate::api::ConfigProvider;
use crate::entitlement::EntitlementGate;

use super::backend::TunnelBackend;
use super::store::ProfileStore;

/// Create the notification channel pair for a controller
///
/// The platform adapter posts every status change through the handle; the
/// controller consumes the inbox. A message queue rather than a direct
/// field write guarantees serialized application of transitions.
pub fn status_channel() -> (StatusHandle, StatusInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (StatusHandle { tx }, StatusInbox { rx })
}

/// Sender half given to the platform adapter
#[derive(Clone)]
pub struct StatusHandle {
    tx: mpsc::UnboundedSender<TunnelState>,
}

impl StatusHandle {
    /// Post a platform status notification
    pub fn notify(&self, state: TunnelState) {
        if self.tx.send(state).is_err() {
            debug!("status inbox dropped, notification discarded");
        }
    }
}

/// Receiver half consumed by the controller's status loop
pub struct StatusInbox {
    rx: mpsc::UnboundedReceiver<TunnelState>,
}

/// Identity of the single tunnel profile this controller provisions
#[derive(Debug, Clone)]
pub struct TunnelDescriptor {
    pub bundle_identifier: String,
    pub display_name: String,
    pub server_address: String,
}

pub struct TunnelController {
    config_source: Arc<dyn ConfigProvider>,
    backend: Arc<dyn TunnelBackend>,
    store: ProfileStore,
    gate: Arc<dyn EntitlementGate>,
    descriptor: TunnelDescriptor,
    /// Serializes connect/disconnect sequences and status application
    ops: Mutex<()>,
    observed: watch::Sender<TunnelState>,
}

impl TunnelController {
    /// Create the controller and start consuming the status inbox
    pub fn new(
        config_source: Arc<dyn ConfigProvider>,
        backend: Arc<dyn TunnelBackend>,
        gate: Arc<dyn EntitlementGate>,
        descriptor: TunnelDescriptor,
        inbox: StatusInbox,
    ) -> Arc<Self> {
        let (observed, _) = watch::channel(TunnelState::Disconnected);

        let controller = Arc::new(Self {
            config_source,
            store: ProfileStore::new(backend.clone()),
            backend,
            gate,
            descriptor,
            ops: Mutex::new(()),
            observed,
        });

        controller.clone().spawn_status_loop(inbox);
        controller
    }

    fn spawn_status_loop(self: Arc<Self>, mut inbox: StatusInbox) {
        tokio::spawn(async move {
            while let Some(state) = inbox.rx.recv().await {
                let _guard = self.ops.lock().await;
                self.apply_status(state);
            }
            debug!("status channel closed, controller no longer follows the platform");
        });
    }

    /// Overwrite the observed state; callers hold the operation mutex
    fn apply_status(&self, state: TunnelState) {
        debug!(%state, "tunnel status changed");
        self.observed.send_replace(state);
    }

    /// The last observed connection state
    pub fn state(&self) -> TunnelState {
        *self.observed.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Subscribe to observed state changes
    pub fn watch(&self) -> watch::Receiver<TunnelState> {
        self.observed.subscribe()
    }

    /// Re-derive the state from the platform's persisted profile list
    ///
    /// Used at startup, before any notification has arrived.
    pub async fn refresh_status(&self) -> Result<TunnelState> {
        let state = match self.store.load().await? {
            Some(profile) => self.backend.status(&profile).await?,
            None => TunnelState::Disconnected,
        };

        let _guard = self.ops.lock().await;
        self.apply_status(state);
        Ok(state)
    }

    /// Provision the profile and request tunnel start
    ///
    /// Fire and forget: a successful return means the start request was
    /// accepted. The transition to `Connected` arrives later through the
    /// notification inbox.
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.ops.try_lock().map_err(|_| Error::Busy)?;

        match self.gate.is_entitled().await {
            Ok(true) => {}
            Ok(false) => return Err(Error::SubscriptionRequired),
            Err(err) => {
                warn!(%err, "entitlement check failed, failing closed");
                return Err(Error::SubscriptionRequired);
            }
        }

        // Fetched fresh on every attempt; fails fast with the API error
        // before any profile mutation.
        let config = self.config_source.tunnel_config().await?;

        let mut profile = match self.store.load().await? {
            Some(existing) => existing,
            None => {
                info!("no tunnel profile yet, creating one");
                TunnelProfile::new(
                    self.descriptor.bundle_identifier.as_str(),
                    self.descriptor.display_name.as_str(),
                    self.descriptor.server_address.as_str(),
                )
            }
        };
        profile.enabled = true;
        profile.set_tunnel_config(config.config_text.as_str());

        let profile = self.store.save_and_reload(&profile).await?;

        if let Err(err) = self.backend.start(&profile).await {
            self.apply_status(TunnelState::Invalid);
            return Err(Error::ConnectionFailed {
                cause: err.to_string(),
            });
        }

        info!("tunnel start requested");
        Ok(())
    }

    /// Request tunnel stop
    ///
    /// A missing profile or an already-stopped tunnel is a logged no-op,
    /// not an error. Queues behind an in-flight connect sequence.
    pub async fn disconnect(&self) -> Result<()> {
        let _guard = self.ops.lock().await;

        let Some(profile) = self.store.load().await? else {
            info!("no tunnel profile, nothing to stop");
            return Ok(());
        };

        let state = self.backend.status(&profile).await?;
        if state.is_stoppable() {
            info!("stopping tunnel");
            self.backend.stop(&profile).await
        } else {
            debug!(%state, "tunnel not in a stoppable state");
            Ok(())
        }
    }

    /// Disconnect if connected, otherwise connect
    pub async fn toggle(&self) -> Result<()> {
        if self.is_connected() {
            self.disconnect().await
        } else {
            self.connect().await
        }
    }
}
