// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Backend authentication strategy
//!
//! The device identity doubles as the backend credential: the username is
//! derived from its first 12 characters and the full identity is the
//! password. Authentication is an explicit two-step strategy: login
//! first, then exactly one registration attempt. The login failure is a
//! normal branch there, never surfaced; only the register outcome is.

use tracing::{debug, info};

use unscroll_common::Result;

use crate::api::ApiClient;

/// Credentials derived from the platform device identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// How the account session was established
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Existing account, login succeeded
    LoggedIn,
    /// Login failed, a fresh account was registered
    Registered,
}

/// Derive backend credentials from a stable per-device identity
pub fn credentials_for_device(device_id: &str, app_domain: &str) -> BackendCredentials {
    let prefix: String = device_id.chars().take(12).collect();
    let username = format!("user_{prefix}");

    BackendCredentials {
        email: format!("{username}@{app_domain}"),
        username,
        password: device_id.to_string(),
    }
}

/// Login-or-register against the backend, installing the token on success
pub async fn authenticate(api: &ApiClient, creds: &BackendCredentials) -> Result<AuthOutcome> {
    match api.login(&creds.username, &creds.password).await {
        Ok(token) => {
            api.set_token(token);
            info!(username = %creds.username, "logged in to backend");
            Ok(AuthOutcome::LoggedIn)
        }
        Err(login_err) => {
            debug!(%login_err, "login failed, attempting registration");
            // If both steps fail, the register error is the one reported.
            let token = api
                .register(&creds.email, &creds.username, &creds.password)
                .await?;
            api.set_token(token);
            info!(username = %creds.username, "registered backend account");
            Ok(AuthOutcome::Registered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_use_identity_prefix() {
        let creds = credentials_for_device("a1b2c3d4e5f6extratail", "unscroll.app");
        assert_eq!(creds.username, "user_a1b2c3d4e5f6");
        assert_eq!(creds.email, "user_a1b2c3d4e5f6@unscroll.app");
        assert_eq!(creds.password, "a1b2c3d4e5f6extratail");
    }

    #[test]
    fn test_short_identity_is_used_whole() {
        let creds = credentials_for_device("short", "unscroll.app");
        assert_eq!(creds.username, "user_short");
        assert_eq!(creds.password, "short");
    }
}
