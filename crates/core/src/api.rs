// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Backend API client
//!
//! Stateless request/response wrapper around the Unscroll backend. The
//! bearer token is set once after authentication and attached to every
//! authenticated request; authenticated calls fail fast with
//! `Unauthorized` before any network I/O when no token is present.
//! Retry policy belongs to callers, never to this client.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use unscroll_common::{
    AuthTokenResponse, BandwidthUpdate, BandwidthUpdateResponse, Error, Result, TunnelConfig,
    UserRecord,
};

/// Source of fresh tunnel configurations
///
/// The tunnel controller depends on this seam rather than on the full
/// client, so tests can supply a scripted source.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn tunnel_config(&self) -> Result<TunnelConfig>;
}

/// HTTP client for the Unscroll backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install the bearer token used on authenticated requests
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    /// Drop the bearer token (sign-out)
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// The current bearer token, for callers that persist the session
    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer header, or fail fast when no token is set
    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.read().expect("token lock poisoned");
        match token.as_deref() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(Error::Unauthorized),
        }
    }

    /// Register a new backend account, returning the bearer token
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<String> {
        debug!(username, "registering backend account");
        let response = self
            .http
            .post(self.url("/api/register"))
            .json(&json!({
                "email": email,
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthTokenResponse = read_json(response).await?;
        Ok(auth.token)
    }

    /// Log in to an existing backend account, returning the bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        debug!(username, "logging in to backend");
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthTokenResponse = read_json(response).await?;
        Ok(auth.token)
    }

    /// Fetch the authenticated user's record
    pub async fn user_info(&self) -> Result<UserRecord> {
        let request = self.authorize(self.http.get(self.url("/api/user/me")))?;
        let response = request.send().await?;
        read_json(response).await
    }

    /// Fetch a fresh tunnel configuration for the authenticated user
    pub async fn vpn_config(&self) -> Result<TunnelConfig> {
        let request = self.authorize(self.http.get(self.url("/api/vpn/config")))?;
        let response = request.send().await?;
        read_json(response).await
    }

    /// Propose new bandwidth limits; the echoed response is authoritative
    pub async fn update_bandwidth(
        &self,
        upload_mbps: Option<u32>,
        download_mbps: Option<u32>,
    ) -> Result<BandwidthUpdateResponse> {
        let body = BandwidthUpdate {
            upload_mbps,
            download_mbps,
        };
        let request = self.authorize(self.http.put(self.url("/api/user/bandwidth")))?;
        let response = request.json(&body).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl ConfigProvider for ApiClient {
    async fn tunnel_config(&self) -> Result<TunnelConfig> {
        self.vpn_config().await
    }
}

/// Map a response to the expected JSON body or a typed error
///
/// 401 -> `Unauthorized`, any other non-200 -> `Server { status }`,
/// schema mismatch -> `Decode`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized);
    }
    if !status.is_success() {
        return Err(Error::Server {
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on this address; authenticated calls must fail
    // before reaching the network.
    fn unreachable_client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9/").expect("Should build client")
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = unreachable_client();
        assert_eq!(client.url("/api/login"), "http://127.0.0.1:9/api/login");
    }

    #[test]
    fn test_token_lifecycle() {
        let client = unreachable_client();
        assert!(!client.has_token());
        client.set_token("tok");
        assert!(client.has_token());
        client.clear_token();
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_authenticated_calls_fail_fast_without_token() {
        let client = unreachable_client();

        assert!(matches!(client.user_info().await, Err(Error::Unauthorized)));
        assert!(matches!(client.vpn_config().await, Err(Error::Unauthorized)));
        assert!(matches!(
            client.update_bandwidth(Some(1), None).await,
            Err(Error::Unauthorized)
        ));
    }
}
