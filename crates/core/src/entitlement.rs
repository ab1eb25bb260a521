// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Unscroll Contributors

//! Subscription entitlement gate
//!
//! The purchase flow lives outside the core; `connect()` only consults
//! this gate. Gate errors fail closed: an unverifiable entitlement is
//! treated as no entitlement.

use async_trait::async_trait;

use unscroll_common::Result;

#[async_trait]
pub trait EntitlementGate: Send + Sync {
    /// Whether the user currently holds an active entitlement
    async fn is_entitled(&self) -> Result<bool>;
}

/// Gate that always grants access, for personal builds and tooling
pub struct AlwaysEntitled;

#[async_trait]
impl EntitlementGate for AlwaysEntitled {
    async fn is_entitled(&self) -> Result<bool> {
        Ok(true)
    }
}
