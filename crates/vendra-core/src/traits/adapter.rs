// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait implemented by every external-service client.

use async_trait::async_trait;

use crate::error::VendraError;
use crate::types::HealthStatus;

/// The base trait for Vendra service adapters.
///
/// Both the actions-layer client and the realtime channel implement
/// this trait, which provides identity, health check, and lifecycle
/// capabilities for the `vendra doctor`-style tooling.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, VendraError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), VendraError>;
}
