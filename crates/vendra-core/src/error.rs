// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vendra conversation and pipeline sync core.

use thiserror::Error;

use crate::types::ConversationStatus;

/// The primary error type used across the Vendra adapter traits and core
/// operations.
///
/// The taxonomy follows the operation boundaries: permission and
/// validation errors are raised locally and never reach the actions
/// layer; transport errors come back from it; decode errors come from
/// the realtime channel. No variant is fatal to the process -- every
/// error is scoped to the single operation that produced it.
#[derive(Debug, Error)]
pub enum VendraError {
    /// The current actor lacks the capability for the attempted action.
    /// Raised before any network call.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Malformed input rejected before submission.
    #[error("validation error: {0}")]
    Validation(String),

    /// An action call failed server-side or in transit. Triggers
    /// rollback of any optimistic mutation; never retried automatically.
    #[error("action call failed: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A realtime payload could not be parsed into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A lifecycle transition not present in the allowed table.
    #[error("invalid transition `{action}` from status `{from}`")]
    Transition {
        from: ConversationStatus,
        action: String,
    },

    /// Realtime channel subscription or delivery failure.
    #[error("realtime channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced entity does not exist in the backing store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VendraError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        VendraError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// True for errors that should roll back an optimistic mutation.
    pub fn is_transport(&self) -> bool {
        matches!(self, VendraError::Transport { .. })
    }
}
