// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime channel trait: a generic publish/subscribe boundary.
//!
//! The merger logic must not depend on a specific transport; anything
//! that can deliver insert/update row notifications per topic can back
//! this trait. The channel guarantees neither ordering nor
//! acknowledgement -- those concerns are handled by the merge rules in
//! `vendra-realtime`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::VendraError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::ConversationId;

/// A subscription topic, keyed by conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// New-message events for one conversation.
    Messages(ConversationId),
    /// Row-update events (status/agent changes) for one conversation.
    Rows(ConversationId),
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Messages(id) => write!(f, "messages:{id}"),
            Topic::Rows(id) => write!(f, "rows:{id}"),
        }
    }
}

/// Kind of change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A single change notification carrying the new row as raw JSON.
#[derive(Debug, Clone)]
pub struct RealtimeEvent {
    pub kind: ChangeKind,
    pub row: serde_json::Value,
}

/// Handler invoked for every event delivered on a subscribed topic.
///
/// Handlers run synchronously on the delivery path and must not block.
pub type EventHandler = Arc<dyn Fn(RealtimeEvent) + Send + Sync>;

/// An active subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a cancel closure provided by the transport.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly end the subscription.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Adapter for realtime change-notification transports.
#[async_trait]
pub trait RealtimeChannel: ServiceAdapter {
    /// Subscribe `handler` to all events on `topic`.
    async fn subscribe(
        &self,
        topic: Topic,
        handler: EventHandler,
    ) -> Result<Subscription, VendraError>;
}
