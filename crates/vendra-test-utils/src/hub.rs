// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process realtime hub with synchronous delivery.
//!
//! `MemoryRealtime` implements `RealtimeChannel` over a plain
//! topic-to-handlers map. `publish()` invokes the handlers inline,
//! which makes event-driven tests fully deterministic: by the time
//! `publish()` returns, every subscriber has seen the event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vendra_core::traits::{
    EventHandler, RealtimeChannel, RealtimeEvent, ServiceAdapter, Subscription, Topic,
};
use vendra_core::types::HealthStatus;
use vendra_core::VendraError;

type SubscriberMap = HashMap<Topic, Vec<(u64, EventHandler)>>;

/// An in-process pub/sub hub for tests and the demo backend.
pub struct MemoryRealtime {
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_id: AtomicU64,
}

impl MemoryRealtime {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Deliver an event to every handler subscribed to `topic`.
    ///
    /// Handlers are cloned out of the lock before invocation so they
    /// may re-enter the hub.
    pub fn publish(&self, topic: Topic, event: RealtimeEvent) {
        let handlers: Vec<EventHandler> = {
            let map = lock_unpoisoned(&self.subscribers);
            map.get(&topic)
                .map(|subs| subs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(event.clone());
        }
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        lock_unpoisoned(&self.subscribers)
            .get(topic)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryRealtime {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl ServiceAdapter for MemoryRealtime {
    fn name(&self) -> &str {
        "memory-realtime"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, VendraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VendraError> {
        lock_unpoisoned(&self.subscribers).clear();
        Ok(())
    }
}

#[async_trait]
impl RealtimeChannel for MemoryRealtime {
    async fn subscribe(
        &self,
        topic: Topic,
        handler: EventHandler,
    ) -> Result<Subscription, VendraError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock_unpoisoned(&self.subscribers)
            .entry(topic.clone())
            .or_default()
            .push((id, handler));

        let map = self.subscribers.clone();
        Ok(Subscription::new(move || {
            let mut subs = lock_unpoisoned(&map);
            if let Some(entries) = subs.get_mut(&topic) {
                entries.retain(|(sub_id, _)| *sub_id != id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use vendra_core::traits::ChangeKind;
    use vendra_core::types::ConversationId;

    fn topic() -> Topic {
        Topic::Messages(ConversationId::from("conv-1"))
    }

    fn event() -> RealtimeEvent {
        RealtimeEvent {
            kind: ChangeKind::Insert,
            row: serde_json::json!({"id": "m1"}),
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribed_handlers() {
        let hub = MemoryRealtime::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let _sub = hub
            .subscribe(
                topic(),
                Arc::new(move |_event| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        hub.publish(topic(), event());
        hub.publish(topic(), event());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_topics_are_not_delivered() {
        let hub = MemoryRealtime::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let _sub = hub
            .subscribe(
                topic(),
                Arc::new(move |_event| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        hub.publish(Topic::Rows(ConversationId::from("conv-1")), event());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_the_subscription_removes_the_handler() {
        let hub = MemoryRealtime::new();
        let sub = hub.subscribe(topic(), Arc::new(|_event| {})).await.unwrap();
        assert_eq!(hub.subscriber_count(&topic()), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(&topic()), 0);
    }
}
