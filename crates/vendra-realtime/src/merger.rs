// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent merging of realtime events into local panel state.
//!
//! Two pure reducers (transcript insert, row patch) plus the
//! [`EventMerger`] that wires them to a [`RealtimeChannel`]. The
//! reducers carry the ordering guarantees: id-based deduplication
//! protects against double delivery (optimistic append + realtime
//! echo), and the row staleness check protects against out-of-order
//! status patches.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use vendra_core::traits::{EventHandler, RealtimeChannel, Subscription, Topic};
use vendra_core::types::{ChatMessage, Conversation, MessageId};
use vendra_core::VendraError;

use crate::payload::{self, RowUpdate};

/// Outcome of a transcript insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// A message with this id is already present; the event is ignored.
    Duplicate,
}

/// Outcome of a conversation row patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Applied,
    /// The patch carried no newer fact than the held snapshot.
    Stale,
}

/// The locally held, ordered transcript of one conversation.
///
/// Messages are appended in arrival order; no re-ordering is performed
/// on receipt. The accepted approximation is that `created_at` governs
/// meaning, not position.
#[derive(Debug, Default)]
pub struct TranscriptState {
    messages: Vec<ChatMessage>,
    seen: HashSet<MessageId>,
}

impl TranscriptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transcript with a fetched history, deduplicating by
    /// id in case the fetch raced a realtime delivery.
    pub fn hydrate(&mut self, history: Vec<ChatMessage>) {
        self.messages.clear();
        self.seen.clear();
        for msg in history {
            self.insert(msg);
        }
    }

    /// Insert a message unless one with the same id already exists.
    pub fn insert(&mut self, msg: ChatMessage) -> MergeOutcome {
        if !self.seen.insert(msg.id.clone()) {
            return MergeOutcome::Duplicate;
        }
        self.messages.push(msg);
        MergeOutcome::Inserted
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Apply a conversation row patch to the held snapshot if it carries a
/// genuinely newer fact: a different status, or a strictly later
/// `updated_at`.
pub fn apply_row_update(current: &mut Conversation, update: &RowUpdate) -> RowOutcome {
    let newer = update.status != current.status || update.updated_at > current.updated_at;
    if !newer {
        return RowOutcome::Stale;
    }

    current.status = update.status;
    current.assigned_agent = update.assigned_agent.clone();
    current.updated_at = update.updated_at;
    RowOutcome::Applied
}

/// Lock a mutex, recovering the inner value if a panicking writer
/// poisoned it.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Subscribes to both event streams of one conversation and folds them
/// into shared panel state. Dropping the merger unsubscribes.
pub struct EventMerger {
    _subscriptions: Vec<Subscription>,
}

impl EventMerger {
    /// Attach to `channel` for the conversation held in `conversation`.
    ///
    /// Malformed message rows and row patches are logged and skipped;
    /// payload-level decode problems were already degraded into the
    /// message itself by [`payload::decode_message`].
    pub async fn attach(
        channel: &dyn RealtimeChannel,
        conversation: Arc<Mutex<Conversation>>,
        transcript: Arc<Mutex<TranscriptState>>,
    ) -> Result<Self, VendraError> {
        let conversation_id = lock_unpoisoned(&conversation).id.clone();

        let message_state = transcript.clone();
        let message_conv_id = conversation_id.clone();
        let message_handler: EventHandler = Arc::new(move |event| {
            match payload::decode_message(&event.row) {
                Ok(msg) => {
                    let outcome = lock_unpoisoned(&message_state).insert(msg);
                    debug!(
                        conversation_id = %message_conv_id,
                        ?outcome,
                        "message event merged"
                    );
                }
                Err(e) => {
                    warn!(
                        conversation_id = %message_conv_id,
                        error = %e,
                        "skipping malformed message event"
                    );
                }
            }
        });

        let row_state = conversation.clone();
        let row_conv_id = conversation_id.clone();
        let row_handler: EventHandler = Arc::new(move |event| {
            match payload::decode_row_update(&event.row) {
                Ok(update) => {
                    let mut held = lock_unpoisoned(&row_state);
                    match apply_row_update(&mut held, &update) {
                        RowOutcome::Applied => info!(
                            conversation_id = %row_conv_id,
                            status = %update.status,
                            "conversation row updated"
                        ),
                        RowOutcome::Stale => debug!(
                            conversation_id = %row_conv_id,
                            "stale conversation row ignored"
                        ),
                    }
                }
                Err(e) => {
                    warn!(
                        conversation_id = %row_conv_id,
                        error = %e,
                        "skipping malformed row event"
                    );
                }
            }
        });

        let message_sub = channel
            .subscribe(Topic::Messages(conversation_id.clone()), message_handler)
            .await?;
        let row_sub = channel
            .subscribe(Topic::Rows(conversation_id), row_handler)
            .await?;

        Ok(Self {
            _subscriptions: vec![message_sub, row_sub],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use vendra_core::types::{
        ChannelOrigin, ConversationId, ConversationStatus, LeadId, MessagePart, MessageRole,
    };

    fn message(id: &str, offset_secs: i64) -> ChatMessage {
        ChatMessage {
            id: MessageId::from(id),
            conversation_id: ConversationId::from("conv-1"),
            role: MessageRole::User,
            part: MessagePart::text(format!("msg {id}")),
            media: None,
            agent: None,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    fn conversation(status: ConversationStatus) -> Conversation {
        Conversation {
            id: ConversationId::from("conv-1"),
            status,
            channel: ChannelOrigin::Webchat,
            assigned_agent: None,
            lead_id: LeadId::from("lead-1"),
            lead_name: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut state = TranscriptState::new();
        assert_eq!(state.insert(message("m1", 0)), MergeOutcome::Inserted);
        assert_eq!(state.insert(message("m1", 0)), MergeOutcome::Duplicate);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn hydrate_replaces_and_dedups() {
        let mut state = TranscriptState::new();
        state.insert(message("old", 0));
        state.hydrate(vec![message("m1", 0), message("m2", 1), message("m1", 0)]);
        assert_eq!(state.len(), 2);
        assert_eq!(state.messages()[0].id, MessageId::from("m1"));
    }

    #[test]
    fn stale_row_patch_is_ignored() {
        let mut conv = conversation(ConversationStatus::HitlActive);
        let held_at = conv.updated_at;

        let stale = RowUpdate {
            id: conv.id.clone(),
            status: ConversationStatus::HitlActive,
            assigned_agent: None,
            updated_at: held_at - Duration::seconds(30),
        };
        assert_eq!(apply_row_update(&mut conv, &stale), RowOutcome::Stale);
        assert_eq!(conv.updated_at, held_at);
    }

    #[test]
    fn equal_timestamp_same_status_is_stale() {
        let mut conv = conversation(ConversationStatus::Automated);
        let patch = RowUpdate {
            id: conv.id.clone(),
            status: ConversationStatus::Automated,
            assigned_agent: None,
            updated_at: conv.updated_at,
        };
        assert_eq!(apply_row_update(&mut conv, &patch), RowOutcome::Stale);
    }

    #[test]
    fn different_status_applies_even_with_old_timestamp() {
        let mut conv = conversation(ConversationStatus::Automated);
        let patch = RowUpdate {
            id: conv.id.clone(),
            status: ConversationStatus::HitlActive,
            assigned_agent: None,
            updated_at: conv.updated_at - Duration::seconds(5),
        };
        assert_eq!(apply_row_update(&mut conv, &patch), RowOutcome::Applied);
        assert_eq!(conv.status, ConversationStatus::HitlActive);
    }

    #[test]
    fn later_timestamp_applies_agent_change() {
        let mut conv = conversation(ConversationStatus::AwaitingAgent);
        let patch = RowUpdate {
            id: conv.id.clone(),
            status: ConversationStatus::AwaitingAgent,
            assigned_agent: Some(vendra_core::types::AgentRef {
                id: "agent-1".into(),
                name: Some("Val".to_string()),
            }),
            updated_at: conv.updated_at + Duration::seconds(2),
        };
        assert_eq!(apply_row_update(&mut conv, &patch), RowOutcome::Applied);
        assert!(conv.assigned_agent.is_some());
    }

    proptest! {
        /// Any delivery sequence, however duplicated, yields each
        /// distinct id exactly once.
        #[test]
        fn transcript_holds_each_id_once(ids in proptest::collection::vec(0u8..20, 0..60)) {
            let mut state = TranscriptState::new();
            for (i, id) in ids.iter().enumerate() {
                state.insert(message(&format!("m{id}"), i as i64));
            }

            let distinct: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(state.len(), distinct.len());

            let mut seen = HashSet::new();
            for msg in state.messages() {
                prop_assert!(seen.insert(msg.id.clone()));
            }
        }

        /// Patches that are not strictly newer never mutate the held
        /// snapshot.
        #[test]
        fn non_newer_patches_leave_state_unchanged(age_secs in 0i64..3600) {
            let mut conv = conversation(ConversationStatus::HitlActive);
            let before = conv.clone();
            let patch = RowUpdate {
                id: conv.id.clone(),
                status: conv.status,
                assigned_agent: None,
                updated_at: conv.updated_at - Duration::seconds(age_secs),
            };

            prop_assert_eq!(apply_row_update(&mut conv, &patch), RowOutcome::Stale);
            prop_assert_eq!(conv, before);
        }
    }
}
