// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory actions backend with realtime echo.
//!
//! `MemoryActions` implements `ActionClient` over a single-business
//! in-memory store and pushes the same realtime events the production
//! stack would: every message insert is echoed on the `messages:` topic
//! and every conversation row change on the `rows:` topic. Management
//! actions record `system` transcript entries, and agent-authored sends
//! auto-pause the conversation, mirroring the server-side behavior the
//! panel has to reconcile with.
//!
//! Failure injection: `fail_next("op")` makes the next call to that
//! operation fail with a transport error, which is how rollback paths
//! are exercised in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use vendra_core::VendraError;
use vendra_core::traits::{
    ActionClient, ChangeKind, RealtimeEvent, ServiceAdapter, Topic,
};
use vendra_core::types::{
    AgentId, AgentRef, BusinessId, ChatMessage, Conversation, ConversationId,
    ConversationPreview, ConversationStatus, HealthStatus, InboxFilter, KanbanBoard, LeadDetails,
    LeadId, MessageId, MessagePart, MessageRole, SendMessageParams, StageId, StatusFilter, TagId,
    TagRef, UserId,
};
use vendra_pipeline::board;
use vendra_realtime::{conversation_to_row, message_to_row};

use crate::hub::MemoryRealtime;

const LIST_CAP: usize = 100;
const PREVIEW_CAP: usize = 50;

#[derive(Default)]
struct StoreInner {
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<ChatMessage>>,
    board: KanbanBoard,
    agents: Vec<AgentRef>,
    agent_by_user: HashMap<UserId, AgentRef>,
    tags: Vec<TagRef>,
    leads: HashMap<LeadId, LeadDetails>,
    lead_tags: HashMap<LeadId, Vec<TagId>>,
    fail_next: HashSet<String>,
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The `ActionClient` half of the in-memory backend.
pub struct MemoryActions {
    store: Arc<Mutex<StoreInner>>,
    hub: Arc<MemoryRealtime>,
}

impl MemoryActions {
    fn check_fail(&self, op: &str) -> Result<(), VendraError> {
        if lock_unpoisoned(&self.store).fail_next.remove(op) {
            return Err(VendraError::transport(format!("injected failure: {op}")));
        }
        Ok(())
    }

    /// Record a system transcript entry and return it for echoing.
    fn system_message(
        store: &mut StoreInner,
        conversation_id: &ConversationId,
        text: String,
    ) -> ChatMessage {
        let msg = ChatMessage {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            conversation_id: conversation_id.clone(),
            role: MessageRole::System,
            part: MessagePart::Text { text },
            media: None,
            agent: None,
            created_at: Utc::now(),
        };
        store
            .messages
            .entry(conversation_id.clone())
            .or_default()
            .push(msg.clone());
        msg
    }

    /// Apply a conversation mutation plus a system entry, then echo
    /// both through the realtime hub.
    fn mutate_conversation(
        &self,
        op: &str,
        conversation_id: &ConversationId,
        system_text: impl FnOnce(&Conversation) -> String,
        mutate: impl FnOnce(&mut Conversation) -> Result<(), VendraError>,
    ) -> Result<Conversation, VendraError> {
        self.check_fail(op)?;

        let (conversation, system) = {
            let mut store = lock_unpoisoned(&self.store);
            let conv = store
                .conversations
                .get_mut(conversation_id)
                .ok_or_else(|| VendraError::NotFound(format!("conversation {conversation_id}")))?;

            mutate(conv)?;
            conv.updated_at = Utc::now();
            let conv = conv.clone();
            let text = system_text(&conv);
            let system = Self::system_message(&mut store, conversation_id, text);
            (conv, system)
        };

        self.hub.publish(
            Topic::Rows(conversation_id.clone()),
            RealtimeEvent {
                kind: ChangeKind::Update,
                row: conversation_to_row(&conversation),
            },
        );
        self.hub.publish(
            Topic::Messages(conversation_id.clone()),
            RealtimeEvent {
                kind: ChangeKind::Insert,
                row: message_to_row(&system),
            },
        );

        debug!(conversation_id = %conversation_id, op, "conversation mutated");
        Ok(conversation)
    }
}

#[async_trait]
impl ServiceAdapter for MemoryActions {
    fn name(&self) -> &str {
        "memory-actions"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, VendraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VendraError> {
        Ok(())
    }
}

#[async_trait]
impl ActionClient for MemoryActions {
    async fn send_message(&self, params: SendMessageParams) -> Result<ChatMessage, VendraError> {
        self.check_fail("send_message")?;

        let (message, conversation) = {
            let mut store = lock_unpoisoned(&self.store);

            let agent = params
                .agent_id
                .as_ref()
                .map(|id| {
                    store
                        .agents
                        .iter()
                        .find(|a| &a.id == id)
                        .cloned()
                        .unwrap_or_else(|| AgentRef {
                            id: id.clone(),
                            name: None,
                        })
                });

            let conv = store
                .conversations
                .get_mut(&params.conversation_id)
                .ok_or_else(|| {
                    VendraError::NotFound(format!("conversation {}", params.conversation_id))
                })?;

            if conv.status.is_terminal() {
                return Err(VendraError::transport(
                    "la conversación está cerrada y no acepta mensajes",
                ));
            }

            // Server-side auto-pause: an agent reply takes the
            // conversation out of automated handling.
            if params.role == MessageRole::Agent {
                conv.status = ConversationStatus::AwaitingAgent;
            }
            conv.updated_at = Utc::now();
            let conversation = conv.clone();

            let message = ChatMessage {
                id: MessageId(uuid::Uuid::new_v4().to_string()),
                conversation_id: params.conversation_id.clone(),
                role: params.role,
                part: MessagePart::Text { text: params.text },
                media: None,
                agent,
                created_at: Utc::now(),
            };
            store
                .messages
                .entry(params.conversation_id.clone())
                .or_default()
                .push(message.clone());

            (message, conversation)
        };

        self.hub.publish(
            Topic::Messages(conversation.id.clone()),
            RealtimeEvent {
                kind: ChangeKind::Insert,
                row: message_to_row(&message),
            },
        );
        self.hub.publish(
            Topic::Rows(conversation.id.clone()),
            RealtimeEvent {
                kind: ChangeKind::Update,
                row: conversation_to_row(&conversation),
            },
        );

        Ok(message)
    }

    async fn assign_agent(
        &self,
        conversation_id: &ConversationId,
        agent_id: Option<&AgentId>,
        actor_name: &str,
    ) -> Result<Conversation, VendraError> {
        let agent = match agent_id {
            Some(id) => {
                let store = lock_unpoisoned(&self.store);
                let agent = store
                    .agents
                    .iter()
                    .find(|a| &a.id == id)
                    .cloned()
                    .ok_or_else(|| VendraError::NotFound(format!("agent {id}")))?;
                Some(agent)
            }
            None => None,
        };

        let assigned = agent.clone();
        self.mutate_conversation(
            "assign_agent",
            conversation_id,
            move |_| match &agent {
                Some(a) => format!(
                    "Conversación asignada a {} por {actor_name}.",
                    a.name.clone().unwrap_or_else(|| a.id.0.clone())
                ),
                None => format!("Conversación desasignada de agente por {actor_name}."),
            },
            move |conv| {
                conv.assigned_agent = assigned;
                Ok(())
            },
        )
    }

    async fn pause_automation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError> {
        self.mutate_conversation(
            "pause_automation",
            conversation_id,
            |_| format!("Automatización pausada por {actor_name}."),
            |conv| {
                conv.status = ConversationStatus::HitlActive;
                Ok(())
            },
        )
    }

    async fn resume_automation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError> {
        self.mutate_conversation(
            "resume_automation",
            conversation_id,
            |_| format!("Automatización reanudada por {actor_name}."),
            |conv| {
                conv.status = ConversationStatus::Automated;
                Ok(())
            },
        )
    }

    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError> {
        self.mutate_conversation(
            "archive_conversation",
            conversation_id,
            |_| format!("Conversación archivada por {actor_name}."),
            |conv| {
                conv.status = ConversationStatus::Archived;
                Ok(())
            },
        )
    }

    async fn unarchive_conversation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError> {
        self.mutate_conversation(
            "unarchive_conversation",
            conversation_id,
            |_| format!("Conversación desarchivada por {actor_name}."),
            |conv| {
                conv.status = ConversationStatus::AwaitingAgent;
                Ok(())
            },
        )
    }

    async fn fetch_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, VendraError> {
        self.check_fail("fetch_conversation")?;
        lock_unpoisoned(&self.store)
            .conversations
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| VendraError::NotFound(format!("conversation {conversation_id}")))
    }

    async fn fetch_messages(
        &self,
        conversation_id: &ConversationId,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, VendraError> {
        self.check_fail("fetch_messages")?;
        let store = lock_unpoisoned(&self.store);
        let mut messages = store
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    async fn list_conversations(
        &self,
        _business_id: &BusinessId,
        filter: &InboxFilter,
    ) -> Result<Vec<ConversationPreview>, VendraError> {
        self.check_fail("list_conversations")?;
        let store = lock_unpoisoned(&self.store);

        let mut previews: Vec<ConversationPreview> = store
            .conversations
            .values()
            .filter(|conv| match filter.status {
                StatusFilter::Active => !matches!(
                    conv.status,
                    ConversationStatus::Archived | ConversationStatus::Closed
                ),
                StatusFilter::Archived => conv.status == ConversationStatus::Archived,
            })
            .filter(|conv| match &filter.search {
                Some(term) => conv
                    .lead_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&term.to_lowercase())),
                None => true,
            })
            .map(|conv| {
                let last = store
                    .messages
                    .get(&conv.id)
                    .and_then(|msgs| msgs.last());
                let preview: String = last
                    .and_then(|m| m.part.as_text())
                    .unwrap_or("...")
                    .chars()
                    .take(PREVIEW_CAP)
                    .collect();
                ConversationPreview {
                    id: conv.id.clone(),
                    lead_id: conv.lead_id.clone(),
                    lead_name: conv
                        .lead_name
                        .clone()
                        .unwrap_or_else(|| "Contacto desconocido".to_string()),
                    preview,
                    last_message_at: last.map(|m| m.created_at).unwrap_or(conv.updated_at),
                    status: conv.status,
                    channel: conv.channel,
                }
            })
            .collect();

        previews.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        previews.truncate(LIST_CAP);
        Ok(previews)
    }

    async fn update_lead_tags(
        &self,
        lead_id: &LeadId,
        tag_ids: &[TagId],
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<(), VendraError> {
        self.check_fail("update_lead_tags")?;

        let system = {
            let mut store = lock_unpoisoned(&self.store);
            if !store.leads.contains_key(lead_id) {
                return Err(VendraError::NotFound(format!("lead {lead_id}")));
            }
            store.lead_tags.insert(lead_id.clone(), tag_ids.to_vec());
            Self::system_message(
                &mut store,
                conversation_id,
                format!("Etiquetas del lead actualizadas por {actor_name}."),
            )
        };

        self.hub.publish(
            Topic::Messages(conversation_id.clone()),
            RealtimeEvent {
                kind: ChangeKind::Insert,
                row: message_to_row(&system),
            },
        );
        Ok(())
    }

    async fn move_lead_to_stage(
        &self,
        lead_id: &LeadId,
        stage_id: &StageId,
    ) -> Result<(), VendraError> {
        self.check_fail("move_lead_to_stage")?;

        let mut store = lock_unpoisoned(&self.store);
        let dest = board::locate_stage(&store.board, stage_id)
            .ok_or_else(|| VendraError::NotFound(format!("pipeline stage {stage_id}")))?;
        let mut card = board::remove_lead(&mut store.board, lead_id)
            .ok_or_else(|| VendraError::NotFound(format!("lead {lead_id}")))?;
        card.stage_id = stage_id.clone();
        let tail = store.board.columns[dest].leads.len();
        board::insert_lead(&mut store.board, dest, tail, card);
        Ok(())
    }

    async fn fetch_board(&self, _business_id: &BusinessId) -> Result<KanbanBoard, VendraError> {
        self.check_fail("fetch_board")?;
        Ok(lock_unpoisoned(&self.store).board.clone())
    }

    async fn fetch_lead(&self, lead_id: &LeadId) -> Result<LeadDetails, VendraError> {
        self.check_fail("fetch_lead")?;
        lock_unpoisoned(&self.store)
            .leads
            .get(lead_id)
            .cloned()
            .ok_or_else(|| VendraError::NotFound(format!("lead {lead_id}")))
    }

    async fn lead_tag_ids(&self, lead_id: &LeadId) -> Result<Vec<TagId>, VendraError> {
        self.check_fail("lead_tag_ids")?;
        Ok(lock_unpoisoned(&self.store)
            .lead_tags
            .get(lead_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_agent_for_user(
        &self,
        user_id: &UserId,
        _business_id: &BusinessId,
    ) -> Result<Option<AgentRef>, VendraError> {
        self.check_fail("find_agent_for_user")?;
        Ok(lock_unpoisoned(&self.store)
            .agent_by_user
            .get(user_id)
            .cloned())
    }

    async fn list_agents(&self, _business_id: &BusinessId) -> Result<Vec<AgentRef>, VendraError> {
        self.check_fail("list_agents")?;
        Ok(lock_unpoisoned(&self.store).agents.clone())
    }

    async fn list_tags(&self, _business_id: &BusinessId) -> Result<Vec<TagRef>, VendraError> {
        self.check_fail("list_tags")?;
        Ok(lock_unpoisoned(&self.store).tags.clone())
    }
}

/// A complete in-memory backend: store, actions client, realtime hub.
///
/// Holds one business worth of CRM data. Seeding methods populate the
/// store directly, bypassing the actions layer and its realtime echo.
pub struct MemoryBackend {
    store: Arc<Mutex<StoreInner>>,
    actions: Arc<MemoryActions>,
    realtime: Arc<MemoryRealtime>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let store = Arc::new(Mutex::new(StoreInner::default()));
        let realtime = Arc::new(MemoryRealtime::new());
        let actions = Arc::new(MemoryActions {
            store: store.clone(),
            hub: realtime.clone(),
        });
        Self {
            store,
            actions,
            realtime,
        }
    }

    pub fn actions(&self) -> Arc<MemoryActions> {
        self.actions.clone()
    }

    pub fn realtime(&self) -> Arc<MemoryRealtime> {
        self.realtime.clone()
    }

    /// Publish a raw event, as the production channel would.
    pub fn publish(&self, topic: Topic, event: RealtimeEvent) {
        self.realtime.publish(topic, event);
    }

    /// Seed a conversation; a lead record for its `lead_id` is created
    /// if absent so the tools panel has something to show.
    pub fn seed_conversation(&self, conversation: Conversation) {
        let mut store = lock_unpoisoned(&self.store);
        store
            .leads
            .entry(conversation.lead_id.clone())
            .or_insert_with(|| LeadDetails {
                id: conversation.lead_id.clone(),
                name: conversation
                    .lead_name
                    .clone()
                    .unwrap_or_else(|| "Contacto desconocido".to_string()),
                email: None,
                phone: None,
            });
        store
            .conversations
            .insert(conversation.id.clone(), conversation);
    }

    pub fn seed_message(&self, message: ChatMessage) {
        lock_unpoisoned(&self.store)
            .messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message);
    }

    pub fn seed_board(&self, board: KanbanBoard) {
        lock_unpoisoned(&self.store).board = board;
    }

    /// Register an agent record and bind it to a user id.
    pub fn seed_agent(&self, _business_id: &BusinessId, user_id: &UserId, agent: AgentRef) {
        let mut store = lock_unpoisoned(&self.store);
        store.agents.push(agent.clone());
        store.agent_by_user.insert(user_id.clone(), agent);
    }

    pub fn seed_tag(&self, tag: TagRef) {
        lock_unpoisoned(&self.store).tags.push(tag);
    }

    pub fn seed_lead(&self, lead: LeadDetails) {
        lock_unpoisoned(&self.store).leads.insert(lead.id.clone(), lead);
    }

    /// Make the next call to `op` fail with a transport error.
    pub fn fail_next(&self, op: &str) {
        lock_unpoisoned(&self.store).fail_next.insert(op.to_string());
    }

    /// True while an injected failure for `op` has not been consumed,
    /// i.e. the operation was never called.
    pub fn fail_next_pending(&self, op: &str) -> bool {
        lock_unpoisoned(&self.store).fail_next.contains(op)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}
