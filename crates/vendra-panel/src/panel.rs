// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation panel: one open conversation plus its tools.
//!
//! Composes permission resolution, the lifecycle state machine, and the
//! realtime merger. State-machine transitions apply only after server
//! confirmation; tag editing follows the optimistic snapshot/rollback
//! discipline; sends are refused locally when the capability is absent
//! and rely on id deduplication to survive the realtime echo.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use vendra_conversation::{
    Capabilities, LifecycleAction, assign_agent, execute_transition, resolve_capabilities,
};
use vendra_core::VendraError;
use vendra_core::optimistic::commit_or_rollback;
use vendra_core::traits::{ActionClient, RealtimeChannel};
use vendra_core::types::{
    ActorContext, AgentId, AgentRef, BusinessScope, ChatMessage, Conversation, ConversationId,
    ConversationStatus, LeadDetails, MessageRole, SendMessageParams, TagId, TagRef,
};
use vendra_realtime::{EventMerger, TranscriptState};

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// UI state for a single open conversation.
pub struct ConversationPanel {
    actions: Arc<dyn ActionClient>,
    actor: ActorContext,
    capabilities: Capabilities,
    conversation: Arc<Mutex<Conversation>>,
    transcript: Arc<Mutex<TranscriptState>>,
    lead: Option<LeadDetails>,
    available_tags: Vec<TagRef>,
    selected_tags: Vec<TagId>,
    agents: Vec<AgentRef>,
    _merger: EventMerger,
}

impl ConversationPanel {
    /// Open a conversation: fetch details and history, resolve the
    /// actor's capability, load the tools-panel data, and attach the
    /// realtime merger.
    pub async fn open(
        actions: Arc<dyn ActionClient>,
        realtime: &dyn RealtimeChannel,
        actor: ActorContext,
        scope: BusinessScope,
        conversation_id: &ConversationId,
        history_limit: usize,
    ) -> Result<Self, VendraError> {
        let conversation = actions.fetch_conversation(conversation_id).await?;
        let capabilities =
            resolve_capabilities(actions.as_ref(), &actor, &scope, &conversation).await?;

        let history = actions
            .fetch_messages(conversation_id, Some(history_limit))
            .await?;
        let mut transcript = TranscriptState::new();
        transcript.hydrate(history);

        let available_tags = actions.list_tags(&scope.business_id).await?;
        let agents = actions.list_agents(&scope.business_id).await?;

        // The lead record may be gone (external retention); the panel
        // still works without it.
        let lead = match actions.fetch_lead(&conversation.lead_id).await {
            Ok(details) => Some(details),
            Err(VendraError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let selected_tags = match lead {
            Some(_) => actions.lead_tag_ids(&conversation.lead_id).await?,
            None => Vec::new(),
        };

        let conversation = Arc::new(Mutex::new(conversation));
        let transcript = Arc::new(Mutex::new(transcript));
        let merger =
            EventMerger::attach(realtime, conversation.clone(), transcript.clone()).await?;

        info!(
            conversation_id = %conversation_id,
            actor = %actor.display_name,
            "conversation panel opened"
        );

        Ok(Self {
            actions,
            actor,
            capabilities,
            conversation,
            transcript,
            lead,
            available_tags,
            selected_tags,
            agents,
            _merger: merger,
        })
    }

    // --- Read accessors ---

    /// Snapshot of the held conversation row.
    pub fn conversation(&self) -> Conversation {
        lock_unpoisoned(&self.conversation).clone()
    }

    pub fn status(&self) -> ConversationStatus {
        lock_unpoisoned(&self.conversation).status
    }

    /// The transcript in arrival order.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock_unpoisoned(&self.transcript).messages().to_vec()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn lead(&self) -> Option<&LeadDetails> {
        self.lead.as_ref()
    }

    pub fn available_tags(&self) -> &[TagRef] {
        &self.available_tags
    }

    pub fn selected_tags(&self) -> &[TagId] {
        &self.selected_tags
    }

    pub fn agents(&self) -> &[AgentRef] {
        &self.agents
    }

    /// Why the send control is disabled, if it is.
    pub fn send_block_reason(&self) -> Option<&'static str> {
        if self.status().is_terminal() {
            Some("la conversación está cerrada")
        } else if !self.capabilities.can_send_message {
            Some("no tienes permiso para enviar mensajes en este chat")
        } else {
            None
        }
    }

    // --- Message sending ---

    /// Send an agent-authored message.
    ///
    /// Refused locally (never reaching the server) when the text is
    /// empty, the capability is absent, or the conversation has closed
    /// under us. On success the confirmed message is appended
    /// optimistically; the realtime echo is absorbed by deduplication.
    pub async fn send_message(&self, text: &str) -> Result<ChatMessage, VendraError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VendraError::Validation("message text is empty".to_string()));
        }
        if let Some(reason) = self.send_block_reason() {
            return Err(VendraError::Permission(reason.to_string()));
        }

        let params = SendMessageParams {
            conversation_id: lock_unpoisoned(&self.conversation).id.clone(),
            text: text.to_string(),
            role: MessageRole::Agent,
            agent_id: self.capabilities.acting_agent.as_ref().map(|a| a.id.clone()),
        };

        let message = self.actions.send_message(params).await?;

        // Optimistic local append; a later realtime echo of the same
        // row is a duplicate by id.
        lock_unpoisoned(&self.transcript).insert(message.clone());
        debug!(message_id = %message.id, "message sent and appended");

        Ok(message)
    }

    // --- Lifecycle management ---

    /// Suppress the assistant (`pausar`).
    pub async fn pause(&self) -> Result<ConversationStatus, VendraError> {
        self.transition(LifecycleAction::Pause).await
    }

    /// Re-enable the assistant (`reanudar`).
    pub async fn resume(&self) -> Result<ConversationStatus, VendraError> {
        self.transition(LifecycleAction::Resume).await
    }

    /// Park the conversation (`archivar`).
    pub async fn archive(&self) -> Result<ConversationStatus, VendraError> {
        self.transition(LifecycleAction::Archive).await
    }

    /// Bring the conversation back (`desarchivar`).
    pub async fn unarchive(&self) -> Result<ConversationStatus, VendraError> {
        self.transition(LifecycleAction::Unarchive).await
    }

    async fn transition(
        &self,
        action: LifecycleAction,
    ) -> Result<ConversationStatus, VendraError> {
        let current = self.conversation();
        let confirmed = execute_transition(
            self.actions.as_ref(),
            &self.capabilities,
            &current,
            action,
            &self.actor.display_name,
        )
        .await?;

        let status = confirmed.status;
        *lock_unpoisoned(&self.conversation) = confirmed;
        Ok(status)
    }

    /// Set or clear the assigned agent.
    pub async fn assign(&self, agent_id: Option<&AgentId>) -> Result<(), VendraError> {
        let current = self.conversation();
        let confirmed = assign_agent(
            self.actions.as_ref(),
            &self.capabilities,
            &current,
            agent_id,
            &self.actor.display_name,
        )
        .await?;

        *lock_unpoisoned(&self.conversation) = confirmed;
        Ok(())
    }

    // --- Tag editing ---

    /// Toggle one tag on the lead, optimistically.
    ///
    /// The new tag set is applied locally first; on server rejection
    /// the previous set is restored and the error surfaced.
    pub async fn toggle_tag(&mut self, tag_id: &TagId) -> Result<&[TagId], VendraError> {
        let Some(lead) = self.lead.as_ref() else {
            return Err(VendraError::Validation(
                "no lead record to tag".to_string(),
            ));
        };
        if !self.capabilities.can_manage_conversation {
            return Err(VendraError::Permission(
                "actor may not manage this conversation".to_string(),
            ));
        }

        let mut next = self.selected_tags.clone();
        if let Some(pos) = next.iter().position(|t| t == tag_id) {
            next.remove(pos);
        } else {
            next.push(tag_id.clone());
        }

        let conversation_id = lock_unpoisoned(&self.conversation).id.clone();
        let lead_id = lead.id.clone();
        let applied = next.clone();
        commit_or_rollback(
            &mut self.selected_tags,
            |tags| *tags = applied,
            self.actions.update_lead_tags(
                &lead_id,
                &next,
                &conversation_id,
                &self.actor.display_name,
            ),
        )
        .await?;

        Ok(&self.selected_tags)
    }
}
