// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Actions-layer client trait: the request/response boundary to the
//! external relational store.
//!
//! Every operation is a single atomic server call returning either the
//! confirmed data or an error. Management operations (assign, pause,
//! resume, archive, unarchive, tag update) also record a `system`
//! transcript entry server-side, which reaches subscribers through the
//! realtime channel.

use async_trait::async_trait;

use crate::error::VendraError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{
    AgentId, AgentRef, BusinessId, ChatMessage, Conversation, ConversationId,
    ConversationPreview, InboxFilter, KanbanBoard, LeadDetails, LeadId, SendMessageParams,
    StageId, TagId, TagRef, UserId,
};

/// Client for the actions layer fronting the external relational store.
#[async_trait]
pub trait ActionClient: ServiceAdapter {
    // --- Conversation operations ---

    /// Persists a new message. A successful agent-authored send also
    /// moves the conversation to `en_espera_agente` server-side; the
    /// new status arrives back as a row-update event.
    async fn send_message(&self, params: SendMessageParams) -> Result<ChatMessage, VendraError>;

    /// Sets or clears the assigned agent. Orthogonal to status.
    async fn assign_agent(
        &self,
        conversation_id: &ConversationId,
        agent_id: Option<&AgentId>,
        actor_name: &str,
    ) -> Result<Conversation, VendraError>;

    /// Suppresses the automated assistant (`pausar`).
    async fn pause_automation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError>;

    /// Re-enables the automated assistant (`reanudar`).
    async fn resume_automation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError>;

    /// Parks the conversation out of the active inbox (`archivar`).
    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError>;

    /// Returns an archived conversation to `en_espera_agente`
    /// (`desarchivar`).
    async fn unarchive_conversation(
        &self,
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<Conversation, VendraError>;

    async fn fetch_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Conversation, VendraError>;

    /// Message history in `created_at` ascending order, capped at
    /// `limit` when given.
    async fn fetch_messages(
        &self,
        conversation_id: &ConversationId,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, VendraError>;

    /// Inbox listing: filtered previews ordered by last activity,
    /// newest first.
    async fn list_conversations(
        &self,
        business_id: &BusinessId,
        filter: &InboxFilter,
    ) -> Result<Vec<ConversationPreview>, VendraError>;

    // --- Lead and pipeline operations ---

    /// Replaces the lead's assigned tag set.
    async fn update_lead_tags(
        &self,
        lead_id: &LeadId,
        tag_ids: &[TagId],
        conversation_id: &ConversationId,
        actor_name: &str,
    ) -> Result<(), VendraError>;

    /// Persists a cross-column pipeline move for the lead.
    async fn move_lead_to_stage(
        &self,
        lead_id: &LeadId,
        stage_id: &StageId,
    ) -> Result<(), VendraError>;

    async fn fetch_board(&self, business_id: &BusinessId) -> Result<KanbanBoard, VendraError>;

    async fn fetch_lead(&self, lead_id: &LeadId) -> Result<LeadDetails, VendraError>;

    /// Tag ids currently assigned to the lead.
    async fn lead_tag_ids(&self, lead_id: &LeadId) -> Result<Vec<TagId>, VendraError>;

    // --- Business-scoped catalog lookups ---

    /// The CRM agent record bound to a user within a business, if any.
    /// Used by permission resolution; an `Err` here must never be
    /// interpreted as a granted capability.
    async fn find_agent_for_user(
        &self,
        user_id: &UserId,
        business_id: &BusinessId,
    ) -> Result<Option<AgentRef>, VendraError>;

    async fn list_agents(&self, business_id: &BusinessId) -> Result<Vec<AgentRef>, VendraError>;

    async fn list_tags(&self, business_id: &BusinessId) -> Result<Vec<TagRef>, VendraError>;
}
