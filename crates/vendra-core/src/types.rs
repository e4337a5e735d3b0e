// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Vendra workspace.
//!
//! Wire-level string values keep the upstream store's Spanish literals
//! (`automatizada`, `en_espera_agente`, ...) so snapshots round-trip
//! against the external relational store unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type!(
    /// Unique identifier for a conversation.
    ConversationId
);
id_type!(
    /// Unique identifier for a message within a conversation.
    MessageId
);
id_type!(
    /// Unique identifier for a lead (pipeline card).
    LeadId
);
id_type!(
    /// Unique identifier for a pipeline stage (kanban column).
    StageId
);
id_type!(
    /// Unique identifier for a CRM agent record.
    AgentId
);
id_type!(
    /// Unique identifier for a CRM tag.
    TagId
);
id_type!(
    /// Unique identifier for a business (CRM tenant).
    BusinessId
);
id_type!(
    /// Unique identifier for an authenticated user.
    UserId
);

/// Lifecycle status of a conversation.
///
/// `Closed` is terminal: no further status transition and no new
/// agent-authored messages. The allowed transition table lives in
/// `vendra-conversation`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ConversationStatus {
    /// The automated assistant is handling the conversation.
    #[strum(serialize = "automatizada")]
    #[serde(rename = "automatizada")]
    Automated,
    /// A human has intervened; automation is suppressed.
    #[strum(serialize = "hitl_activo")]
    #[serde(rename = "hitl_activo")]
    HitlActive,
    /// Waiting for a human agent to pick the conversation up.
    #[strum(serialize = "en_espera_agente")]
    #[serde(rename = "en_espera_agente")]
    AwaitingAgent,
    /// Parked out of the active inbox.
    #[strum(serialize = "archivada")]
    #[serde(rename = "archivada")]
    Archived,
    /// Terminal state.
    #[strum(serialize = "cerrada")]
    #[serde(rename = "cerrada")]
    Closed,
}

impl ConversationStatus {
    /// Whether the conversation accepts any further lifecycle change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationStatus::Closed)
    }
}

/// Role of the authenticated actor operating the panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ActorRole {
    Admin,
    BusinessOwner,
    CrmAgent,
    None,
}

/// Author role of a transcript message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Agent,
    System,
}

/// Normalized origin channel of a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ChannelOrigin {
    #[strum(serialize = "whatsapp")]
    #[serde(rename = "whatsapp")]
    Whatsapp,
    #[strum(serialize = "webchat")]
    #[serde(rename = "webchat")]
    Webchat,
    #[strum(serialize = "otro")]
    #[serde(rename = "otro")]
    Other,
}

impl ChannelOrigin {
    /// Normalize the free-form channel name carried by the upstream
    /// store into one of the known origins.
    pub fn from_channel_name(name: &str) -> Self {
        let lowered = name.trim().to_lowercase();
        if lowered.contains("whatsapp") {
            ChannelOrigin::Whatsapp
        } else if lowered == "webchat" || lowered == "web chat" {
            ChannelOrigin::Webchat
        } else {
            ChannelOrigin::Other
        }
    }
}

/// Basic identity of a CRM agent, as attached to conversations and
/// agent-authored messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: AgentId,
    /// Display name; the upstream store allows it to be null.
    pub name: Option<String>,
}

/// A CRM tag configured for a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
    pub color: Option<String>,
}

/// A single customer conversation as held by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub channel: ChannelOrigin,
    pub assigned_agent: Option<AgentRef>,
    pub lead_id: LeadId,
    pub lead_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Polymorphic payload of a transcript message.
///
/// The structured variants may arrive from the realtime channel as
/// JSON-encoded strings; `vendra-realtime` decodes them defensively and
/// produces `ParseError` when decoding fails, so a malformed event
/// degrades instead of disappearing from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagePart {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    FunctionResponse {
        #[serde(default)]
        data: serde_json::Value,
    },
    /// Degraded marker for a payload that could not be decoded.
    ParseError {
        raw: String,
        detail: String,
    },
}

impl MessagePart {
    /// Convenience constructor for a plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    /// The plain text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessagePart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Reference to an uploaded media object attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub media_type: Option<String>,
}

/// A transcript message. Immutable once created; identifiers are
/// globally unique and ordering is meaningful only by `created_at`,
/// never by arrival order over the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub part: MessagePart,
    pub media: Option<MediaRef>,
    /// Authoring agent for `role == Agent` messages, when bound to a
    /// CRM agent record.
    pub agent: Option<AgentRef>,
    pub created_at: DateTime<Utc>,
}

/// A lead card on the kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCard {
    pub id: LeadId,
    pub name: String,
    /// Current pipeline stage; kept in sync with the owning column by
    /// the drag reconciler.
    pub stage_id: StageId,
}

/// An ordered kanban column (pipeline stage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineColumn {
    pub id: StageId,
    pub name: String,
    pub leads: Vec<LeadCard>,
}

/// The full kanban board: ordered columns, each holding an ordered
/// sequence of leads. Every lead belongs to exactly one column at a
/// time; intra-column order is ephemeral.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanBoard {
    pub columns: Vec<PipelineColumn>,
}

/// Lead details shown in the tools panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDetails {
    pub id: LeadId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The authenticated actor, as produced by external token verification.
/// Recomputed per resolution, never persisted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: UserId,
    pub display_name: String,
    pub role: ActorRole,
}

/// Route-level identifiers scoping a panel to one business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessScope {
    pub business_id: BusinessId,
    pub owner_id: UserId,
}

/// Inbox status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum StatusFilter {
    /// Everything not archived or closed.
    #[default]
    #[strum(serialize = "activas")]
    #[serde(rename = "activas")]
    Active,
    #[strum(serialize = "archivadas")]
    #[serde(rename = "archivadas")]
    Archived,
}

/// Filter for the inbox conversation listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxFilter {
    pub status: StatusFilter,
    /// Case-insensitive lead-name search.
    pub search: Option<String>,
}

/// One row of the inbox conversation listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPreview {
    pub id: ConversationId,
    pub lead_id: LeadId,
    pub lead_name: String,
    /// Last message text, truncated for display.
    pub preview: String,
    pub last_message_at: DateTime<Utc>,
    pub status: ConversationStatus,
    pub channel: ChannelOrigin,
}

/// Parameters for the send-message action call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageParams {
    pub conversation_id: ConversationId,
    pub text: String,
    pub role: MessageRole,
    /// Bound CRM agent identity, when the sender is an agent record.
    /// Admins and owners send as `Agent` without one.
    pub agent_id: Option<AgentId>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
