// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vendra conversation & pipeline sync core.
//!
//! This crate provides the foundational trait definitions, error types,
//! and domain types used throughout the Vendra workspace. The actions
//! layer and the realtime transport are consumed through the traits
//! defined here; everything above them is transport-agnostic.

pub mod error;
pub mod optimistic;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VendraError;
pub use types::{
    ActorContext, ActorRole, AgentId, AgentRef, BusinessId, BusinessScope, ChannelOrigin,
    ChatMessage, Conversation, ConversationId, ConversationPreview, ConversationStatus,
    HealthStatus, InboxFilter, KanbanBoard, LeadCard, LeadDetails, LeadId, MediaRef, MessageId,
    MessagePart, MessageRole, PipelineColumn, SendMessageParams, StageId, StatusFilter, TagId,
    TagRef, UserId,
};

pub use traits::{
    ActionClient, ChangeKind, EventHandler, RealtimeChannel, RealtimeEvent, ServiceAdapter,
    Subscription, Topic,
};
