// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small domain fixtures shared by tests and the demo walkthrough.

use chrono::Utc;

use vendra_core::types::{
    ChannelOrigin, ChatMessage, Conversation, ConversationId, ConversationStatus, KanbanBoard,
    LeadCard, LeadId, MessageId, MessagePart, MessageRole, PipelineColumn, StageId,
};

/// A conversation with a synthetic lead, in the given status.
pub fn conversation_fixture(id: &str, status: ConversationStatus) -> Conversation {
    Conversation {
        id: ConversationId::from(id),
        status,
        channel: ChannelOrigin::Whatsapp,
        assigned_agent: None,
        lead_id: LeadId(format!("lead-{id}")),
        lead_name: Some(format!("Lead {id}")),
        updated_at: Utc::now(),
    }
}

/// A plain user text message.
pub fn message_fixture(id: &str, conversation_id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        id: MessageId::from(id),
        conversation_id: ConversationId::from(conversation_id),
        role: MessageRole::User,
        part: MessagePart::text(text),
        media: None,
        agent: None,
        created_at: Utc::now(),
    }
}

/// The canonical two-column board: `Nuevo: [l1, l2]`, `Contactado: []`.
pub fn board_fixture() -> KanbanBoard {
    KanbanBoard {
        columns: vec![
            PipelineColumn {
                id: StageId::from("nuevo"),
                name: "Nuevo".to_string(),
                leads: vec![
                    LeadCard {
                        id: LeadId::from("l1"),
                        name: "Lead l1".to_string(),
                        stage_id: StageId::from("nuevo"),
                    },
                    LeadCard {
                        id: LeadId::from("l2"),
                        name: "Lead l2".to_string(),
                        stage_id: StageId::from("nuevo"),
                    },
                ],
            },
            PipelineColumn {
                id: StageId::from("contactado"),
                name: "Contactado".to_string(),
                leads: vec![],
            },
        ],
    }
}
