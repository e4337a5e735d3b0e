// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the in-memory backend with a default
//! business scope and configuration, and hands out panels, inboxes,
//! and drag reconcilers wired against it.

use vendra_config::VendraConfig;
use vendra_core::VendraError;
use vendra_core::types::{
    ActorContext, ActorRole, AgentId, AgentRef, BusinessScope, ChatMessage, Conversation,
    ConversationId, KanbanBoard, TagId, TagRef, UserId,
};
use vendra_panel::{ConversationPanel, Inbox};
use vendra_pipeline::DragReconciler;

use crate::backend::MemoryBackend;

/// Builder for seeding the harness before use.
pub struct TestHarnessBuilder {
    conversations: Vec<Conversation>,
    messages: Vec<ChatMessage>,
    tags: Vec<TagRef>,
    agents: Vec<(AgentRef, UserId)>,
    board: Option<KanbanBoard>,
    config: VendraConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            conversations: Vec::new(),
            messages: Vec::new(),
            tags: Vec::new(),
            agents: Vec::new(),
            board: None,
            config: VendraConfig::default(),
        }
    }

    pub fn with_conversation(mut self, conversation: Conversation) -> Self {
        self.conversations.push(conversation);
        self
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_tag(mut self, id: &str, name: &str) -> Self {
        self.tags.push(TagRef {
            id: TagId::from(id),
            name: name.to_string(),
            color: None,
        });
        self
    }

    /// Register a CRM agent record bound to a user id.
    pub fn with_agent(mut self, agent_id: &str, name: &str, user_id: &str) -> Self {
        self.agents.push((
            AgentRef {
                id: AgentId::from(agent_id),
                name: Some(name.to_string()),
            },
            UserId::from(user_id),
        ));
        self
    }

    pub fn with_board(mut self, board: KanbanBoard) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_config(mut self, config: VendraConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestHarness {
        let backend = MemoryBackend::new();
        let scope = TestHarness::default_scope();

        for conversation in self.conversations {
            backend.seed_conversation(conversation);
        }
        for message in self.messages {
            backend.seed_message(message);
        }
        for tag in self.tags {
            backend.seed_tag(tag);
        }
        for (agent, user_id) in self.agents {
            backend.seed_agent(&scope.business_id, &user_id, agent);
        }
        if let Some(board) = self.board {
            backend.seed_board(board);
        }

        TestHarness {
            backend,
            scope,
            config: self.config,
        }
    }
}

/// A complete test environment around the in-memory backend.
pub struct TestHarness {
    backend: MemoryBackend,
    scope: BusinessScope,
    config: VendraConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The scope every harness uses: business `biz-1` owned by
    /// `owner-1`.
    pub fn default_scope() -> BusinessScope {
        BusinessScope {
            business_id: "biz-1".into(),
            owner_id: UserId::from("owner-1"),
        }
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    pub fn scope(&self) -> &BusinessScope {
        &self.scope
    }

    pub fn config(&self) -> &VendraConfig {
        &self.config
    }

    /// Open a conversation panel as the given actor.
    pub async fn open_panel(
        &self,
        role: ActorRole,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<ConversationPanel, VendraError> {
        let actor = ActorContext {
            user_id: UserId::from(user_id),
            display_name: user_id.to_string(),
            role,
        };
        ConversationPanel::open(
            self.backend.actions(),
            self.backend.realtime().as_ref(),
            actor,
            self.scope.clone(),
            &ConversationId::from(conversation_id),
            self.config.inbox.history_limit,
        )
        .await
    }

    /// An inbox over the harness business.
    pub fn inbox(&self) -> Inbox {
        Inbox::new(
            self.backend.actions(),
            self.scope.business_id.clone(),
            self.config.inbox.list_limit,
            self.config.inbox.preview_length,
        )
    }

    /// A drag reconciler loaded from the stored board.
    pub async fn reconciler(&self) -> Result<DragReconciler, VendraError> {
        DragReconciler::load(
            self.backend.actions(),
            self.scope.business_id.clone(),
            self.config.board.refresh_after_move,
        )
        .await
    }
}
