// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Panel and inbox behavior tests.
//!
//! These live as an integration test (rather than a `#[cfg(test)]`
//! module inside the crate) so that the crate-under-test and the copy
//! of `vendra-panel` reached through `vendra-test-utils` are the same
//! compiled instance.

use vendra_core::VendraError;
use vendra_core::types::{
    ActorRole, AgentId, ConversationId, ConversationStatus, MessageRole, StatusFilter, TagId,
};
use vendra_panel::ConversationPanel;
use vendra_test_utils::{TestHarness, conversation_fixture};

async fn open_admin_panel(harness: &TestHarness, conv: &str) -> ConversationPanel {
    harness
        .open_panel(ActorRole::Admin, "admin-1", conv)
        .await
        .expect("panel should open")
}

    #[tokio::test]
    async fn send_without_capability_never_reaches_the_server() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        // A stranger with no agent record.
        let panel = harness
            .open_panel(ActorRole::None, "user-x", "conv-1")
            .await
            .unwrap();
        harness.backend().fail_next("send_message");

        let err = panel.send_message("hola").await.unwrap_err();
        assert!(matches!(err, VendraError::Permission(_)));
        assert!(
            harness.backend().fail_next_pending("send_message"),
            "permission errors must not produce a server call"
        );
    }

    #[tokio::test]
    async fn closed_conversation_blocks_send_even_for_admin() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Closed))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        assert!(panel.send_block_reason().is_some());
        let err = panel.send_message("hola").await.unwrap_err();
        assert!(matches!(err, VendraError::Permission(_)));
    }

    #[tokio::test]
    async fn sent_message_survives_its_realtime_echo_once() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::HitlActive))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        let sent = panel.send_message("respuesta manual").await.unwrap();

        // The in-memory backend echoes every insert through the
        // realtime hub synchronously, so the echo already arrived.
        let transcript = panel.transcript();
        let copies = transcript.iter().filter(|m| m.id == sent.id).count();
        assert_eq!(copies, 1);
    }

    #[tokio::test]
    async fn empty_text_is_a_validation_error() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        let err = panel.send_message("   ").await.unwrap_err();
        assert!(matches!(err, VendraError::Validation(_)));
    }

    #[tokio::test]
    async fn pause_replaces_the_snapshot_after_confirmation() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        let status = panel.pause().await.unwrap();
        assert_eq!(status, ConversationStatus::HitlActive);
        assert_eq!(panel.status(), ConversationStatus::HitlActive);
    }

    #[tokio::test]
    async fn rejected_transition_leaves_the_snapshot_untouched() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;
        harness.backend().fail_next("pause_automation");

        let err = panel.pause().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(panel.status(), ConversationStatus::Automated);
    }

    #[tokio::test]
    async fn tag_toggle_rolls_back_on_server_failure() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .with_tag("tag-vip", "VIP")
            .build();
        let mut panel = open_admin_panel(&harness, "conv-1").await;

        // Optimistic add succeeds.
        panel.toggle_tag(&TagId::from("tag-vip")).await.unwrap();
        assert_eq!(panel.selected_tags(), [TagId::from("tag-vip")]);

        // Optimistic removal fails server-side and is restored.
        harness.backend().fail_next("update_lead_tags");
        let err = panel.toggle_tag(&TagId::from("tag-vip")).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(panel.selected_tags(), [TagId::from("tag-vip")]);
    }

    #[tokio::test]
    async fn assignment_is_orthogonal_to_status() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::AwaitingAgent))
            .with_agent("agent-1", "Val", "user-val")
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        panel.assign(Some(&AgentId::from("agent-1"))).await.unwrap();

        let conv = panel.conversation();
        assert_eq!(conv.status, ConversationStatus::AwaitingAgent);
        assert_eq!(conv.assigned_agent.map(|a| a.id), Some(AgentId::from("agent-1")));
    }

    #[tokio::test]
    async fn agent_send_auto_pauses_via_row_event() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .with_agent("agent-1", "Val", "user-val")
            .build();
        let panel = harness
            .open_panel(ActorRole::CrmAgent, "user-val", "conv-1")
            .await
            .unwrap();

        panel.send_message("me hago cargo").await.unwrap();

        // The backend pushed the server-side auto-pause as a row
        // update; the merger applied it.
        assert_eq!(panel.status(), ConversationStatus::AwaitingAgent);
    }

    #[tokio::test]
    async fn management_actions_record_system_messages() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        let panel = open_admin_panel(&harness, "conv-1").await;

        panel.pause().await.unwrap();

        let transcript = panel.transcript();
        assert!(
            transcript
                .iter()
                .any(|m| m.role == MessageRole::System
                    && m.part.as_text().is_some_and(|t| t.contains("pausada"))),
            "expected a system entry about the pause: {transcript:?}"
        );
    }

    #[tokio::test]
    async fn inbox_filter_is_respected() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .with_conversation(conversation_fixture("conv-2", ConversationStatus::Archived))
            .build();

        let mut inbox = harness.inbox();
        inbox.refresh().await.unwrap();
        assert_eq!(inbox.items().len(), 1);
        assert_eq!(inbox.items()[0].id, ConversationId::from("conv-1"));

        inbox.set_status_filter(StatusFilter::Archived).await.unwrap();
        assert_eq!(inbox.items().len(), 1);
        assert_eq!(inbox.items()[0].id, ConversationId::from("conv-2"));
    }

    #[tokio::test]
    async fn lookup_failure_on_open_surfaces_an_error() {
        let harness = TestHarness::builder()
            .with_conversation(conversation_fixture("conv-1", ConversationStatus::Automated))
            .build();
        harness.backend().fail_next("find_agent_for_user");

        let result = harness
            .open_panel(ActorRole::CrmAgent, "user-x", "conv-1")
            .await;
        assert!(result.is_err());
    }
