// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle transition execution against the actions layer.
//!
//! Transitions deliberately have no optimistic path: conversation
//! status controls downstream automation behavior, so the local
//! snapshot is only replaced by the server-confirmed row. Server
//! rejection leaves the snapshot untouched and is surfaced inline; no
//! automatic retry.

use tracing::info;

use vendra_core::traits::ActionClient;
use vendra_core::types::{AgentId, Conversation};
use vendra_core::VendraError;

use crate::permissions::Capabilities;
use crate::status::{next_status, LifecycleAction};

/// Execute a lifecycle transition on `current`.
///
/// Checks the capability and the transition table locally before any
/// network call; returns the server-confirmed conversation on success.
pub async fn execute_transition(
    actions: &dyn ActionClient,
    caps: &Capabilities,
    current: &Conversation,
    action: LifecycleAction,
    actor_name: &str,
) -> Result<Conversation, VendraError> {
    if !caps.can_manage_conversation {
        return Err(VendraError::Permission(format!(
            "actor may not manage conversation {}",
            current.id
        )));
    }

    // Local table check first; an invalid transition never reaches the
    // server.
    let target = next_status(current.status, action)?;

    let confirmed = match action {
        LifecycleAction::Pause => actions.pause_automation(&current.id, actor_name).await?,
        LifecycleAction::Resume => actions.resume_automation(&current.id, actor_name).await?,
        LifecycleAction::Archive => actions.archive_conversation(&current.id, actor_name).await?,
        LifecycleAction::Unarchive => {
            actions.unarchive_conversation(&current.id, actor_name).await?
        }
    };

    info!(
        conversation_id = %current.id,
        action = %action,
        from = %current.status,
        to = %confirmed.status,
        "lifecycle transition confirmed"
    );
    debug_assert_eq!(confirmed.status, target);

    Ok(confirmed)
}

/// Set or clear the assigned agent. Orthogonal to status: the confirmed
/// row keeps whatever status the conversation already had.
pub async fn assign_agent(
    actions: &dyn ActionClient,
    caps: &Capabilities,
    current: &Conversation,
    agent_id: Option<&AgentId>,
    actor_name: &str,
) -> Result<Conversation, VendraError> {
    if !caps.can_manage_conversation {
        return Err(VendraError::Permission(format!(
            "actor may not manage conversation {}",
            current.id
        )));
    }

    let confirmed = actions
        .assign_agent(&current.id, agent_id, actor_name)
        .await?;

    info!(
        conversation_id = %current.id,
        agent_id = agent_id.map(|a| a.0.as_str()).unwrap_or("<none>"),
        "agent assignment confirmed"
    );

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendra_core::types::{AgentId, ConversationStatus};
    use vendra_test_utils::{MemoryBackend, conversation_fixture};

    fn manage_caps() -> Capabilities {
        Capabilities {
            can_send_message: true,
            can_manage_conversation: true,
            acting_agent: None,
        }
    }

    #[tokio::test]
    async fn pause_confirms_hitl_status() {
        let backend = MemoryBackend::new();
        let conv = conversation_fixture("conv-1", ConversationStatus::Automated);
        backend.seed_conversation(conv.clone());

        let confirmed = execute_transition(
            backend.actions().as_ref(),
            &manage_caps(),
            &conv,
            LifecycleAction::Pause,
            "Val",
        )
        .await
        .unwrap();

        assert_eq!(confirmed.status, ConversationStatus::HitlActive);
    }

    #[tokio::test]
    async fn invalid_transition_never_reaches_the_server() {
        let backend = MemoryBackend::new();
        let conv = conversation_fixture("conv-1", ConversationStatus::Archived);
        backend.seed_conversation(conv.clone());
        // If the call went out despite the table, this would make it
        // fail loudly rather than silently succeed.
        backend.fail_next("resume_automation");

        let err = execute_transition(
            backend.actions().as_ref(),
            &manage_caps(),
            &conv,
            LifecycleAction::Resume,
            "Val",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VendraError::Transition { .. }));
        assert!(
            backend.fail_next_pending("resume_automation"),
            "server call should not have been issued"
        );
    }

    #[tokio::test]
    async fn missing_capability_is_a_permission_error() {
        let backend = MemoryBackend::new();
        let conv = conversation_fixture("conv-1", ConversationStatus::Automated);
        backend.seed_conversation(conv.clone());

        let err = execute_transition(
            backend.actions().as_ref(),
            &Capabilities::none(),
            &conv,
            LifecycleAction::Pause,
            "Val",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VendraError::Permission(_)));
    }

    #[tokio::test]
    async fn server_rejection_is_surfaced_unchanged() {
        let backend = MemoryBackend::new();
        let conv = conversation_fixture("conv-1", ConversationStatus::Automated);
        backend.seed_conversation(conv.clone());
        backend.fail_next("pause_automation");

        let err = execute_transition(
            backend.actions().as_ref(),
            &manage_caps(),
            &conv,
            LifecycleAction::Pause,
            "Val",
        )
        .await
        .unwrap_err();

        assert!(err.is_transport());
        // The store still holds the original status.
        let held = backend
            .actions()
            .fetch_conversation(&conv.id)
            .await
            .unwrap();
        assert_eq!(held.status, ConversationStatus::Automated);
    }

    #[tokio::test]
    async fn assignment_keeps_status() {
        let backend = MemoryBackend::new();
        let conv = conversation_fixture("conv-1", ConversationStatus::HitlActive);
        backend.seed_conversation(conv.clone());
        backend.seed_agent(
            &vendra_core::types::BusinessId::from("biz-1"),
            &vendra_core::types::UserId::from("user-2"),
            vendra_core::types::AgentRef {
                id: AgentId::from("agent-2"),
                name: Some("Val".to_string()),
            },
        );

        let confirmed = assign_agent(
            backend.actions().as_ref(),
            &manage_caps(),
            &conv,
            Some(&AgentId::from("agent-2")),
            "Val",
        )
        .await
        .unwrap();

        assert_eq!(confirmed.status, ConversationStatus::HitlActive);
        assert_eq!(
            confirmed.assigned_agent.map(|a| a.id),
            Some(AgentId::from("agent-2"))
        );
    }

    #[tokio::test]
    async fn unassignment_clears_the_agent() {
        let backend = MemoryBackend::new();
        let mut conv = conversation_fixture("conv-1", ConversationStatus::AwaitingAgent);
        conv.assigned_agent = Some(vendra_core::types::AgentRef {
            id: AgentId::from("agent-2"),
            name: None,
        });
        backend.seed_conversation(conv.clone());

        let confirmed = assign_agent(
            backend.actions().as_ref(),
            &manage_caps(),
            &conv,
            None,
            "Val",
        )
        .await
        .unwrap();

        assert!(confirmed.assigned_agent.is_none());
    }
}
