// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Actor capability resolution for a single conversation.
//!
//! Resolution is a pure read-derived decision: admins and the business
//! owner get full capability outright; everyone else needs an agent
//! record bound to their user id within the business. A lookup error
//! yields an error, never a silently granted capability.

use tracing::debug;

use vendra_core::traits::ActionClient;
use vendra_core::types::{ActorContext, ActorRole, AgentRef, BusinessScope, Conversation};
use vendra_core::VendraError;

/// What the current actor may do with a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub can_send_message: bool,
    pub can_manage_conversation: bool,
    /// The CRM agent identity the capability is bound to, when the
    /// actor acts as an agent record rather than admin/owner.
    pub acting_agent: Option<AgentRef>,
}

impl Capabilities {
    fn full(acting_agent: Option<AgentRef>) -> Self {
        Self {
            can_send_message: true,
            can_manage_conversation: true,
            acting_agent,
        }
    }

    /// No capability at all.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Resolve the capability set for `actor` on `conversation`.
///
/// Resolution order: admin role, then business owner id, then agent
/// record lookup. `can_send_message` is withdrawn whenever the
/// conversation is `cerrada`, regardless of role.
pub async fn resolve_capabilities(
    actions: &dyn ActionClient,
    actor: &ActorContext,
    scope: &BusinessScope,
    conversation: &Conversation,
) -> Result<Capabilities, VendraError> {
    let mut caps = if actor.role == ActorRole::Admin {
        Capabilities::full(None)
    } else if actor.user_id == scope.owner_id {
        Capabilities::full(None)
    } else {
        match actions
            .find_agent_for_user(&actor.user_id, &scope.business_id)
            .await?
        {
            Some(agent) => Capabilities::full(Some(agent)),
            None => Capabilities::none(),
        }
    };

    if conversation.status.is_terminal() {
        caps.can_send_message = false;
    }

    debug!(
        conversation_id = %conversation.id,
        user_id = %actor.user_id,
        role = %actor.role,
        can_send = caps.can_send_message,
        can_manage = caps.can_manage_conversation,
        "capabilities resolved"
    );

    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vendra_core::types::{
        ActorRole, AgentId, ChannelOrigin, ConversationId, ConversationStatus, LeadId, UserId,
    };
    use vendra_test_utils::MemoryBackend;

    fn conversation(status: ConversationStatus) -> Conversation {
        Conversation {
            id: ConversationId::from("conv-1"),
            status,
            channel: ChannelOrigin::Whatsapp,
            assigned_agent: None,
            lead_id: LeadId::from("lead-1"),
            lead_name: Some("Ana Torres".to_string()),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: ActorRole, user: &str) -> ActorContext {
        ActorContext {
            user_id: UserId::from(user),
            display_name: user.to_string(),
            role,
        }
    }

    fn scope() -> BusinessScope {
        BusinessScope {
            business_id: "biz-1".into(),
            owner_id: UserId::from("owner-1"),
        }
    }

    #[tokio::test]
    async fn admin_gets_full_capability_without_lookup() {
        let backend = MemoryBackend::new();
        let caps = resolve_capabilities(
            backend.actions().as_ref(),
            &actor(ActorRole::Admin, "user-x"),
            &scope(),
            &conversation(ConversationStatus::Automated),
        )
        .await
        .unwrap();

        assert!(caps.can_send_message);
        assert!(caps.can_manage_conversation);
        assert!(caps.acting_agent.is_none());
    }

    #[tokio::test]
    async fn owner_gets_full_capability() {
        let backend = MemoryBackend::new();
        let caps = resolve_capabilities(
            backend.actions().as_ref(),
            &actor(ActorRole::CrmAgent, "owner-1"),
            &scope(),
            &conversation(ConversationStatus::Automated),
        )
        .await
        .unwrap();

        assert!(caps.can_send_message);
        assert!(caps.can_manage_conversation);
    }

    #[tokio::test]
    async fn agent_record_binds_the_capability() {
        let backend = MemoryBackend::new();
        backend.seed_agent(
            &scope().business_id,
            &UserId::from("user-a"),
            AgentRef {
                id: AgentId::from("agent-7"),
                name: Some("Val".to_string()),
            },
        );

        let caps = resolve_capabilities(
            backend.actions().as_ref(),
            &actor(ActorRole::CrmAgent, "user-a"),
            &scope(),
            &conversation(ConversationStatus::Automated),
        )
        .await
        .unwrap();

        assert!(caps.can_send_message);
        assert_eq!(
            caps.acting_agent.map(|a| a.id),
            Some(AgentId::from("agent-7"))
        );
    }

    #[tokio::test]
    async fn stranger_gets_no_capability() {
        let backend = MemoryBackend::new();
        let caps = resolve_capabilities(
            backend.actions().as_ref(),
            &actor(ActorRole::None, "user-nobody"),
            &scope(),
            &conversation(ConversationStatus::Automated),
        )
        .await
        .unwrap();

        assert_eq!(caps, Capabilities::none());
    }

    #[tokio::test]
    async fn closed_conversation_blocks_send_for_every_role() {
        let backend = MemoryBackend::new();
        for role in [ActorRole::Admin, ActorRole::BusinessOwner, ActorRole::CrmAgent] {
            let caps = resolve_capabilities(
                backend.actions().as_ref(),
                &actor(role, "owner-1"),
                &scope(),
                &conversation(ConversationStatus::Closed),
            )
            .await
            .unwrap();

            assert!(!caps.can_send_message, "role {role} could send on cerrada");
        }
    }

    #[tokio::test]
    async fn lookup_error_is_surfaced_not_granted() {
        let backend = MemoryBackend::new();
        backend.fail_next("find_agent_for_user");

        let result = resolve_capabilities(
            backend.actions().as_ref(),
            &actor(ActorRole::CrmAgent, "user-a"),
            &scope(),
            &conversation(ConversationStatus::Automated),
        )
        .await;

        assert!(result.is_err());
    }
}
