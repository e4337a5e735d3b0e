// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation lifecycle transition table.
//!
//! Status is owned by the external store; this module only answers
//! whether a transition is allowed and what it leads to. The caller
//! issues the server call and applies the confirmed row -- local state
//! is never mutated on the strength of the table alone.

use strum::Display;

use vendra_core::types::ConversationStatus;
use vendra_core::VendraError;

/// A lifecycle action an agent can request on a conversation.
///
/// `asignar_agente` is deliberately absent: assignment is orthogonal to
/// status and handled by [`crate::lifecycle::assign_agent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LifecycleAction {
    /// Suppress the automated assistant in favor of a human.
    #[strum(serialize = "pausar")]
    Pause,
    /// Hand the conversation back to the automated assistant.
    #[strum(serialize = "reanudar")]
    Resume,
    /// Park the conversation out of the active inbox.
    #[strum(serialize = "archivar")]
    Archive,
    /// Bring an archived conversation back, awaiting an agent.
    #[strum(serialize = "desarchivar")]
    Unarchive,
}

impl LifecycleAction {
    /// All actions, for exhaustive table checks.
    pub const ALL: [LifecycleAction; 4] = [
        LifecycleAction::Pause,
        LifecycleAction::Resume,
        LifecycleAction::Archive,
        LifecycleAction::Unarchive,
    ];
}

/// Returns the target status for `action` from `from`, or a
/// [`VendraError::Transition`] if the pair is not in the allowed table.
///
/// The table:
/// - `pausar`: {automatizada, en_espera_agente} -> hitl_activo
/// - `reanudar`: hitl_activo -> automatizada
/// - `archivar`: any state except cerrada -> archivada
/// - `desarchivar`: archivada -> en_espera_agente
///
/// `cerrada` is terminal: nothing is allowed out of it. `desarchivar`
/// always re-enters at `en_espera_agente`; the pre-archive status is
/// not recorded anywhere.
pub fn next_status(
    from: ConversationStatus,
    action: LifecycleAction,
) -> Result<ConversationStatus, VendraError> {
    use ConversationStatus::*;
    use LifecycleAction::*;

    let target = match (from, action) {
        (Automated | AwaitingAgent, Pause) => HitlActive,
        (HitlActive, Resume) => Automated,
        (Automated | HitlActive | AwaitingAgent | Archived, Archive) => Archived,
        (Archived, Unarchive) => AwaitingAgent,
        (from, action) => {
            return Err(VendraError::Transition {
                from,
                action: action.to_string(),
            });
        }
    };

    Ok(target)
}
