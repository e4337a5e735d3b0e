// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation panel orchestration for the Vendra CRM back office.
//!
//! [`ConversationPanel`] drives a single open conversation: resolved
//! capability feeds the send control, the realtime merger keeps the
//! transcript and the conversation row current, and the tools-panel
//! actions (assign, pause/resume, archive/unarchive, tag edit) go
//! through the actions layer with the discipline each one requires.
//! [`Inbox`] is the filtered conversation listing around it.

pub mod inbox;
pub mod panel;

pub use inbox::Inbox;
pub use panel::ConversationPanel;
