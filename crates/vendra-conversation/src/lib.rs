// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle and permissions for the Vendra CRM core.
//!
//! Two concerns live here:
//!
//! - **Permission resolution** ([`permissions`]): turning the opaque
//!   authenticated actor into a capability set for one conversation.
//! - **The lifecycle state machine** ([`status`], [`lifecycle`]):
//!   validating transitions locally and executing them as single atomic
//!   server calls, applied only after confirmation.

pub mod lifecycle;
pub mod permissions;
pub mod status;

pub use lifecycle::{assign_agent, execute_transition};
pub use permissions::{resolve_capabilities, Capabilities};
pub use status::{next_status, LifecycleAction};
