// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Vendra external boundaries.
//!
//! Both adapters extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod actions;
pub mod adapter;
pub mod realtime;

pub use actions::ActionClient;
pub use adapter::ServiceAdapter;
pub use realtime::{ChangeKind, EventHandler, RealtimeChannel, RealtimeEvent, Subscription, Topic};
