// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sales-pipeline board logic for the Vendra CRM core.
//!
//! The board itself is plain data ([`vendra_core::types::KanbanBoard`]);
//! this crate owns the structural operations over it and the
//! snapshot/rollback drag reconciler that keeps it consistent with the
//! external store.

pub mod board;
pub mod drag;

pub use drag::{DragPhase, DragReconciler, DropOutcome};
