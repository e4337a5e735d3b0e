// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic drag-and-drop reconciliation for the pipeline board.
//!
//! The gesture is a small FSM: `idle -> dragging -> (dropped-valid |
//! dropped-no-op) -> idle`. Only one gesture is active at a time.
//! Cross-column drops mutate the board optimistically under a full
//! snapshot and persist through a single action call; on rejection the
//! snapshot is swapped back wholesale. Same-column reorders are visual
//! only and never persisted.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vendra_core::optimistic::commit_or_rollback;
use vendra_core::traits::ActionClient;
use vendra_core::types::{BusinessId, KanbanBoard, LeadId, StageId};
use vendra_core::VendraError;

use crate::board;

/// Phase of the current drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging { lead_id: LeadId },
}

/// How a completed drop was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Cross-column move, persisted server-side.
    Moved,
    /// Same-column reorder, applied visually only.
    Reordered,
    /// Source and destination were identical.
    NoOp,
}

/// Holds one board and reconciles drag gestures against the actions
/// layer.
pub struct DragReconciler {
    actions: Arc<dyn ActionClient>,
    business_id: BusinessId,
    board: KanbanBoard,
    phase: DragPhase,
    refresh_after_move: bool,
}

impl DragReconciler {
    pub fn new(
        actions: Arc<dyn ActionClient>,
        business_id: BusinessId,
        board: KanbanBoard,
        refresh_after_move: bool,
    ) -> Self {
        Self {
            actions,
            business_id,
            board,
            phase: DragPhase::Idle,
            refresh_after_move,
        }
    }

    /// Fetch the board for `business_id` and wrap it in a reconciler.
    pub async fn load(
        actions: Arc<dyn ActionClient>,
        business_id: BusinessId,
        refresh_after_move: bool,
    ) -> Result<Self, VendraError> {
        let board = actions.fetch_board(&business_id).await?;
        Ok(Self::new(actions, business_id, board, refresh_after_move))
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Capture the dragged lead. Rejected if a gesture is already
    /// active or the lead is not on the board.
    pub fn begin_drag(&mut self, lead_id: &LeadId) -> Result<(), VendraError> {
        if self.phase != DragPhase::Idle {
            return Err(VendraError::Validation(
                "a drag gesture is already active".to_string(),
            ));
        }
        if board::locate_lead(&self.board, lead_id).is_none() {
            return Err(VendraError::Validation(format!(
                "lead {lead_id} is not on the board"
            )));
        }
        self.phase = DragPhase::Dragging {
            lead_id: lead_id.clone(),
        };
        debug!(lead_id = %lead_id, "drag started");
        Ok(())
    }

    /// Abandon the active gesture without touching the board.
    pub fn cancel_drag(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Complete the active gesture by dropping onto `dest_stage` at
    /// `dest_index`.
    ///
    /// Cross-column drops persist via a single server call; on failure
    /// the board is restored to its pre-drag snapshot and the error is
    /// surfaced. On success a full board refresh reconciles any
    /// server-derived state.
    pub async fn complete_drag(
        &mut self,
        dest_stage: &StageId,
        dest_index: usize,
    ) -> Result<DropOutcome, VendraError> {
        let DragPhase::Dragging { lead_id } = std::mem::replace(&mut self.phase, DragPhase::Idle)
        else {
            return Err(VendraError::Validation(
                "no drag gesture is active".to_string(),
            ));
        };

        let Some((source_col, source_index)) = board::locate_lead(&self.board, &lead_id) else {
            return Err(VendraError::Validation(format!(
                "dragged lead {lead_id} vanished from the board"
            )));
        };
        let Some(dest_col) = board::locate_stage(&self.board, dest_stage) else {
            return Err(VendraError::Validation(format!(
                "unknown pipeline stage {dest_stage}"
            )));
        };

        // Same-column: reorder is visual only, nothing is persisted.
        if source_col == dest_col {
            if source_index == dest_index {
                return Ok(DropOutcome::NoOp);
            }
            board::reorder_within(&mut self.board, source_col, source_index, dest_index);
            debug!(lead_id = %lead_id, "same-column reorder applied locally");
            return Ok(DropOutcome::Reordered);
        }

        let move_lead = lead_id.clone();
        let move_stage = dest_stage.clone();
        commit_or_rollback(
            &mut self.board,
            |board| {
                if let Some(mut card) = board::remove_lead(board, &move_lead) {
                    card.stage_id = move_stage.clone();
                    board::insert_lead(board, dest_col, dest_index, card);
                }
            },
            self.actions.move_lead_to_stage(&lead_id, dest_stage),
        )
        .await?;

        info!(
            lead_id = %lead_id,
            stage_id = %dest_stage,
            "pipeline move persisted"
        );

        if self.refresh_after_move {
            // The move itself is already confirmed; a failed refresh
            // leaves the optimistic board in place.
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "board refresh after move failed");
            }
        }

        Ok(DropOutcome::Moved)
    }

    /// Re-fetch the whole board from the actions layer.
    pub async fn refresh(&mut self) -> Result<(), VendraError> {
        self.board = self.actions.fetch_board(&self.business_id).await?;
        Ok(())
    }
}
