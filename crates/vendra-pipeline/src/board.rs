// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural operations over the kanban board.
//!
//! These are the only code paths that mutate column membership; the
//! reconciler composes them inside an optimistic snapshot so the board
//! is never left half-moved.

use vendra_core::types::{KanbanBoard, LeadCard, LeadId, StageId};

/// Locate a lead: (column index, position within the column).
pub fn locate_lead(board: &KanbanBoard, lead_id: &LeadId) -> Option<(usize, usize)> {
    board.columns.iter().enumerate().find_map(|(ci, col)| {
        col.leads
            .iter()
            .position(|l| &l.id == lead_id)
            .map(|li| (ci, li))
    })
}

/// Index of the column for a stage id.
pub fn locate_stage(board: &KanbanBoard, stage_id: &StageId) -> Option<usize> {
    board.columns.iter().position(|c| &c.id == stage_id)
}

/// Remove a lead from whichever column holds it.
pub fn remove_lead(board: &mut KanbanBoard, lead_id: &LeadId) -> Option<LeadCard> {
    let (ci, li) = locate_lead(board, lead_id)?;
    Some(board.columns[ci].leads.remove(li))
}

/// Insert a card into a column at `index`, clamped to the column tail.
pub fn insert_lead(board: &mut KanbanBoard, column_index: usize, index: usize, card: LeadCard) {
    let leads = &mut board.columns[column_index].leads;
    let index = index.min(leads.len());
    leads.insert(index, card);
}

/// Move a card within one column from `from` to `to`, shifting the
/// cards in between.
pub fn reorder_within(board: &mut KanbanBoard, column_index: usize, from: usize, to: usize) {
    let leads = &mut board.columns[column_index].leads;
    if from >= leads.len() {
        return;
    }
    let card = leads.remove(from);
    let to = to.min(leads.len());
    leads.insert(to, card);
}

/// Total number of cards on the board.
pub fn lead_count(board: &KanbanBoard) -> usize {
    board.columns.iter().map(|c| c.leads.len()).sum()
}
