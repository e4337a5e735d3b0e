// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime merge layer for the Vendra CRM core.
//!
//! Decodes insert/update row notifications from a generic
//! publish/subscribe channel and folds them idempotently into locally
//! held conversation state: transcript inserts are deduplicated by
//! message id, row patches pass a staleness check before applying.
//! A malformed message payload degrades into a visible parse-error
//! marker; a malformed row patch is logged and skipped.

pub mod merger;
pub mod payload;

pub use merger::{apply_row_update, EventMerger, MergeOutcome, RowOutcome, TranscriptState};
pub use payload::{
    conversation_to_row, decode_message, decode_row_update, message_to_row, RowUpdate,
};
