// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The agent-facing conversation inbox: filtered previews of a
//! business's conversations, newest activity first.

use std::sync::Arc;

use tracing::debug;

use vendra_core::VendraError;
use vendra_core::traits::ActionClient;
use vendra_core::types::{BusinessId, ConversationPreview, InboxFilter, StatusFilter};

/// A filtered listing of conversations for one business.
pub struct Inbox {
    actions: Arc<dyn ActionClient>,
    business_id: BusinessId,
    filter: InboxFilter,
    items: Vec<ConversationPreview>,
    list_limit: usize,
    preview_length: usize,
}

impl Inbox {
    pub fn new(
        actions: Arc<dyn ActionClient>,
        business_id: BusinessId,
        list_limit: usize,
        preview_length: usize,
    ) -> Self {
        Self {
            actions,
            business_id,
            filter: InboxFilter::default(),
            items: Vec::new(),
            list_limit,
            preview_length,
        }
    }

    pub fn items(&self) -> &[ConversationPreview] {
        &self.items
    }

    pub fn filter(&self) -> &InboxFilter {
        &self.filter
    }

    /// Re-fetch the listing with the current filter.
    pub async fn refresh(&mut self) -> Result<&[ConversationPreview], VendraError> {
        let mut items = self
            .actions
            .list_conversations(&self.business_id, &self.filter)
            .await?;

        items.truncate(self.list_limit);
        for item in &mut items {
            if item.preview.chars().count() > self.preview_length {
                item.preview = item.preview.chars().take(self.preview_length).collect();
            }
        }

        debug!(
            business_id = %self.business_id,
            count = items.len(),
            "inbox refreshed"
        );
        self.items = items;
        Ok(&self.items)
    }

    /// Switch between active and archived conversations.
    pub async fn set_status_filter(
        &mut self,
        status: StatusFilter,
    ) -> Result<&[ConversationPreview], VendraError> {
        self.filter.status = status;
        self.refresh().await
    }

    /// Filter by lead name, case-insensitively. `None` clears the
    /// search.
    pub async fn search(
        &mut self,
        term: Option<String>,
    ) -> Result<&[ConversationPreview], VendraError> {
        self.filter.search = term.filter(|t| !t.trim().is_empty());
        self.refresh().await
    }
}
