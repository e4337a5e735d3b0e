// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reusable optimistic-command helper: snapshot, apply, call,
//! commit-or-rollback.
//!
//! Used by the kanban drag reconciler and the tools-panel tag editor.
//! The state is never corrected incrementally on failure -- the
//! pre-mutation snapshot is swapped back wholesale.

use std::future::Future;

use tracing::debug;

use crate::error::VendraError;

/// Apply `mutate` to `state` optimistically, then await `call`.
///
/// On `Ok`, the mutation is kept and the call result returned. On
/// `Err`, `state` is restored to the snapshot taken before the
/// mutation and the error is returned for the caller to surface.
pub async fn commit_or_rollback<S, T, Fut>(
    state: &mut S,
    mutate: impl FnOnce(&mut S),
    call: Fut,
) -> Result<T, VendraError>
where
    S: Clone,
    Fut: Future<Output = Result<T, VendraError>>,
{
    let snapshot = state.clone();
    mutate(state);

    match call.await {
        Ok(value) => Ok(value),
        Err(err) => {
            debug!(error = %err, "optimistic call failed, rolling back");
            *state = snapshot;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_keeps_mutation() {
        let mut state = vec![1, 2];
        let result = commit_or_rollback(&mut state, |s| s.push(3), async { Ok(()) }).await;
        assert!(result.is_ok());
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() {
        let mut state = vec![1, 2];
        let result = commit_or_rollback(&mut state, |s| s.clear(), async {
            Err::<(), _>(VendraError::transport("rejected"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(state, vec![1, 2]);
    }

    #[tokio::test]
    async fn call_result_is_passed_through() {
        let mut state = 0u32;
        let value = commit_or_rollback(&mut state, |s| *s += 1, async { Ok(41) })
            .await
            .unwrap();
        assert_eq!(value, 41);
        assert_eq!(state, 1);
    }
}
