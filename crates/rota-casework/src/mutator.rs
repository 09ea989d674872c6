use std::sync::Arc;

use thiserror::Error;

use crate::retry::{run_with_retry, RetryPolicy};
use crate::types::{CaseApi, CaseApiError, CaseSnapshot};

#[derive(Debug, Error)]
/// Enumerates supported `CaseMutationError` values.
pub enum CaseMutationError {
    #[error("case '{case_id}' mutation lost the optimistic-concurrency race")]
    VersionConflict { case_id: String },
    #[error("case store error: {0}")]
    Store(#[from] CaseApiError),
}

impl CaseMutationError {
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

#[derive(Clone)]
/// Applies one mutation to one case under the store's optimistic-concurrency
/// protocol. Each attempt acquires a fresh token and snapshot, mutates a
/// working copy, and commits with the token from the same transaction; a
/// token never outlives its transaction.
pub struct CaseMutator {
    api: Arc<dyn CaseApi>,
}

impl CaseMutator {
    pub fn new(api: Arc<dyn CaseApi>) -> Self {
        Self { api }
    }

    /// One transaction: start, apply `mutation` to the working copy, commit.
    /// A stale-token rejection surfaces as
    /// [`CaseMutationError::VersionConflict`] so callers can retry.
    pub async fn mutate(
        &self,
        case_id: &str,
        summary: &str,
        description: &str,
        mutation: &(dyn Fn(&mut CaseSnapshot) + Send + Sync),
    ) -> Result<CaseSnapshot, CaseMutationError> {
        let transaction = self.api.start_transaction(case_id).await?;
        let mut working_copy = transaction.snapshot;
        mutation(&mut working_copy);
        match self
            .api
            .commit(&transaction.token, &working_copy, summary, description)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(CaseApiError::VersionConflict { case_id }) => {
                Err(CaseMutationError::VersionConflict { case_id })
            }
            Err(other) => Err(CaseMutationError::Store(other)),
        }
    }

    /// [`CaseMutator::mutate`] wrapped in the retry policy. Only version
    /// conflicts are retried in-process; transient store failures surface to
    /// the caller so channel redelivery can take over. Exhausted conflicts
    /// are logged and returned, never dropped.
    pub async fn mutate_with_retry(
        &self,
        policy: &RetryPolicy,
        case_id: &str,
        summary: &str,
        description: &str,
        mutation: &(dyn Fn(&mut CaseSnapshot) + Send + Sync),
    ) -> Result<CaseSnapshot, CaseMutationError> {
        run_with_retry(
            policy,
            |attempt| {
                if attempt > 0 {
                    tracing::debug!(case_id, attempt, "retrying case mutation after conflict");
                }
                self.mutate(case_id, summary, description, mutation)
            },
            CaseMutationError::is_version_conflict,
            |error| {
                tracing::warn!(
                    case_id,
                    max_attempts = policy.max_attempts,
                    %error,
                    "case mutation retries exhausted"
                );
            },
        )
        .await
    }
}
