//! Case-store client, idempotent mutation protocol, and retry policy.
//!
//! The case store owns case lifecycle state and guards every write with an
//! optimistic-concurrency token. This crate wraps that protocol: start a
//! transaction, mutate an in-memory snapshot, commit with the token obtained
//! in the same transaction, and surface version conflicts distinctly so
//! callers can retry with bounded backoff.

mod client;
mod mutator;
pub mod retry;
mod types;


pub use client::{CaseworkClient, CaseworkClientConfig};
pub use mutator::{CaseMutationError, CaseMutator};
pub use retry::{run_with_retry, RetryPolicy};
pub use types::{
    CaseApi, CaseApiError, CaseEventType, CaseHearingDetails, CaseSnapshot, CaseState,
    CaseTransaction, CaseVenue,
};
