//! Scheduling-service client surface and hearing domain types.
//!
//! The scheduling service is the system of record for hearing lifecycle and
//! listing state. Everything here is read-or-submit: hearing snapshots are
//! fetched fresh per use and never cached across events.

mod client;
mod types;

pub use client::{ListingsClient, ListingsClientConfig};
pub use types::{
    CancellationReason, HearingChangeResponse, HearingRecord, HearingRequestPayload,
    HearingStatus, ListingStatus, ListingsApiError, ScheduledSession, SchedulingApi,
};
