//! Reconciliation of scheduling-service hearing state into the case record.
//!
//! One inbound event flows validate → fetch ground truth → map → resolve
//! venue → mutate. The fetched hearing record is authoritative for every
//! decision; the event's own declared status is only used to detect that the
//! event is stale relative to a newer fetch. State assignment is absolute, so
//! replaying a duplicate event is safe by construction.

mod engine;
mod mapper;
mod venues;


pub use engine::{
    EventDispatcher, HearingEvent, ReconcileEngine, ReconcileError, ReconcileReport,
};
pub use mapper::{map_hearing_outcome, ReconciliationOutcome, UnmappedCancellationReason};
pub use venues::{StaticVenueDirectory, VenueDirectoryEntry, VenueResolutionError, VenueResolver};
