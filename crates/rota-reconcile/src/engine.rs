use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use rota_casework::{CaseEventType, CaseMutationError, CaseMutator, CaseState, RetryPolicy};
use rota_listings::{
    CancellationReason, HearingStatus, ListingStatus, ListingsApiError, SchedulingApi,
};

use crate::mapper::{map_hearing_outcome, UnmappedCancellationReason};
use crate::venues::{VenueResolutionError, VenueResolver};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One inbound status-change notification after envelope decoding. Consumed
/// by exactly one reconciliation attempt and then discarded; never persisted.
pub struct HearingEvent {
    pub message_id: String,
    pub delivery_count: u32,
    pub hearing_id: String,
    pub case_id: String,
    pub service_code: String,
    pub declared_status: HearingStatus,
    pub listing_status: Option<ListingStatus>,
    pub cancellation_reasons: Vec<CancellationReason>,
    pub venue_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ReconcileReport` used across rota components.
pub struct ReconcileReport {
    pub mutated: bool,
    pub target_state: Option<CaseState>,
    pub case_event_type: Option<CaseEventType>,
}

impl ReconcileReport {
    fn no_op() -> Self {
        Self {
            mutated: false,
            target_state: None,
            case_event_type: None,
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `ReconcileError` values.
pub enum ReconcileError {
    #[error("invalid event: {0}")]
    Validation(String),
    #[error(
        "event declares status {} but the fetched hearing is {}",
        declared.as_str(),
        fetched.as_str()
    )]
    Consistency {
        declared: HearingStatus,
        fetched: HearingStatus,
    },
    #[error(transparent)]
    UnmappedCancellationReason(#[from] UnmappedCancellationReason),
    #[error(transparent)]
    VenueResolution(#[from] VenueResolutionError),
    #[error("ground-truth fetch failed: {0}")]
    Fetch(#[from] ListingsApiError),
    #[error("case mutation failed: {0}")]
    Mutation(#[from] CaseMutationError),
}

#[async_trait]
/// Trait contract for `EventDispatcher` behavior. The seam between the
/// gateway and the engine; stubbed out in gateway runtime tests.
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, event: &HearingEvent) -> Result<ReconcileReport, ReconcileError>;
}

#[derive(Clone)]
/// Orchestrates one reconciliation: validate, fetch ground truth, map, resolve
/// the venue when booking, and apply the mutation under the retry policy.
pub struct ReconcileEngine {
    scheduling: Arc<dyn SchedulingApi>,
    venues: Arc<dyn VenueResolver>,
    mutator: CaseMutator,
    retry: RetryPolicy,
}

impl ReconcileEngine {
    pub fn new(
        scheduling: Arc<dyn SchedulingApi>,
        venues: Arc<dyn VenueResolver>,
        mutator: CaseMutator,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            scheduling,
            venues,
            mutator,
            retry,
        }
    }

    fn validate_event(event: &HearingEvent) -> Result<(), ReconcileError> {
        if event.hearing_id.trim().is_empty() {
            return Err(ReconcileError::Validation("event has empty hearing id".to_string()));
        }
        if event.case_id.trim().is_empty() {
            return Err(ReconcileError::Validation("event has empty case id".to_string()));
        }
        Ok(())
    }

    pub async fn reconcile(&self, event: &HearingEvent) -> Result<ReconcileReport, ReconcileError> {
        Self::validate_event(event)?;

        // Ground truth is re-fetched on every attempt; a stale event must not
        // drive a mutation.
        let record = self.scheduling.get_hearing(&event.hearing_id).await?;
        if record.status != event.declared_status {
            return Err(ReconcileError::Consistency {
                declared: event.declared_status,
                fetched: record.status,
            });
        }
        if record.case_id != event.case_id {
            return Err(ReconcileError::Validation(format!(
                "event case '{}' does not own hearing '{}'",
                event.case_id, event.hearing_id
            )));
        }

        let cancellation_reason = record
            .cancellation_reason
            .as_ref()
            .or_else(|| event.cancellation_reasons.first());
        let outcome =
            map_hearing_outcome(record.status, record.listing_status, cancellation_reason)?;
        if !outcome.handled {
            tracing::debug!(
                hearing_id = %event.hearing_id,
                status = record.status.as_str(),
                "event carries no case-side effect"
            );
            return Ok(ReconcileReport::no_op());
        }

        let venue = if outcome.requires_venue_update {
            let venue_id = record
                .session_venue_id()
                .map(str::to_string)
                .or_else(|| event.venue_id.clone())
                .ok_or_else(|| {
                    ReconcileError::Validation(format!(
                        "hearing '{}' booked without a venue id",
                        event.hearing_id
                    ))
                })?;
            Some(self.venues.resolve(&venue_id)?)
        } else {
            None
        };

        let target_state = outcome.target_state.ok_or_else(|| {
            ReconcileError::Validation("handled outcome is missing a target state".to_string())
        })?;
        let hearing_id = record.hearing_id.clone();
        let hearing_version = record.version;
        let updated = self
            .mutator
            .mutate_with_retry(
                &self.retry,
                &event.case_id,
                &outcome.summary,
                &outcome.description,
                // State assignment is absolute; the hearing entry keeps its
                // recorded venue unless this outcome carries a new one.
                &move |snapshot| {
                    snapshot.state = target_state;
                    snapshot.record_hearing(&hearing_id, hearing_version, venue.clone());
                },
            )
            .await?;

        tracing::info!(
            hearing_id = %event.hearing_id,
            case_id = %event.case_id,
            state = updated.state.as_str(),
            event_type = outcome.case_event_type.map(CaseEventType::as_str).unwrap_or("-"),
            "case reconciled"
        );
        Ok(ReconcileReport {
            mutated: true,
            target_state: Some(target_state),
            case_event_type: outcome.case_event_type,
        })
    }
}

#[async_trait]
impl EventDispatcher for ReconcileEngine {
    async fn dispatch(&self, event: &HearingEvent) -> Result<ReconcileReport, ReconcileError> {
        self.reconcile(event).await
    }
}
