//! Case-management-originated hearing lifecycle actions.
//!
//! Create, amend, and cancel flow from the case side out to the scheduling
//! service. The create path re-queries in-flight hearings immediately before
//! issuing the downstream call so a case never accumulates duplicate hearing
//! requests; the window between that read and the create call is a known,
//! accepted race. Cancellation is fire-and-forget: the service's response is
//! not reconciled back into the case record.

use std::sync::Arc;

use thiserror::Error;

use rota_casework::{CaseMutationError, CaseMutator};
use rota_listings::{
    CancellationReason, HearingRecord, HearingRequestPayload, ListingStatus, ListingsApiError,
    SchedulingApi,
};

#[cfg(test)]
mod tests;

/// Listing slots are allocated in five-minute increments; payload durations
/// must land on that grid.
pub const LISTING_DURATION_GRANULARITY_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `HearingLifecycleState` values.
pub enum HearingLifecycleState {
    NoHearing,
    InFlight,
    Booked,
    Cancelled,
}

impl HearingLifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoHearing => "no_hearing",
            Self::InFlight => "in_flight",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Collapses the scheduling service's view of a case into a lifecycle state.
pub fn derive_lifecycle_state(hearings: &[HearingRecord]) -> HearingLifecycleState {
    let mut saw_cancelled = false;
    let mut saw_in_flight = false;
    for hearing in hearings {
        if hearing.status.is_in_flight() {
            if hearing.listing_status == Some(ListingStatus::Fixed) {
                return HearingLifecycleState::Booked;
            }
            saw_in_flight = true;
        } else {
            saw_cancelled = true;
        }
    }
    if saw_in_flight {
        HearingLifecycleState::InFlight
    } else if saw_cancelled {
        HearingLifecycleState::Cancelled
    } else {
        HearingLifecycleState::NoHearing
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `LifecycleError` values.
pub enum LifecycleError {
    #[error("listing validation failed: {0}")]
    Listing(String),
    #[error("scheduling service call failed: {0}")]
    Scheduling(#[from] ListingsApiError),
    #[error("case update failed: {0}")]
    Case(#[from] CaseMutationError),
}

/// Structural payload rules checked before any downstream call. A violation
/// is fatal for the action and never retried.
pub fn validate_hearing_request_payload(
    payload: &HearingRequestPayload,
) -> Result<(), LifecycleError> {
    if payload.case_id.trim().is_empty() {
        return Err(LifecycleError::Listing("payload has empty case id".to_string()));
    }
    if payload.venue_id.trim().is_empty() {
        return Err(LifecycleError::Listing("payload has empty venue id".to_string()));
    }
    if payload.duration_minutes == 0
        || payload.duration_minutes % LISTING_DURATION_GRANULARITY_MINUTES != 0
    {
        return Err(LifecycleError::Listing(format!(
            "duration {} minutes is not a positive multiple of {}",
            payload.duration_minutes, LISTING_DURATION_GRANULARITY_MINUTES
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `LifecycleAction` values.
pub enum LifecycleAction {
    Create,
    Update,
    Cancel,
}

impl LifecycleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `LifecycleActionReport` used across rota components.
pub struct LifecycleActionReport {
    pub action: LifecycleAction,
    pub hearing_id: String,
    pub version: u64,
    pub reused_in_flight: bool,
}

#[derive(Clone)]
/// Public struct `HearingLifecycleController` used across rota components.
pub struct HearingLifecycleController {
    scheduling: Arc<dyn SchedulingApi>,
    mutator: CaseMutator,
}

impl HearingLifecycleController {
    pub fn new(scheduling: Arc<dyn SchedulingApi>, mutator: CaseMutator) -> Self {
        Self { scheduling, mutator }
    }

    /// Requests a hearing for the case unless one is already in flight, in
    /// which case the existing id/version is recorded with no downstream
    /// call. The in-flight check is a fresh list immediately before create.
    pub async fn request_hearing(
        &self,
        case_id: &str,
        payload: &HearingRequestPayload,
    ) -> Result<LifecycleActionReport, LifecycleError> {
        validate_hearing_request_payload(payload)?;

        let hearings = self.scheduling.list_hearings(case_id).await?;
        if let Some(existing) = hearings.iter().find(|hearing| hearing.status.is_in_flight()) {
            tracing::info!(
                case_id,
                hearing_id = %existing.hearing_id,
                "in-flight hearing found; suppressing duplicate create"
            );
            let hearing_id = existing.hearing_id.clone();
            let version = existing.version;
            self.record_hearing_reference(
                case_id,
                &hearing_id,
                version,
                "Hearing request matched in-flight hearing",
                "An in-flight hearing already covers this case; no new request was issued",
            )
            .await?;
            return Ok(LifecycleActionReport {
                action: LifecycleAction::Create,
                hearing_id,
                version,
                reused_in_flight: true,
            });
        }

        let response = self.scheduling.create_hearing(payload).await?;
        self.record_hearing_reference(
            case_id,
            &response.hearing_id,
            response.version,
            "Hearing requested",
            "A hearing request was submitted to the scheduling service",
        )
        .await?;
        Ok(LifecycleActionReport {
            action: LifecycleAction::Create,
            hearing_id: response.hearing_id,
            version: response.version,
            reused_in_flight: false,
        })
    }

    /// Re-validates the payload, submits the full amended payload, and
    /// records the response.
    pub async fn amend_hearing(
        &self,
        case_id: &str,
        hearing_id: &str,
        payload: &HearingRequestPayload,
    ) -> Result<LifecycleActionReport, LifecycleError> {
        validate_hearing_request_payload(payload)?;

        let response = self.scheduling.update_hearing(hearing_id, payload).await?;
        self.record_hearing_reference(
            case_id,
            &response.hearing_id,
            response.version,
            "Hearing updated",
            "An amended hearing payload was submitted to the scheduling service",
        )
        .await?;
        Ok(LifecycleActionReport {
            action: LifecycleAction::Update,
            hearing_id: response.hearing_id,
            version: response.version,
            reused_in_flight: false,
        })
    }

    /// Submits a cancellation. The response is intentionally not written back
    /// into the case record; the case catches up when the cancellation event
    /// arrives on the inbound channel.
    pub async fn cancel_hearing(
        &self,
        case_id: &str,
        hearing_id: &str,
        reason: &CancellationReason,
    ) -> Result<LifecycleActionReport, LifecycleError> {
        let response = self.scheduling.cancel_hearing(hearing_id, reason).await?;
        tracing::info!(
            case_id,
            hearing_id,
            reason = reason.as_str(),
            "hearing cancellation submitted"
        );
        Ok(LifecycleActionReport {
            action: LifecycleAction::Cancel,
            hearing_id: response.hearing_id,
            version: response.version,
            reused_in_flight: false,
        })
    }

    /// Records a hearing id/version on the case and clears any pending
    /// adjournment marker inside the same transaction.
    async fn record_hearing_reference(
        &self,
        case_id: &str,
        hearing_id: &str,
        version: u64,
        summary: &str,
        description: &str,
    ) -> Result<(), LifecycleError> {
        let hearing_id = hearing_id.to_string();
        self.mutator
            .mutate(case_id, summary, description, &move |snapshot| {
                snapshot.record_hearing(&hearing_id, version, None);
                snapshot.adjournment_in_progress = false;
            })
            .await?;
        Ok(())
    }
}
