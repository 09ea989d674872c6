//! Pure mapping from scheduling-service hearing state to a target case state
//! and case event type. No I/O; total over the combinations it recognizes,
//! with unrecognized combinations yielding an explicit not-handled outcome.

use thiserror::Error;

use rota_casework::{CaseEventType, CaseState};
use rota_listings::{CancellationReason, HearingStatus, ListingStatus};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cancellation reason '{code}' has no case-state mapping")]
/// A cancellation must always resolve to a known case state, so an unknown
/// reason code is an error rather than a silent no-op.
pub struct UnmappedCancellationReason {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ReconciliationOutcome` used across rota components.
pub struct ReconciliationOutcome {
    pub handled: bool,
    pub target_state: Option<CaseState>,
    pub case_event_type: Option<CaseEventType>,
    pub requires_venue_update: bool,
    pub summary: String,
    pub description: String,
}

impl ReconciliationOutcome {
    fn not_handled(detail: &str) -> Self {
        Self {
            handled: false,
            target_state: None,
            case_event_type: None,
            requires_venue_update: false,
            summary: String::new(),
            description: detail.to_string(),
        }
    }
}

/// Case state a recognized cancellation reason resolves to. The table is the
/// single dispatch point for reason handling; reasons absent from it are
/// unmapped by definition.
fn cancellation_target_state(reason: &CancellationReason) -> Option<CaseState> {
    match reason {
        CancellationReason::Withdrawn
        | CancellationReason::StruckOut
        | CancellationReason::LapsedCase => Some(CaseState::Dormant),
        CancellationReason::PartyUnableToAttend
        | CancellationReason::PartyDidNotAttend
        | CancellationReason::IncompleteTribunal
        | CancellationReason::ListedInError => Some(CaseState::ReadyToList),
        CancellationReason::Other(_) => None,
    }
}

/// Maps fetched hearing state to the case-side outcome.
///
/// Precedence, evaluated in order: terminal exception wins unconditionally;
/// a fixed listing on a listed/update-submitted hearing books the case; a
/// listed-family hearing whose listing is not yet fixed waits for a more
/// definite event; a cancellation resolves through the reason table, where an
/// unknown reason is an error. Everything else is a legitimate no-op.
pub fn map_hearing_outcome(
    status: HearingStatus,
    listing_status: Option<ListingStatus>,
    cancellation_reason: Option<&CancellationReason>,
) -> Result<ReconciliationOutcome, UnmappedCancellationReason> {
    if status == HearingStatus::Exception {
        return Ok(ReconciliationOutcome {
            handled: true,
            target_state: Some(CaseState::HandlingError),
            case_event_type: Some(CaseEventType::HearingException),
            requires_venue_update: false,
            summary: "Hearing entered exception handling".to_string(),
            description: "The scheduling service reported a terminal failure for the hearing"
                .to_string(),
        });
    }

    let listed_family = matches!(
        status,
        HearingStatus::Listed | HearingStatus::AwaitingListing | HearingStatus::UpdateSubmitted
    );
    if matches!(status, HearingStatus::Listed | HearingStatus::UpdateSubmitted)
        && listing_status == Some(ListingStatus::Fixed)
    {
        return Ok(ReconciliationOutcome {
            handled: true,
            target_state: Some(CaseState::Hearing),
            case_event_type: Some(CaseEventType::HearingBooked),
            requires_venue_update: true,
            summary: "Hearing booked".to_string(),
            description: "A fixed listing was confirmed by the scheduling service".to_string(),
        });
    }
    if listed_family {
        return Ok(ReconciliationOutcome::not_handled(
            "listing not yet fixed; waiting for a definite listing event",
        ));
    }

    if status == HearingStatus::Cancelled || cancellation_reason.is_some() {
        let reason = cancellation_reason.ok_or_else(|| UnmappedCancellationReason {
            code: "<absent>".to_string(),
        })?;
        let target_state =
            cancellation_target_state(reason).ok_or_else(|| UnmappedCancellationReason {
                code: reason.as_str().to_string(),
            })?;
        return Ok(ReconciliationOutcome {
            handled: true,
            target_state: Some(target_state),
            case_event_type: Some(CaseEventType::HearingCancelled),
            requires_venue_update: false,
            summary: "Hearing cancelled".to_string(),
            description: format!("Cancellation reason {}", reason.as_str()),
        });
    }

    Ok(ReconciliationOutcome::not_handled(
        "hearing status carries no case-side effect",
    ))
}
