//! Outcome classification: every dispatch result maps onto the channel's
//! ack / negative-ack / dead-letter model with a stable reason code.

use rota_casework::CaseMutationError;
use rota_reconcile::{ReconcileError, ReconcileReport};

pub const REASON_RECONCILED: &str = "reconciled";
pub const REASON_NOT_HANDLED: &str = "not_handled";
pub const REASON_MALFORMED_ENVELOPE: &str = "malformed_envelope";
pub const REASON_INVALID_EVENT: &str = "invalid_event";
pub const REASON_SCOPE_MISMATCH: &str = "scope_mismatch";
pub const REASON_STATUS_INCONSISTENT: &str = "status_inconsistent";
pub const REASON_FETCH_FAILED: &str = "fetch_failed";
pub const REASON_VERSION_CONFLICT_EXHAUSTED: &str = "version_conflict_exhausted";
pub const REASON_CASE_STORE_UNAVAILABLE: &str = "case_store_unavailable";
pub const REASON_VENUE_UNRESOLVED: &str = "venue_unresolved";
pub const REASON_UNMAPPED_CANCELLATION_REASON: &str = "unmapped_cancellation_reason";
pub const REASON_REDELIVERY_EXHAUSTED: &str = "redelivery_exhausted";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `GatewayDisposition` values.
pub enum GatewayDisposition {
    /// Processed, including legitimate no-ops; the channel must not redeliver.
    Ack { reason_code: &'static str },
    /// Transient failure; the channel should redeliver within budget.
    Nack { reason_code: &'static str },
    /// Unrecoverable for this subsystem; park the message for operators.
    DeadLetter {
        reason_code: &'static str,
        detail: String,
    },
}

impl GatewayDisposition {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Ack { reason_code }
            | Self::Nack { reason_code }
            | Self::DeadLetter { reason_code, .. } => reason_code,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Ack { .. } => "ack",
            Self::Nack { .. } => "nack",
            Self::DeadLetter { .. } => "dead_letter",
        }
    }
}

/// Maps the engine's result onto a channel disposition.
///
/// Recoverable local conditions were already absorbed before this point (a
/// not-handled mapping returns success with zero mutations; in-budget version
/// conflicts are retried inside the mutator), so everything arriving here as
/// an error is either transient (nack) or terminal (dead-letter).
pub fn classify_dispatch_result(
    result: &Result<ReconcileReport, ReconcileError>,
) -> GatewayDisposition {
    match result {
        Ok(report) if report.mutated => GatewayDisposition::Ack {
            reason_code: REASON_RECONCILED,
        },
        Ok(_) => GatewayDisposition::Ack {
            reason_code: REASON_NOT_HANDLED,
        },
        Err(ReconcileError::Validation(detail)) => GatewayDisposition::DeadLetter {
            reason_code: REASON_INVALID_EVENT,
            detail: detail.clone(),
        },
        // Transient fetch lag is plausible; let the channel redeliver.
        Err(ReconcileError::Consistency { .. }) => GatewayDisposition::Nack {
            reason_code: REASON_STATUS_INCONSISTENT,
        },
        Err(ReconcileError::UnmappedCancellationReason(inner)) => GatewayDisposition::DeadLetter {
            reason_code: REASON_UNMAPPED_CANCELLATION_REASON,
            detail: inner.to_string(),
        },
        Err(ReconcileError::VenueResolution(inner)) => GatewayDisposition::DeadLetter {
            reason_code: REASON_VENUE_UNRESOLVED,
            detail: inner.to_string(),
        },
        Err(ReconcileError::Fetch(_)) => GatewayDisposition::Nack {
            reason_code: REASON_FETCH_FAILED,
        },
        Err(ReconcileError::Mutation(inner)) => match inner {
            CaseMutationError::VersionConflict { case_id } => GatewayDisposition::DeadLetter {
                reason_code: REASON_VERSION_CONFLICT_EXHAUSTED,
                detail: format!("case '{case_id}' stayed contended past the retry budget"),
            },
            CaseMutationError::Store(_) => GatewayDisposition::Nack {
                reason_code: REASON_CASE_STORE_UNAVAILABLE,
            },
        },
    }
}
