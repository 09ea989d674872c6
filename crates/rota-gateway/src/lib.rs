//! Inbound edge of the reconciliation subsystem.
//!
//! Raw envelopes arrive from the delivery channel with at-least-once
//! semantics and no cross-hearing ordering. The gateway deserializes and
//! validates them, dispatches to the reconciliation engine, and classifies
//! every outcome into ack, negative-ack, or dead-letter with a stable reason
//! code. Delivery accounting lives in a versioned state document so an acked
//! message id is never dispatched twice, even across restarts.

mod dispatch;
mod envelope;
mod inspect;
mod runtime;


pub use dispatch::{
    classify_dispatch_result, GatewayDisposition, REASON_CASE_STORE_UNAVAILABLE,
    REASON_FETCH_FAILED, REASON_INVALID_EVENT, REASON_MALFORMED_ENVELOPE, REASON_NOT_HANDLED,
    REASON_RECONCILED, REASON_REDELIVERY_EXHAUSTED, REASON_SCOPE_MISMATCH,
    REASON_STATUS_INCONSISTENT, REASON_UNMAPPED_CANCELLATION_REASON, REASON_VENUE_UNRESOLVED,
    REASON_VERSION_CONFLICT_EXHAUSTED,
};
pub use envelope::{
    envelope_to_event, parse_hearing_event_envelope, validate_hearing_event_envelope,
    EnvelopeParseError, EnvelopeReasonCode, HearingEventEnvelope, HEARING_EVENT_SCHEMA_VERSION,
};
pub use inspect::{
    inspect_gateway, render_gateway_inspect_report, GatewayInspectConfig, GatewayInspectReport,
};
pub use runtime::{GatewayDrainReport, GatewayRuntime, GatewayRuntimeConfig};
