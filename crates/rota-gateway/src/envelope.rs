//! Inbound envelope contract and structural validation.
//!
//! Envelopes are validated before any side effect; failures carry a stable
//! reason code so operators can trace malformed ingress without replaying it.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use rota_listings::{CancellationReason, HearingStatus, ListingStatus};
use rota_reconcile::HearingEvent;

pub const HEARING_EVENT_SCHEMA_VERSION: u32 = 1;

fn hearing_event_schema_version() -> u32 {
    HEARING_EVENT_SCHEMA_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `EnvelopeReasonCode` values.
pub enum EnvelopeReasonCode {
    InvalidJson,
    UnsupportedSchemaVersion,
    MissingField,
    UnknownStatus,
    UnknownListingStatus,
}

impl EnvelopeReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::UnsupportedSchemaVersion => "unsupported_schema_version",
            Self::MissingField => "missing_field",
            Self::UnknownStatus => "unknown_status",
            Self::UnknownListingStatus => "unknown_listing_status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `EnvelopeParseError` used across rota components.
pub struct EnvelopeParseError {
    pub code: EnvelopeReasonCode,
    pub message: String,
}

impl Display for EnvelopeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for EnvelopeParseError {}

fn parse_error(code: EnvelopeReasonCode, message: impl Into<String>) -> EnvelopeParseError {
    EnvelopeParseError {
        code,
        message: message.into(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Raw inbound notification as the channel delivers it. String-typed codes
/// are resolved into domain enums only after structural validation.
pub struct HearingEventEnvelope {
    #[serde(default = "hearing_event_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub delivery_count: u32,
    #[serde(default)]
    pub hearing_id: String,
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub service_code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub listing_status: String,
    #[serde(default)]
    pub cancellation_reasons: Vec<String>,
    #[serde(default)]
    pub venue_id: String,
}

pub fn parse_hearing_event_envelope(raw: &str) -> Result<HearingEventEnvelope, EnvelopeParseError> {
    let envelope = serde_json::from_str::<HearingEventEnvelope>(raw)
        .map_err(|error| parse_error(EnvelopeReasonCode::InvalidJson, error.to_string()))?;
    validate_hearing_event_envelope(&envelope)?;
    Ok(envelope)
}

pub fn validate_hearing_event_envelope(
    envelope: &HearingEventEnvelope,
) -> Result<(), EnvelopeParseError> {
    if envelope.schema_version != HEARING_EVENT_SCHEMA_VERSION {
        return Err(parse_error(
            EnvelopeReasonCode::UnsupportedSchemaVersion,
            format!(
                "envelope has unsupported schema_version {} (expected {})",
                envelope.schema_version, HEARING_EVENT_SCHEMA_VERSION
            ),
        ));
    }
    for (field, value) in [
        ("message_id", &envelope.message_id),
        ("hearing_id", &envelope.hearing_id),
        ("case_id", &envelope.case_id),
        ("service_code", &envelope.service_code),
        ("status", &envelope.status),
    ] {
        if value.trim().is_empty() {
            return Err(parse_error(
                EnvelopeReasonCode::MissingField,
                format!("envelope has empty {field}"),
            ));
        }
    }
    if envelope
        .cancellation_reasons
        .iter()
        .any(|reason| reason.trim().is_empty())
    {
        return Err(parse_error(
            EnvelopeReasonCode::MissingField,
            "envelope includes empty cancellation reason code",
        ));
    }
    Ok(())
}

/// Resolves a validated envelope into the engine's event type. The declared
/// status must be a code this subsystem recognizes; cancellation reason codes
/// pass through verbatim so the mapper owns their rejection.
pub fn envelope_to_event(
    envelope: &HearingEventEnvelope,
    delivery_count: u32,
) -> Result<HearingEvent, EnvelopeParseError> {
    let declared_status = HearingStatus::parse(&envelope.status).ok_or_else(|| {
        parse_error(
            EnvelopeReasonCode::UnknownStatus,
            format!("envelope declares unknown status '{}'", envelope.status),
        )
    })?;
    let listing_status = if envelope.listing_status.trim().is_empty() {
        None
    } else {
        Some(ListingStatus::parse(&envelope.listing_status).ok_or_else(|| {
            parse_error(
                EnvelopeReasonCode::UnknownListingStatus,
                format!(
                    "envelope declares unknown listing status '{}'",
                    envelope.listing_status
                ),
            )
        })?)
    };
    let venue_id = envelope.venue_id.trim();

    Ok(HearingEvent {
        message_id: envelope.message_id.trim().to_string(),
        delivery_count,
        hearing_id: envelope.hearing_id.trim().to_string(),
        case_id: envelope.case_id.trim().to_string(),
        service_code: envelope.service_code.trim().to_string(),
        declared_status,
        listing_status,
        cancellation_reasons: envelope
            .cancellation_reasons
            .iter()
            .map(|reason| CancellationReason::from(reason.clone()))
            .collect(),
        venue_id: if venue_id.is_empty() {
            None
        } else {
            Some(venue_id.to_string())
        },
    })
}
