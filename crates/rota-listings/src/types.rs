use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates supported `HearingStatus` values.
pub enum HearingStatus {
    HearingRequested,
    AwaitingListing,
    Listed,
    UpdateRequested,
    UpdateSubmitted,
    Exception,
    Cancelled,
    Closed,
}

impl HearingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HearingRequested => "HEARING_REQUESTED",
            Self::AwaitingListing => "AWAITING_LISTING",
            Self::Listed => "LISTED",
            Self::UpdateRequested => "UPDATE_REQUESTED",
            Self::UpdateSubmitted => "UPDATE_SUBMITTED",
            Self::Exception => "EXCEPTION",
            Self::Cancelled => "CANCELLED",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HEARING_REQUESTED" => Some(Self::HearingRequested),
            "AWAITING_LISTING" => Some(Self::AwaitingListing),
            "LISTED" => Some(Self::Listed),
            "UPDATE_REQUESTED" => Some(Self::UpdateRequested),
            "UPDATE_SUBMITTED" => Some(Self::UpdateSubmitted),
            "EXCEPTION" => Some(Self::Exception),
            "CANCELLED" => Some(Self::Cancelled),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// A hearing still progressing through the scheduling service. Cancelled,
    /// closed, and exception hearings must not suppress a fresh create.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Closed | Self::Exception)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates supported `ListingStatus` values.
pub enum ListingStatus {
    Draft,
    Provisional,
    Fixed,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Provisional => "PROVISIONAL",
            Self::Fixed => "FIXED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "PROVISIONAL" => Some(Self::Provisional),
            "FIXED" => Some(Self::Fixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
/// Cancellation reason codes reported by the scheduling service. Codes this
/// subsystem does not recognize are preserved verbatim so the mapper can
/// reject them with a specific error instead of a deserialization failure.
pub enum CancellationReason {
    Withdrawn,
    StruckOut,
    LapsedCase,
    PartyUnableToAttend,
    PartyDidNotAttend,
    IncompleteTribunal,
    ListedInError,
    Other(String),
}

impl CancellationReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Withdrawn => "WITHDRAWN",
            Self::StruckOut => "STRUCK_OUT",
            Self::LapsedCase => "LAPSED_CASE",
            Self::PartyUnableToAttend => "PARTY_UNABLE_TO_ATTEND",
            Self::PartyDidNotAttend => "PARTY_DID_NOT_ATTEND",
            Self::IncompleteTribunal => "INCOMPLETE_TRIBUNAL",
            Self::ListedInError => "LISTED_IN_ERROR",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for CancellationReason {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WITHDRAWN" => Self::Withdrawn,
            "STRUCK_OUT" => Self::StruckOut,
            "LAPSED_CASE" => Self::LapsedCase,
            "PARTY_UNABLE_TO_ATTEND" => Self::PartyUnableToAttend,
            "PARTY_DID_NOT_ATTEND" => Self::PartyDidNotAttend,
            "INCOMPLETE_TRIBUNAL" => Self::IncompleteTribunal,
            "LISTED_IN_ERROR" => Self::ListedInError,
            _ => Self::Other(raw.trim().to_ascii_uppercase()),
        }
    }
}

impl From<CancellationReason> for String {
    fn from(reason: CancellationReason) -> Self {
        reason.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `ScheduledSession` used across rota components.
pub struct ScheduledSession {
    pub venue_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// One hearing as the scheduling service reports it. The `version` field is
/// the service's own sequence number and is non-decreasing across successive
/// fetches of the same hearing id.
pub struct HearingRecord {
    pub hearing_id: String,
    pub case_id: String,
    pub status: HearingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_status: Option<ListingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<CancellationReason>,
    #[serde(default)]
    pub sessions: Vec<ScheduledSession>,
    pub version: u64,
}

impl HearingRecord {
    /// Venue of the next scheduled session, when one is known.
    pub fn session_venue_id(&self) -> Option<&str> {
        self.sessions
            .first()
            .map(|session| session.venue_id.as_str())
            .filter(|venue_id| !venue_id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Snapshot submitted when requesting or amending a hearing. Deriving these
/// fields from case attributes happens upstream; the payload arrives built.
pub struct HearingRequestPayload {
    pub case_id: String,
    pub duration_minutes: u32,
    pub venue_id: String,
    pub earliest_start: NaiveDate,
    #[serde(default)]
    pub auto_list: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `HearingChangeResponse` used across rota components.
pub struct HearingChangeResponse {
    pub hearing_id: String,
    pub version: u64,
    pub status: HearingStatus,
}

#[derive(Debug, Error)]
/// Enumerates supported `ListingsApiError` values.
pub enum ListingsApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("scheduling service returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("hearing '{hearing_id}' not found")]
    NotFound { hearing_id: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ListingsApiError {
    /// Transient failures that are safe to surface as a negative-ack so the
    /// channel redelivers the triggering event.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(error) => {
                error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
            }
            Self::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            Self::NotFound { .. } | Self::Serde(_) | Self::InvalidResponse(_) => false,
        }
    }
}

#[async_trait]
/// Trait contract for `SchedulingApi` behavior.
pub trait SchedulingApi: Send + Sync {
    async fn get_hearing(&self, hearing_id: &str) -> Result<HearingRecord, ListingsApiError>;

    async fn list_hearings(&self, case_id: &str) -> Result<Vec<HearingRecord>, ListingsApiError>;

    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError>;

    async fn update_hearing(
        &self,
        hearing_id: &str,
        payload: &HearingRequestPayload,
    ) -> Result<HearingChangeResponse, ListingsApiError>;

    async fn cancel_hearing(
        &self,
        hearing_id: &str,
        reason: &CancellationReason,
    ) -> Result<HearingChangeResponse, ListingsApiError>;
}
