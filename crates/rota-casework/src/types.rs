use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `CaseState` values.
pub enum CaseState {
    ReadyToList,
    Hearing,
    Dormant,
    HandlingError,
}

impl CaseState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadyToList => "ready_to_list",
            Self::Hearing => "hearing",
            Self::Dormant => "dormant",
            Self::HandlingError => "handling_error",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates supported `CaseEventType` values.
pub enum CaseEventType {
    HearingBooked,
    HearingCancelled,
    HearingException,
}

impl CaseEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HearingBooked => "HEARING_BOOKED",
            Self::HearingCancelled => "HEARING_CANCELLED",
            Self::HearingException => "HEARING_EXCEPTION",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// The case's own representation of a hearing venue.
pub struct CaseVenue {
    pub venue_id: String,
    pub region_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Per-hearing details recorded on the case.
pub struct CaseHearingDetails {
    pub hearing_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<CaseVenue>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Transient working copy of one case, valid only inside a single mutation
/// transaction. State assignment is absolute, so re-applying the same
/// mutation leaves an identical snapshot.
pub struct CaseSnapshot {
    pub case_id: String,
    pub state: CaseState,
    #[serde(default)]
    pub hearings: Vec<CaseHearingDetails>,
    #[serde(default)]
    pub adjournment_in_progress: bool,
}

impl CaseSnapshot {
    /// Records a hearing's version, and its venue when one is supplied; a
    /// previously recorded venue is never discarded by a venue-less update.
    pub fn record_hearing(&mut self, hearing_id: &str, version: u64, venue: Option<CaseVenue>) {
        match self
            .hearings
            .iter_mut()
            .find(|details| details.hearing_id == hearing_id)
        {
            Some(details) => {
                details.version = version;
                if venue.is_some() {
                    details.venue = venue;
                }
            }
            None => self.hearings.push(CaseHearingDetails {
                hearing_id: hearing_id.to_string(),
                venue,
                version,
            }),
        }
    }

    pub fn hearing(&self, hearing_id: &str) -> Option<&CaseHearingDetails> {
        self.hearings
            .iter()
            .find(|details| details.hearing_id == hearing_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A write token plus the case snapshot it was issued against. The token is
/// only valid for the commit of the transaction that produced it.
pub struct CaseTransaction {
    pub token: String,
    pub snapshot: CaseSnapshot,
}

#[derive(Debug, Error)]
/// Enumerates supported `CaseApiError` values.
pub enum CaseApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("case store returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("case '{case_id}' was modified by a concurrent writer")]
    VersionConflict { case_id: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CaseApiError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(error) => {
                error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
            }
            Self::HttpStatus { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::VersionConflict { .. } | Self::Serde(_) | Self::InvalidResponse(_) => false,
        }
    }
}

#[async_trait]
/// Trait contract for `CaseApi` behavior.
pub trait CaseApi: Send + Sync {
    /// Opens a mutation transaction: fetches the current case snapshot and a
    /// fresh write token bound to it.
    async fn start_transaction(&self, case_id: &str) -> Result<CaseTransaction, CaseApiError>;

    /// Commits a mutated snapshot under the transaction's token. The store
    /// rejects stale tokens with [`CaseApiError::VersionConflict`].
    async fn commit(
        &self,
        token: &str,
        snapshot: &CaseSnapshot,
        summary: &str,
        description: &str,
    ) -> Result<CaseSnapshot, CaseApiError>;
}
