use std::collections::BTreeMap;

use thiserror::Error;

use rota_casework::CaseVenue;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("venue '{venue_id}' did not resolve to an active venue")]
/// Public struct `VenueResolutionError` used across rota components.
pub struct VenueResolutionError {
    pub venue_id: String,
}

/// Trait contract for `VenueResolver` behavior. Pure query: resolution has no
/// side effects and is only consulted on the booking branch.
pub trait VenueResolver: Send + Sync {
    fn resolve(&self, venue_id: &str) -> Result<CaseVenue, VenueResolutionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `VenueDirectoryEntry` used across rota components.
pub struct VenueDirectoryEntry {
    pub venue: CaseVenue,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
/// Reference-data backed resolver. The directory is built once at composition
/// time; inactive venues are present but never resolve.
pub struct StaticVenueDirectory {
    entries: BTreeMap<String, VenueDirectoryEntry>,
}

impl StaticVenueDirectory {
    pub fn from_entries(entries: impl IntoIterator<Item = VenueDirectoryEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.venue.venue_id.clone(), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VenueResolver for StaticVenueDirectory {
    fn resolve(&self, venue_id: &str) -> Result<CaseVenue, VenueResolutionError> {
        self.entries
            .get(venue_id.trim())
            .filter(|entry| entry.active)
            .map(|entry| entry.venue.clone())
            .ok_or_else(|| VenueResolutionError {
                venue_id: venue_id.trim().to_string(),
            })
    }
}
