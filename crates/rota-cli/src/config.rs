//! TOML configuration for the rota runtime. Topic/ingress paths, retry
//! bounds, service endpoints, and the venue directory all arrive from here;
//! nothing in the library crates reads configuration on its own.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use rota_casework::{CaseVenue, RetryPolicy};
use rota_reconcile::{StaticVenueDirectory, VenueDirectoryEntry};

#[derive(Debug, Clone, Deserialize)]
/// Public struct `ServiceEndpointConfig` used across rota components.
pub struct ServiceEndpointConfig {
    pub api_base: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
/// Public struct `GatewaySectionConfig` used across rota components.
pub struct GatewaySectionConfig {
    pub ingress_path: PathBuf,
    pub state_path: PathBuf,
    pub outcomes_path: PathBuf,
    pub dead_letter_path: PathBuf,
    pub service_code: String,
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_max_deliveries() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Public struct `RetrySectionConfig` used across rota components.
pub struct RetrySectionConfig {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
    pub jitter: bool,
}

impl Default for RetrySectionConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_backoff_ms: policy.base_backoff_ms,
            jitter: policy.jitter,
        }
    }
}

impl RetrySectionConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_backoff_ms: self.base_backoff_ms,
            jitter: self.jitter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// Public struct `VenueEntryConfig` used across rota components.
pub struct VenueEntryConfig {
    pub venue_id: String,
    pub region_code: String,
    pub name: String,
    #[serde(default = "default_venue_active")]
    pub active: bool,
}

fn default_venue_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
/// Public struct `RotaConfig` used across rota components.
pub struct RotaConfig {
    pub listings: ServiceEndpointConfig,
    pub casework: ServiceEndpointConfig,
    pub gateway: GatewaySectionConfig,
    #[serde(default)]
    pub retry: RetrySectionConfig,
    #[serde(default)]
    pub venues: Vec<VenueEntryConfig>,
}

impl RotaConfig {
    pub fn venue_directory(&self) -> StaticVenueDirectory {
        StaticVenueDirectory::from_entries(self.venues.iter().map(|entry| VenueDirectoryEntry {
            venue: CaseVenue {
                venue_id: entry.venue_id.clone(),
                region_code: entry.region_code.clone(),
                name: entry.name.clone(),
            },
            active: entry.active,
        }))
    }
}

pub fn load_config(path: &Path) -> Result<RotaConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: RotaConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RotaConfig) -> Result<()> {
    if config.listings.api_base.trim().is_empty() {
        bail!("config has empty listings.api_base");
    }
    if config.casework.api_base.trim().is_empty() {
        bail!("config has empty casework.api_base");
    }
    if config.gateway.service_code.trim().is_empty() {
        bail!("config has empty gateway.service_code");
    }
    if config.retry.max_attempts == 0 {
        bail!("config retry.max_attempts must be at least 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[listings]
api_base = "https://listings.example/api"
auth_token = "secret"

[casework]
api_base = "https://cases.example/api"

[gateway]
ingress_path = "state/ingress/hearings.ndjson"
state_path = "state/gateway-state.json"
outcomes_path = "state/outcomes.jsonl"
dead_letter_path = "state/dead-letter.ndjson"
service_code = "BBA3"

[[venues]]
venue_id = "venue-1"
region_code = "north"
name = "North Tribunal Centre"

[[venues]]
venue_id = "venue-2"
region_code = "south"
name = "South Tribunal Centre"
active = false
"#;

    #[test]
    fn sample_config_parses_with_defaults() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("rota.toml");
        std::fs::write(&path, SAMPLE).expect("write config");

        let config = load_config(&path).expect("config should load");
        assert_eq!(config.gateway.max_deliveries, 5);
        assert_eq!(config.gateway.poll_interval_ms, 2_000);
        assert_eq!(config.casework.request_timeout_ms, 10_000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.venue_directory().len(), 2);
    }

    #[test]
    fn empty_service_code_is_rejected() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("rota.toml");
        std::fs::write(&path, SAMPLE.replace("BBA3", " ")).expect("write config");

        let error = load_config(&path).expect_err("blank scope must fail");
        assert!(error.to_string().contains("service_code"));
    }
}
