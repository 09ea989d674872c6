//! Poll-based ingress runtime over an append-only NDJSON envelope file.
//!
//! The channel itself is a black box; this runtime consumes its local
//! delivery surface. Acked message ids are recorded in a versioned state
//! document so redelivered duplicates are acked without re-dispatch, nacked
//! messages accumulate a delivery count until the redelivery budget runs out,
//! and every outcome is appended to a JSONL log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use rota_core::{
    append_jsonl_line, current_unix_timestamp_ms, format_unix_ms_rfc3339, write_text_atomic,
};
use rota_reconcile::EventDispatcher;

use crate::dispatch::{
    classify_dispatch_result, GatewayDisposition, REASON_INVALID_EVENT, REASON_MALFORMED_ENVELOPE,
    REASON_REDELIVERY_EXHAUSTED, REASON_SCOPE_MISMATCH,
};
use crate::envelope::{envelope_to_event, parse_hearing_event_envelope};

pub const GATEWAY_STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone)]
/// Public struct `GatewayRuntimeConfig` used across rota components.
pub struct GatewayRuntimeConfig {
    pub ingress_path: PathBuf,
    pub state_path: PathBuf,
    pub outcomes_path: PathBuf,
    pub dead_letter_path: PathBuf,
    pub service_code: String,
    pub max_deliveries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GatewayRuntimeState {
    pub(crate) schema_version: u32,
    #[serde(default)]
    pub(crate) delivery_counts: BTreeMap<String, u32>,
    #[serde(default)]
    pub(crate) processed_message_ids: BTreeSet<String>,
    #[serde(default)]
    pub(crate) dead_lettered_message_ids: BTreeSet<String>,
    #[serde(default)]
    pub(crate) malformed_envelope_digests: BTreeSet<String>,
}

impl Default for GatewayRuntimeState {
    fn default() -> Self {
        Self {
            schema_version: GATEWAY_STATE_SCHEMA_VERSION,
            delivery_counts: BTreeMap::new(),
            processed_message_ids: BTreeSet::new(),
            dead_lettered_message_ids: BTreeSet::new(),
            malformed_envelope_digests: BTreeSet::new(),
        }
    }
}

/// Stable digest of a raw envelope line, used to park unparseable lines
/// exactly once even though they carry no usable message id.
fn envelope_digest(line: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(line.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(crate) fn load_gateway_state(path: &std::path::Path) -> Result<GatewayRuntimeState> {
    if !path.exists() {
        return Ok(GatewayRuntimeState::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gateway state {}", path.display()))?;
    let state: GatewayRuntimeState = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse gateway state {}", path.display()))?;
    anyhow::ensure!(
        state.schema_version == GATEWAY_STATE_SCHEMA_VERSION,
        "gateway state {} has unsupported schema_version {}",
        path.display(),
        state.schema_version
    );
    Ok(state)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Counters for one drain pass over the ingress file.
pub struct GatewayDrainReport {
    pub discovered: usize,
    pub acked: usize,
    pub nacked: usize,
    pub dead_lettered: usize,
    pub duplicates: usize,
}

/// Public struct `GatewayRuntime` used across rota components.
pub struct GatewayRuntime {
    config: GatewayRuntimeConfig,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl GatewayRuntime {
    pub fn new(config: GatewayRuntimeConfig, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Processes every envelope currently in the ingress file once. Nacked
    /// messages are left pending and picked up again by the next drain.
    pub async fn drain_once(&self) -> Result<GatewayDrainReport> {
        let mut report = GatewayDrainReport::default();
        let raw_ingress = match std::fs::read_to_string(&self.config.ingress_path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(error) => {
                return Err(error).with_context(|| {
                    format!(
                        "failed to read ingress file {}",
                        self.config.ingress_path.display()
                    )
                })
            }
        };

        let mut state = load_gateway_state(&self.config.state_path)?;
        for line in raw_ingress.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            report.discovered += 1;
            self.process_line(line, &mut state, &mut report).await?;
        }

        let encoded =
            serde_json::to_string_pretty(&state).context("failed to encode gateway state")?;
        write_text_atomic(&self.config.state_path, &encoded)?;
        Ok(report)
    }

    /// Drains on a fixed interval until the task is dropped or aborted.
    pub async fn run(&self, poll_interval: Duration) -> Result<()> {
        loop {
            let report = self.drain_once().await?;
            if report.discovered > 0 {
                tracing::info!(
                    discovered = report.discovered,
                    acked = report.acked,
                    nacked = report.nacked,
                    dead_lettered = report.dead_lettered,
                    duplicates = report.duplicates,
                    "gateway drain complete"
                );
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn process_line(
        &self,
        line: &str,
        state: &mut GatewayRuntimeState,
        report: &mut GatewayDrainReport,
    ) -> Result<()> {
        let envelope = match parse_hearing_event_envelope(line) {
            Ok(envelope) => envelope,
            Err(error) => {
                let digest = envelope_digest(line);
                if state.malformed_envelope_digests.contains(&digest) {
                    report.duplicates += 1;
                    return Ok(());
                }
                state.malformed_envelope_digests.insert(digest);
                report.dead_lettered += 1;
                self.record_dead_letter(line, "", REASON_MALFORMED_ENVELOPE, &error.to_string())?;
                self.record_outcome(
                    "",
                    "",
                    "dead_letter",
                    REASON_MALFORMED_ENVELOPE,
                    &error.to_string(),
                )?;
                return Ok(());
            }
        };
        let message_id = envelope.message_id.trim().to_string();

        // An acked or parked message id is terminal: ack the duplicate
        // without touching the engine again.
        if state.processed_message_ids.contains(&message_id)
            || state.dead_lettered_message_ids.contains(&message_id)
        {
            report.duplicates += 1;
            return Ok(());
        }

        if !envelope
            .service_code
            .trim()
            .eq_ignore_ascii_case(self.config.service_code.trim())
        {
            report.dead_lettered += 1;
            let detail = format!(
                "envelope service code '{}' is outside this consumer's scope '{}'",
                envelope.service_code, self.config.service_code
            );
            state.dead_lettered_message_ids.insert(message_id.clone());
            state.delivery_counts.remove(&message_id);
            self.record_dead_letter(line, &message_id, REASON_SCOPE_MISMATCH, &detail)?;
            self.record_outcome(
                &message_id,
                &envelope.hearing_id,
                "dead_letter",
                REASON_SCOPE_MISMATCH,
                &detail,
            )?;
            return Ok(());
        }

        let delivery_count = state
            .delivery_counts
            .get(&message_id)
            .copied()
            .unwrap_or(0)
            .saturating_add(1);

        let disposition = match envelope_to_event(&envelope, delivery_count) {
            Ok(event) => {
                let result = self.dispatcher.dispatch(&event).await;
                classify_dispatch_result(&result)
            }
            Err(error) => GatewayDisposition::DeadLetter {
                reason_code: REASON_INVALID_EVENT,
                detail: error.to_string(),
            },
        };

        match disposition {
            GatewayDisposition::Ack { reason_code } => {
                report.acked += 1;
                state.processed_message_ids.insert(message_id.clone());
                state.delivery_counts.remove(&message_id);
                self.record_outcome(&message_id, &envelope.hearing_id, "ack", reason_code, "")?;
            }
            GatewayDisposition::Nack { reason_code } => {
                if delivery_count >= self.config.max_deliveries.max(1) {
                    report.dead_lettered += 1;
                    let detail = format!(
                        "redelivery budget of {} exhausted; last failure was {}",
                        self.config.max_deliveries, reason_code
                    );
                    state.dead_lettered_message_ids.insert(message_id.clone());
                    state.delivery_counts.remove(&message_id);
                    self.record_dead_letter(line, &message_id, REASON_REDELIVERY_EXHAUSTED, &detail)?;
                    self.record_outcome(
                        &message_id,
                        &envelope.hearing_id,
                        "dead_letter",
                        REASON_REDELIVERY_EXHAUSTED,
                        &detail,
                    )?;
                } else {
                    report.nacked += 1;
                    state.delivery_counts.insert(message_id.clone(), delivery_count);
                    self.record_outcome(&message_id, &envelope.hearing_id, "nack", reason_code, "")?;
                }
            }
            GatewayDisposition::DeadLetter { reason_code, detail } => {
                report.dead_lettered += 1;
                state.dead_lettered_message_ids.insert(message_id.clone());
                state.delivery_counts.remove(&message_id);
                self.record_dead_letter(line, &message_id, reason_code, &detail)?;
                self.record_outcome(
                    &message_id,
                    &envelope.hearing_id,
                    "dead_letter",
                    reason_code,
                    &detail,
                )?;
            }
        }
        Ok(())
    }

    fn record_outcome(
        &self,
        message_id: &str,
        hearing_id: &str,
        kind: &str,
        reason_code: &str,
        detail: &str,
    ) -> Result<()> {
        let now_unix_ms = current_unix_timestamp_ms();
        let record = json!({
            "timestamp": format_unix_ms_rfc3339(now_unix_ms),
            "timestamp_unix_ms": now_unix_ms,
            "message_id": message_id,
            "hearing_id": hearing_id,
            "disposition": kind,
            "reason_code": reason_code,
            "detail": detail,
        });
        append_jsonl_line(&self.config.outcomes_path, &record.to_string())
    }

    fn record_dead_letter(
        &self,
        raw_line: &str,
        message_id: &str,
        reason_code: &str,
        detail: &str,
    ) -> Result<()> {
        let record = json!({
            "timestamp_unix_ms": current_unix_timestamp_ms(),
            "message_id": message_id,
            "reason_code": reason_code,
            "detail": detail,
            "envelope": raw_line,
        });
        append_jsonl_line(&self.config.dead_letter_path, &record.to_string())
    }
}
