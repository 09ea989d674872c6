//! Read-only inspection of the gateway's delivery accounting, for operator
//! diagnostics; nothing here dispatches events or mutates state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::runtime::load_gateway_state;

#[derive(Debug, Clone)]
/// Public struct `GatewayInspectConfig` used across rota components.
pub struct GatewayInspectConfig {
    pub ingress_path: PathBuf,
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
/// Public struct `GatewayInspectReport` used across rota components.
pub struct GatewayInspectReport {
    pub ingress_path: String,
    pub state_path: String,
    pub ingress_envelopes: usize,
    pub processed_messages: usize,
    pub pending_messages: usize,
    pub dead_lettered_messages: usize,
}

pub fn inspect_gateway(config: &GatewayInspectConfig) -> Result<GatewayInspectReport> {
    let ingress_envelopes = match std::fs::read_to_string(&config.ingress_path) {
        Ok(contents) => contents.lines().filter(|line| !line.trim().is_empty()).count(),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => 0,
        Err(error) => {
            return Err(error).with_context(|| {
                format!("failed to read ingress file {}", config.ingress_path.display())
            })
        }
    };
    let state = load_gateway_state(&config.state_path)?;

    Ok(GatewayInspectReport {
        ingress_path: config.ingress_path.display().to_string(),
        state_path: config.state_path.display().to_string(),
        ingress_envelopes,
        processed_messages: state.processed_message_ids.len(),
        pending_messages: state.delivery_counts.len(),
        dead_lettered_messages: state.dead_lettered_message_ids.len(),
    })
}

pub fn render_gateway_inspect_report(report: &GatewayInspectReport) -> String {
    let mut lines = Vec::new();
    lines.push("Gateway inspect".to_string());
    lines.push(format!("  ingress_path: {}", report.ingress_path));
    lines.push(format!("  state_path: {}", report.state_path));
    lines.push(format!("  ingress_envelopes: {}", report.ingress_envelopes));
    lines.push(format!("  processed_messages: {}", report.processed_messages));
    lines.push(format!("  pending_messages: {}", report.pending_messages));
    lines.push(format!(
        "  dead_lettered_messages: {}",
        report.dead_lettered_messages
    ));
    lines.join("\n")
}
