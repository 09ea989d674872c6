//! Entry point for the `rota` binary: config load, tracing bootstrap, and
//! composition of clients, engine, gateway runtime, and lifecycle controller.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use rota_casework::{CaseMutator, CaseworkClient, CaseworkClientConfig};
use rota_gateway::{
    inspect_gateway, render_gateway_inspect_report, GatewayInspectConfig, GatewayRuntime,
    GatewayRuntimeConfig,
};
use rota_lifecycle::{HearingLifecycleController, LifecycleActionReport};
use rota_listings::{CancellationReason, HearingRequestPayload, ListingsClient, ListingsClientConfig};
use rota_reconcile::ReconcileEngine;

mod bootstrap_helpers;
mod cli_args;
mod config;

use bootstrap_helpers::init_tracing;
use cli_args::{Cli, Command};
use config::{load_config, RotaConfig};

fn build_listings_client(config: &RotaConfig) -> Result<ListingsClient> {
    ListingsClient::new(ListingsClientConfig {
        api_base: config.listings.api_base.clone(),
        auth_token: config.listings.auth_token.clone(),
        request_timeout_ms: config.listings.request_timeout_ms,
    })
    .context("failed to build scheduling-service client")
}

fn build_case_mutator(config: &RotaConfig) -> Result<CaseMutator> {
    let casework = CaseworkClient::new(CaseworkClientConfig {
        api_base: config.casework.api_base.clone(),
        auth_token: config.casework.auth_token.clone(),
        request_timeout_ms: config.casework.request_timeout_ms,
    })
    .context("failed to build case-store client")?;
    Ok(CaseMutator::new(Arc::new(casework)))
}

fn build_gateway_runtime(config: &RotaConfig) -> Result<GatewayRuntime> {
    let engine = ReconcileEngine::new(
        Arc::new(build_listings_client(config)?),
        Arc::new(config.venue_directory()),
        build_case_mutator(config)?,
        config.retry.to_policy(),
    );

    Ok(GatewayRuntime::new(
        GatewayRuntimeConfig {
            ingress_path: config.gateway.ingress_path.clone(),
            state_path: config.gateway.state_path.clone(),
            outcomes_path: config.gateway.outcomes_path.clone(),
            dead_letter_path: config.gateway.dead_letter_path.clone(),
            service_code: config.gateway.service_code.clone(),
            max_deliveries: config.gateway.max_deliveries,
        },
        Arc::new(engine),
    ))
}

fn build_lifecycle_controller(config: &RotaConfig) -> Result<HearingLifecycleController> {
    Ok(HearingLifecycleController::new(
        Arc::new(build_listings_client(config)?),
        build_case_mutator(config)?,
    ))
}

fn load_payload(path: &Path) -> Result<HearingRequestPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse payload file {}", path.display()))
}

fn print_lifecycle_report(report: &LifecycleActionReport) {
    println!(
        "{}: hearing {} version {}{}",
        report.action.as_str(),
        report.hearing_id,
        report.version,
        if report.reused_in_flight {
            " (reused in-flight hearing)"
        } else {
            ""
        }
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli.config)?;
    match cli.command {
        Command::GatewayRun { once } => {
            let runtime = build_gateway_runtime(&config)?;
            if once {
                let report = runtime.drain_once().await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                runtime
                    .run(Duration::from_millis(config.gateway.poll_interval_ms.max(1)))
                    .await?;
            }
        }
        Command::GatewayInspect => {
            let report = inspect_gateway(&GatewayInspectConfig {
                ingress_path: config.gateway.ingress_path.clone(),
                state_path: config.gateway.state_path.clone(),
            })?;
            println!("{}", render_gateway_inspect_report(&report));
        }
        Command::HearingRequest { case_id, payload } => {
            let controller = build_lifecycle_controller(&config)?;
            let report = controller
                .request_hearing(&case_id, &load_payload(&payload)?)
                .await?;
            print_lifecycle_report(&report);
        }
        Command::HearingAmend {
            case_id,
            hearing_id,
            payload,
        } => {
            let controller = build_lifecycle_controller(&config)?;
            let report = controller
                .amend_hearing(&case_id, &hearing_id, &load_payload(&payload)?)
                .await?;
            print_lifecycle_report(&report);
        }
        Command::HearingCancel {
            case_id,
            hearing_id,
            reason,
        } => {
            let controller = build_lifecycle_controller(&config)?;
            let report = controller
                .cancel_hearing(&case_id, &hearing_id, &CancellationReason::from(reason))
                .await?;
            print_lifecycle_report(&report);
        }
    }
    Ok(())
}
