//! CLI argument models for the `rota` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "rota",
    about = "Hearing lifecycle reconciliation runtime",
    version
)]
/// Public struct `Cli` used across rota components.
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "ROTA_CONFIG", default_value = "rota.toml")]
    pub config: PathBuf,

    /// Raise the default log level from info to debug.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
/// Enumerates supported `Command` values.
pub enum Command {
    /// Consume the ingress file and dispatch events to the engine.
    GatewayRun {
        /// Drain the current ingress backlog once and exit instead of
        /// polling.
        #[arg(long)]
        once: bool,
    },
    /// Report the gateway's delivery accounting without dispatching.
    GatewayInspect,
    /// Request a hearing for a case unless one is already in flight.
    HearingRequest {
        #[arg(long)]
        case_id: String,
        /// Path to a JSON hearing payload document.
        #[arg(long)]
        payload: PathBuf,
    },
    /// Submit an amended payload for an existing hearing.
    HearingAmend {
        #[arg(long)]
        case_id: String,
        #[arg(long)]
        hearing_id: String,
        /// Path to a JSON hearing payload document.
        #[arg(long)]
        payload: PathBuf,
    },
    /// Cancel a hearing. The response is not written back to the case.
    HearingCancel {
        #[arg(long)]
        case_id: String,
        #[arg(long)]
        hearing_id: String,
        /// Cancellation reason code, e.g. WITHDRAWN.
        #[arg(long)]
        reason: String,
    },
}
