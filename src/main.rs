// nm-reconcile - Main Entry Point
// SPDX-License-Identifier: MIT

//! # nm-reconcile
//!
//! Declarative NetworkManager connection reconciler for Linux.
//!
//! Reads a desired-connection list (YAML, from the environment or
//! /etc/nm-reconcile.yaml), compares it against the connections stored by
//! NetworkManager, and creates and activates any that are missing. Intended
//! to run once, unattended, as a provisioning step.

use std::env;
use std::process::ExitCode;

mod config;
mod models;
mod nm_client;
mod reconcile;
mod service;

use nm_client::NmClient;
use reconcile::{Reconciler, RunSummary};

/// Binary name used in user-facing output.
pub const APP_NAME: &str = "nm-reconcile";

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print version information and exit.
fn print_version() {
    println!("{} {}", APP_NAME, VERSION);
    println!("License: MIT");
    println!();
    println!("Declarative NetworkManager connection reconciler for Linux.");
}

/// Print help information and exit.
fn print_help() {
    println!(
        "Usage: {} [OPTIONS]",
        env::args().next().unwrap_or_else(|| APP_NAME.to_string())
    );
    println!();
    println!("Reconciles a declared set of connections against NetworkManager,");
    println!("creating and activating any that are missing.");
    println!();
    println!("Options:");
    println!("  -h, --help       Show this help message and exit");
    println!("  -v, --version    Show version information and exit");
    println!("  -d, --debug      Enable debug logging");
    println!();
    println!("Environment variables:");
    println!("  {}    Inline YAML desired-connection list", config::CONFIG_ENV_VAR);
    println!("                       (fallback: {})", config::CONFIG_FALLBACK_PATH);
    println!("  RUST_LOG             Set log level (trace, debug, info, warn, error)");
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let mut debug_mode = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            "-d" | "--debug" => {
                debug_mode = true;
            }
            _ => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Try '--help' for more information.");
                return ExitCode::FAILURE;
            }
        }
    }

    // Initialize logging with appropriate level
    let log_level = if debug_mode {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .init();

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Per-entry failures are reflected in the logs and the summary, never
    // in the exit code; only fatal startup conditions fail the process.
    match runtime.block_on(run()) {
        Ok(summary) => {
            tracing::info!(
                "Run complete: {} activated, {} failed, {} already existing, {} without device",
                summary.activated,
                summary.failed,
                summary.skipped_existing,
                summary.skipped_no_device
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> models::Result<RunSummary> {
    let client = NmClient::connect().await?;
    match client.daemon_version().await {
        Ok(version) => tracing::info!("NetworkManager version: {}", version),
        Err(e) => tracing::debug!("Could not read NetworkManager version: {}", e),
    }

    let desired = config::load_desired_connections()?;
    tracing::info!("Got configuration with {} desired connection(s)", desired.len());

    Reconciler::new(&client).run(&desired).await
}
