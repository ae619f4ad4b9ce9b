//! Thermal Coordinator - central process of a distributed temperature stabilization
//!
//! Accepts a fixed number of external processes over TCP, then runs
//! synchronous averaging rounds with them until every reported temperature
//! has settled, and finally tells each of them to stop.

mod cli;
mod config;
mod coordinator;
mod error;
mod logging;
mod peer;
mod protocol;
mod version;

use clap::Parser;
use tracing::{debug, error, info};

use crate::cli::{Cli, Commands};
use crate::config::CoordinatorConfig;
use crate::coordinator::{Phase, RoundCoordinator, RunSummary};
use crate::error::{Error, Result};
use crate::peer::PEER_COUNT;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            // Config commands use minimal logging
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Run {
            initial_temp,
            config,
            listen,
        } => {
            // Bad input is rejected before any socket is opened
            let initial_temp = parse_initial_temp(&initial_temp)?;

            let mut config = CoordinatorConfig::load(config.as_deref())?;
            if let Some(addr) = listen {
                config.coordinator.listen_addr = addr;
                config.validate()?;
            }

            // The guards must be kept alive until the run is over
            let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

            let build = version::build_info();
            info!(
                version = %build.full_version(),
                target = %build.target,
                profile = %build.profile,
                "Starting Thermal Coordinator"
            );

            let summary = run_coordinator(config, initial_temp).map_err(|e| {
                error!(code = %e.code(), error = %e.format_for_log(), "Coordinator failed");
                e
            })?;

            println!("{}", summary);
            Ok(())
        }
    }
}

/// Parse the initial central temperature from its command-line form
fn parse_initial_temp(input: &str) -> Result<f32> {
    let value: f32 = input
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| Error::invalid_temperature(input, e.to_string()))?;

    if !value.is_finite() {
        return Err(Error::invalid_temperature(input, "must be a finite number"));
    }

    Ok(value)
}

/// Register the peers and drive rounds until the system is stable
fn run_coordinator(config: CoordinatorConfig, initial_temp: f32) -> Result<RunSummary<PEER_COUNT>> {
    let addr = config.listen_addr()?;
    let round_delay = config.round_delay();

    info!(
        initial_temp,
        peers = PEER_COUNT,
        listen_addr = %addr,
        round_delay_ms = round_delay.as_millis() as u64,
        "Configuration loaded"
    );

    // One peer is served at a time, so a single-threaded runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async move {
        info!(phase = %Phase::AwaitingPeers, "Waiting for {} peers", PEER_COUNT);
        let peers = peer::register::<PEER_COUNT>(addr).await?;

        let coordinator = RoundCoordinator::new(initial_temp, peers).with_round_delay(round_delay);
        debug!(phase = %coordinator.phase(), "Peers registered");
        coordinator.run().await
    })
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: cli::ConfigSubcommand) -> Result<()> {
    use cli::ConfigSubcommand;

    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = CoordinatorConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            CoordinatorConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
