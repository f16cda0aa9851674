//! qspi-runner - Run fixed SPI/QSPI NOR flash command sequences
//!
//! Finds the first SPI controller a backend offers, sets its clock, and
//! issues a built-in plan of flash commands (read ID, single, dual and quad
//! reads) one blocking transfer at a time. The first failure ends the run
//! with exit status 1.
//!
//! # Architecture
//!
//! - `qspi-core` holds the HAL traits, frame builders, plans and the
//!   sequencer
//! - each backend crate implements the HAL: `qspi-sim` (emulated flash) and
//!   `qspi-linux-spi` (`/dev/spidevB.C`)
//! - this binary resolves settings from flags and an optional TOML file,
//!   then dispatches to the selected backend

mod backends;
mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::Cli;
use config::{RunnerConfig, Settings};

fn main() {
    let cli = Cli::parse();

    // -v raises the default filter; RUST_LOG still wins
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_backends {
        commands::list_backends();
        return;
    }
    if cli.list_plans {
        commands::list_plans();
        return;
    }

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let file = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            RunnerConfig::from_file(path)?
        }
        None => RunnerConfig::default(),
    };
    let settings = Settings::resolve(cli, &file)?;

    log::debug!(
        "backend={} plan={} baud={} clock={:?} probe=0..{}",
        settings.backend,
        settings.plan.name,
        settings.options.baud_rate,
        settings.options.clock_policy,
        settings.options.probe.limit
    );

    let mut reporter = commands::run::Reporter::stdout(cli.verbose > 0);
    commands::run::run(&settings, &mut reporter)
}
