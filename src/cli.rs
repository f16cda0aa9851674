//! CLI argument parsing

use crate::backends;
use clap::Parser;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "SPI backend, optionally with options as name:key=value,... [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser, Debug)]
#[command(name = "qspi-runner")]
#[command(author, version, about = "Run SPI/QSPI NOR flash command sequences", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'p', long, help = backend_help())]
    pub backend: Option<String>,

    /// Command plan to run (see --list-plans)
    #[arg(long)]
    pub plan: Option<String>,

    /// Bus clock rate in baud
    #[arg(long, value_parser = parse_hex_u32)]
    pub baud: Option<u32>,

    /// Abort when clock initialization reports an error
    #[arg(long)]
    pub strict_clock: bool,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List available backends and exit
    #[arg(long)]
    pub list_backends: bool,

    /// List built-in plans and exit
    #[arg(long)]
    pub list_plans: bool,
}
