//! Run configuration
//!
//! Settings come from three layers: command-line flags, an optional TOML
//! file, and built-in defaults, in that order of precedence.
//!
//! ```toml
//! backend = "sim:devices=3"
//! plan = "qspi"
//! baud = 100000
//! strict_clock = false
//! probe_limit = 10
//!
//! [bus]
//! polarity = 0
//! phase = 0
//! bit_order = "msb"
//! cs_active = "low"
//! csid = 0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use qspi_core::plan::Plan;
use qspi_core::sequence::{ClockPolicy, ProbeRange, RunOptions};
use qspi_core::spi::{BitOrder, BusConfig, ChipSelectPolarity, ClockPhase, ClockPolarity};
use serde::Deserialize;
use thiserror::Error;

use crate::backends;
use crate::cli::Cli;

/// Errors from loading or resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field has a value outside its range
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    /// No plan by that name
    #[error("Unknown plan: {0} (use --list-plans)")]
    UnknownPlan(String),

    /// No backend compiled in
    #[error("No backends available (recompile with backend features enabled)")]
    NoBackend,
}

/// `[bus]` section
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BusSection {
    pub polarity: Option<u8>,
    pub phase: Option<u8>,
    pub bit_order: Option<BitOrder>,
    pub cs_active: Option<ChipSelectPolarity>,
    pub csid: Option<u8>,
}

/// Contents of a TOML config file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    pub backend: Option<String>,
    pub plan: Option<String>,
    pub baud: Option<u32>,
    pub strict_clock: Option<bool>,
    pub probe_limit: Option<u8>,
    #[serde(default)]
    pub bus: BusSection,
}

impl RunnerConfig {
    /// Load a config from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl BusSection {
    /// Initial bus configuration; protocol always starts at single
    fn to_bus_config(&self) -> Result<BusConfig, ConfigError> {
        let mut bus = BusConfig::new();
        if let Some(bit) = self.polarity {
            bus.polarity = ClockPolarity::from_bit(check_bit("bus.polarity", bit)?);
        }
        if let Some(bit) = self.phase {
            bus.phase = ClockPhase::from_bit(check_bit("bus.phase", bit)?);
        }
        if let Some(order) = self.bit_order {
            bus.bit_order = order;
        }
        if let Some(level) = self.cs_active {
            bus.cs_active = level;
        }
        if let Some(csid) = self.csid {
            bus = bus.with_csid(csid);
        }
        Ok(bus)
    }
}

fn check_bit(key: &'static str, bit: u8) -> Result<u8, ConfigError> {
    match bit {
        0 | 1 => Ok(bit),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: bit.to_string(),
        }),
    }
}

/// Everything needed to start a run
#[derive(Debug)]
pub struct Settings {
    /// Backend string, `name[:k=v,...]`
    pub backend: String,
    /// Plan to run
    pub plan: &'static Plan,
    /// Discovery, clock and bus options
    pub options: RunOptions,
}

impl Settings {
    /// Merge CLI flags over the config file over defaults
    pub fn resolve(cli: &Cli, file: &RunnerConfig) -> Result<Self, ConfigError> {
        let backend = match cli.backend.as_ref().or(file.backend.as_ref()) {
            Some(b) => b.clone(),
            None => backends::default_backend()
                .ok_or(ConfigError::NoBackend)?
                .to_string(),
        };

        let plan = match cli.plan.as_deref().or(file.plan.as_deref()) {
            Some(name) => Plan::find(name).ok_or_else(|| ConfigError::UnknownPlan(name.to_string()))?,
            None => &Plan::QSPI,
        };

        let mut options = RunOptions {
            bus: file.bus.to_bus_config()?,
            ..RunOptions::default()
        };
        if let Some(baud) = cli.baud.or(file.baud) {
            if baud == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "baud",
                    value: baud.to_string(),
                });
            }
            options.baud_rate = baud;
        }
        if cli.strict_clock || file.strict_clock.unwrap_or(false) {
            options.clock_policy = ClockPolicy::Checked;
        }
        if let Some(limit) = file.probe_limit {
            options.probe = ProbeRange::new(limit);
        }

        Ok(Self {
            backend,
            plan,
            options,
        })
    }
}
