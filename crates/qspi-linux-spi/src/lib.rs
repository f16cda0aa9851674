//! qspi-linux-spi - Linux spidev HAL
//!
//! Exposes each `/dev/spidevB.C` node as one SPI controller. Controller
//! index `N` maps to `<prefix>N.<cs>`, so discovery walks the bus numbers
//! on a fixed chip select.
//!
//! # Usage with qspi-runner
//!
//! ```bash
//! # Probe /dev/spidev0.0 .. /dev/spidev9.0
//! qspi-runner -p linux_spi
//!
//! # Chip select 1 on every bus
//! qspi-runner -p linux_spi:cs=1
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to the spidev nodes
//! - Dual and quad transfers need a controller driver that supports them

pub mod device;
pub mod error;

pub use device::{mode, mode_bits, parse_options, LinuxSpi, LinuxSpiConfig, LinuxSpiHal};
pub use error::{LinuxSpiError, Result};

/// Build a spidev HAL from backend options
pub fn open_linux_spi(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiHal, String> {
    Ok(LinuxSpiHal::new(parse_options(options)?))
}
