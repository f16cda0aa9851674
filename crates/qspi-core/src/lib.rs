//! qspi-core - Core library for driving SPI NOR flash commands through a HAL
//!
//! This crate provides the pieces needed to discover an SPI controller,
//! configure the bus, and run a fixed sequence of flash commands against it.
//! It is designed to be `no_std` compatible so the same sequencer can run on
//! a microcontroller or on a host.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation for collected run reports
//! - `serde` - Serialize/deserialize the bus configuration types
//!
//! # Example
//!
//! ```ignore
//! use qspi_core::hal::SpiHal;
//! use qspi_core::plan::Plan;
//! use qspi_core::sequence::{execute, RunOptions};
//!
//! fn run<H: SpiHal>(hal: &mut H) -> qspi_core::Result<()> {
//!     let summary = execute(hal, &RunOptions::default(), &Plan::QSPI, &mut ())?;
//!     println!("ran {} steps on controller {}", summary.steps, summary.index);
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod hal;
pub mod plan;
pub mod sequence;
pub mod spi;

pub use error::{Error, Result};
