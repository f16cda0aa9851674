//! HAL traits and abstractions
//!
//! This module defines the seam between the sequencer and whatever drives
//! the SPI controller hardware (a vendor HAL, Linux spidev, a simulator).

mod traits;

pub use traits::*;
