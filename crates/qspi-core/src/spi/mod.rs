//! SPI types and command structures
//!
//! This module provides the bus configuration record, protocol widths,
//! the flash opcode catalogue and the fixed-length command frames that are
//! handed to the HAL.

mod address;
pub mod catalogue;
mod config;
mod frame;
pub mod opcodes;
mod protocol;

pub use address::AddressWidth;
pub use catalogue::CommandSpec;
pub use config::{BitOrder, BusConfig, ChipSelectPolarity, ClockPhase, ClockPolarity};
pub use frame::{CommandFrame, FrameBuf, MAX_FRAME_LEN};
pub use protocol::ProtocolWidth;
