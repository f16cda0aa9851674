//! Error types for qspi-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::hal::StatusCode;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Discovery errors
    /// No controller answered in the probe range
    DiscoveryFailed {
        /// Number of indices that were probed
        probed: u8,
    },

    // Bus errors
    /// Clock initialization returned a non-zero status under the checked policy
    ClockInitFailed {
        /// Status returned by the HAL
        status: StatusCode,
    },
    /// A command transfer returned a non-zero status
    TransferFailed {
        /// Name of the step that failed
        step: &'static str,
        /// Opcode (first frame byte) of the failed step
        opcode: u8,
        /// Status returned by the HAL
        status: StatusCode,
    },

    // Frame errors
    /// Frame length is zero or exceeds the frame capacity
    InvalidFrameLength {
        /// Requested frame length
        len: usize,
    },
    /// Frame is too short to hold the opcode and the requested address
    FrameTooShort {
        /// Requested frame length
        len: usize,
        /// Minimum length needed
        needed: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscoveryFailed { probed } => {
                write!(f, "no SPI controller found in {} probed indices", probed)
            }
            Self::ClockInitFailed { status } => {
                write!(f, "SPI clock initialization failed (status {})", status)
            }
            Self::TransferFailed {
                step,
                opcode,
                status,
            } => write!(
                f,
                "SPI transfer failed in step '{}' (opcode 0x{:02X}, status {})",
                step, opcode, status
            ),
            Self::InvalidFrameLength { len } => write!(f, "invalid frame length {}", len),
            Self::FrameTooShort { len, needed } => write!(
                f,
                "frame of {} bytes too short, needs at least {}",
                len, needed
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
