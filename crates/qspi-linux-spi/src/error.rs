//! Error types for Linux SPI operations

use qspi_core::hal::StatusCode;
use thiserror::Error;

/// Linux SPI specific errors
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to 0x{mode:02X}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI transfer failed
    #[error("SPI transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Transfer names a chip select other than the node's
    #[error("Chip select {requested} requested, but the node is bound to cs {node}")]
    ChipSelectMismatch { requested: u8, node: u8 },

    /// Transmit and receive buffers differ in length
    #[error("Buffer length mismatch: tx {tx} bytes, rx {rx} bytes")]
    LengthMismatch { tx: usize, rx: usize },
}

impl LinuxSpiError {
    /// Negated errno, as a HAL status
    pub fn status(&self) -> StatusCode {
        let errno = match self {
            Self::OpenFailed { source, .. }
            | Self::SetModeFailed { source, .. }
            | Self::SetBitsPerWordFailed { source, .. }
            | Self::SetSpeedFailed { source, .. }
            | Self::TransferFailed(source) => source.raw_os_error().unwrap_or(libc::EIO),
            Self::ChipSelectMismatch { .. } | Self::LengthMismatch { .. } => libc::EINVAL,
        };
        StatusCode(-errno)
    }
}

/// Result type for Linux SPI operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
