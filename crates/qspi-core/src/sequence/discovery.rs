//! Controller discovery

use crate::error::{Error, Result};
use crate::hal::SpiHal;

/// Number of controller indices probed by default (0..=9)
pub const DEFAULT_PROBE_LIMIT: u8 = 10;

/// Indices to probe, `0..limit`, in increasing order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeRange {
    /// Number of indices to try
    pub limit: u8,
}

impl Default for ProbeRange {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PROBE_LIMIT,
        }
    }
}

impl ProbeRange {
    /// Probe `0..limit`
    pub const fn new(limit: u8) -> Self {
        Self { limit }
    }

    /// The indices in probe order
    pub fn indices(&self) -> core::ops::Range<u8> {
        0..self.limit
    }
}

/// A controller found by [`discover`]
#[derive(Debug)]
pub struct Discovered<C> {
    /// Index the controller answered at
    pub index: u8,
    /// The controller handle
    pub controller: C,
}

/// Return the first controller the HAL hands out
///
/// One pass, no delay, no retry. Fails with [`Error::DiscoveryFailed`] when
/// every index in the range comes back empty.
pub fn discover<H: SpiHal + ?Sized>(
    hal: &mut H,
    range: ProbeRange,
) -> Result<Discovered<H::Controller>> {
    for index in range.indices() {
        match hal.get_device(index) {
            Some(controller) => {
                log::info!("Found SPI controller at index {}", index);
                return Ok(Discovered { index, controller });
            }
            None => log::debug!("No SPI controller at index {}", index),
        }
    }

    Err(Error::DiscoveryFailed {
        probed: range.limit,
    })
}
