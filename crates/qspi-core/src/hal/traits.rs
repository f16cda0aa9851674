//! HAL trait definitions
//!
//! The contract is intentionally narrow: find a controller by index, set its
//! clock, and run one blocking full-duplex transfer. Status codes are opaque;
//! only zero versus non-zero matters to the caller.

use core::fmt;

use crate::spi::BusConfig;
use bitflags::bitflags;

bitflags! {
    /// Controller capability flags
    ///
    /// Informational for the sequencer; backends decide what to do when a
    /// transfer asks for something they lack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Can drive two data lines
        const DUAL           = 1 << 0;
        /// Can drive four data lines
        const QUAD           = 1 << 1;
        /// Can shift LSB first
        const LSB_FIRST      = 1 << 2;
        /// Supports an active-high chip select
        const CS_ACTIVE_HIGH = 1 << 3;

        /// Shorthand for everything a QSPI controller offers
        const QSPI = Self::DUAL.bits() | Self::QUAD.bits();
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

/// Non-zero status returned by a HAL call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Map a raw C-style status to a result: 0 is success
    pub const fn check(raw: i32) -> HalResult {
        if raw == 0 {
            Ok(())
        } else {
            Err(StatusCode(raw))
        }
    }

    /// The raw status value
    pub const fn raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a HAL call
pub type HalResult = core::result::Result<(), StatusCode>;

/// An SPI HAL: a set of controllers addressed by index
pub trait SpiHal {
    /// Handle to one controller instance
    type Controller: SpiController;

    /// Return the controller at `index`, or `None` if there is none
    fn get_device(&mut self, index: u8) -> Option<Self::Controller>;
}

/// One SPI controller instance
///
/// ## Example
///
/// ```ignore
/// impl SpiController for MyQspi {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::QSPI
///     }
///
///     fn init(&mut self, baud_rate: u32) -> HalResult {
///         StatusCode::check(unsafe { my_hal_init(self.raw, baud_rate) })
///     }
///
///     fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult {
///         let cfg = to_vendor_config(config);
///         StatusCode::check(unsafe {
///             my_hal_transfer(self.raw, &cfg, tx.len(), tx.as_ptr(), rx.as_mut_ptr())
///         })
///     }
/// }
/// ```
pub trait SpiController {
    /// Get the features supported by this controller
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Set the bus clock rate
    fn init(&mut self, baud_rate: u32) -> HalResult;

    /// Clock `tx` out and `rx` in, blocking until done
    ///
    /// `tx` and `rx` always have the same length. The leading bytes of `rx`
    /// are whatever the line held while the opcode was being shifted out.
    fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult;
}

impl<T: SpiController + ?Sized> SpiController for &mut T {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn init(&mut self, baud_rate: u32) -> HalResult {
        (**self).init(baud_rate)
    }

    fn transfer(&mut self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) -> HalResult {
        (**self).transfer(config, tx, rx)
    }
}
