//! Bus configuration record

use super::ProtocolWidth;

/// Clock polarity (CPOL)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockPolarity {
    /// Clock idles low (CPOL=0)
    #[default]
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// Clock phase (CPHA)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockPhase {
    /// Data sampled on the leading edge (CPHA=0)
    #[default]
    CaptureOnFirstTransition,
    /// Data sampled on the trailing edge (CPHA=1)
    CaptureOnSecondTransition,
}

/// Bit order on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    Msb,
    /// Least significant bit first
    Lsb,
}

/// Chip-select active level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChipSelectPolarity {
    /// CS asserted by driving the line low
    #[default]
    Low,
    /// CS asserted by driving the line high
    High,
}

impl ClockPolarity {
    /// Build from the raw CPOL bit
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Self::IdleLow
        } else {
            Self::IdleHigh
        }
    }

    /// Raw CPOL bit
    pub const fn bit(&self) -> u8 {
        match self {
            Self::IdleLow => 0,
            Self::IdleHigh => 1,
        }
    }
}

impl ClockPhase {
    /// Build from the raw CPHA bit
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Self::CaptureOnFirstTransition
        } else {
            Self::CaptureOnSecondTransition
        }
    }

    /// Raw CPHA bit
    pub const fn bit(&self) -> u8 {
        match self {
            Self::CaptureOnFirstTransition => 0,
            Self::CaptureOnSecondTransition => 1,
        }
    }
}

/// Configuration passed with every transfer
///
/// A plain `Copy` value. Steps that need a different protocol width derive a
/// new value with [`BusConfig::with_protocol`] instead of mutating a shared
/// record, so every transfer sees exactly the configuration it was built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BusConfig {
    /// Protocol width for the whole frame
    pub protocol: ProtocolWidth,
    /// Clock polarity
    pub polarity: ClockPolarity,
    /// Clock phase
    pub phase: ClockPhase,
    /// Bit order
    pub bit_order: BitOrder,
    /// Chip-select active level
    pub cs_active: ChipSelectPolarity,
    /// Chip-select line id
    pub csid: u8,
}

impl BusConfig {
    /// Mode 0, MSB-first, CS active low on line 0, single protocol
    pub const fn new() -> Self {
        Self {
            protocol: ProtocolWidth::Single,
            polarity: ClockPolarity::IdleLow,
            phase: ClockPhase::CaptureOnFirstTransition,
            bit_order: BitOrder::Msb,
            cs_active: ChipSelectPolarity::Low,
            csid: 0,
        }
    }

    /// Return a copy with a different protocol width
    pub const fn with_protocol(mut self, protocol: ProtocolWidth) -> Self {
        self.protocol = protocol;
        self
    }

    /// Return a copy with a different chip-select line
    pub const fn with_csid(mut self, csid: u8) -> Self {
        self.csid = csid;
        self
    }

    /// SPI mode number (0-3) derived from CPOL/CPHA
    pub const fn mode(&self) -> u8 {
        (self.polarity.bit() << 1) | self.phase.bit()
    }
}
