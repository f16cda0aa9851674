//! SPI protocol widths

use crate::hal::Capabilities;

/// Protocol width used for a transfer
///
/// Mirrors the controller's protocol field: how many data lines are driven
/// while the frame is clocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProtocolWidth {
    /// Standard SPI, one data line in each direction
    #[default]
    Single,
    /// Two bidirectional data lines
    Dual,
    /// Four bidirectional data lines
    Quad,
}

impl ProtocolWidth {
    /// Returns the number of data lines used for the data phase
    pub const fn data_lines(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Dual => 2,
            Self::Quad => 4,
        }
    }

    /// Returns true if a controller with `caps` can drive this width
    pub fn supported_by(&self, caps: Capabilities) -> bool {
        match self {
            Self::Single => true,
            Self::Dual => caps.contains(Capabilities::DUAL),
            Self::Quad => caps.contains(Capabilities::QUAD),
        }
    }

    /// Short lowercase name, as used on the command line and in config files
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Dual => "dual",
            Self::Quad => "quad",
        }
    }
}

impl core::fmt::Display for ProtocolWidth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
