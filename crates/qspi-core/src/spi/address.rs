//! Address width types

/// Address width for flash commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase
    #[default]
    None,
    /// 3-byte (24-bit) address
    ThreeByte,
    /// 4-byte (32-bit) address
    FourByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> usize {
        match self {
            Self::None => 0,
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Encode an address into `buf`, most significant byte first
    ///
    /// `buf` must hold at least [`AddressWidth::bytes`] bytes.
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        let be = address.to_be_bytes();
        match self {
            Self::None => {}
            Self::ThreeByte => buf[..3].copy_from_slice(&be[1..]),
            Self::FourByte => buf[..4].copy_from_slice(&be),
        }
    }

    /// Decode an MSB-first address from `buf`
    pub fn decode(&self, buf: &[u8]) -> u32 {
        buf.iter()
            .take(self.bytes())
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_msb_first() {
        let mut buf = [0u8; 4];
        AddressWidth::ThreeByte.encode(0x12_3456, &mut buf);
        assert_eq!(buf, [0x12, 0x34, 0x56, 0x00]);

        AddressWidth::FourByte.encode(0xDEAD_BEEF, &mut buf);
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_decode() {
        assert_eq!(AddressWidth::ThreeByte.decode(&[0x01, 0x02, 0x03, 0xFF]), 0x01_0203);
        assert_eq!(AddressWidth::None.decode(&[0xFF]), 0);
    }
}
