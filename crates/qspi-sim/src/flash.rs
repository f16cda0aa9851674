//! Emulated NOR flash device
//!
//! Answers the catalogue commands the way a real part would on the wire:
//! the line floats high (0xFF) while the opcode, address and dummy bytes are
//! shifted in, and data follows from the command's response offset.

use qspi_core::spi::{catalogue, opcodes, BitOrder, BusConfig, ChipSelectPolarity};

/// Value read back while nothing drives MISO
pub const HIGH_Z: u8 = 0xFF;

/// Identity and contents of the emulated part
#[derive(Debug, Clone)]
pub struct FlashIdentity {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC device ID (memory type + capacity)
    pub device_id: u16,
    /// Electronic signature returned by RES
    pub signature: u8,
}

impl Default for FlashIdentity {
    fn default() -> Self {
        Self {
            manufacturer_id: 0x01, // Cypress/Spansion
            device_id: 0x2018,     // S25FL128S
            signature: 0x17,
        }
    }
}

/// In-memory flash array plus identity
#[derive(Debug, Clone)]
pub struct SimFlash {
    identity: FlashIdentity,
    data: Vec<u8>,
}

impl SimFlash {
    /// Create a flash of `size` bytes filled with an address pattern
    pub fn new(identity: FlashIdentity, size: usize) -> Self {
        let data = (0..size.max(1)).map(|i| i as u8).collect();
        Self { identity, data }
    }

    /// Fill `rx` with what the device drives while `tx` is clocked in
    pub fn respond(&self, config: &BusConfig, tx: &[u8], rx: &mut [u8]) {
        rx.fill(HIGH_Z);

        // An active-high CS never selects this part
        if config.cs_active == ChipSelectPolarity::High || tx.is_empty() {
            return;
        }

        let opcode = match config.bit_order {
            BitOrder::Msb => tx[0],
            BitOrder::Lsb => tx[0].reverse_bits(),
        };

        let Some(spec) = catalogue::lookup(opcode) else {
            log::trace!("sim: ignoring unknown opcode 0x{:02X}", opcode);
            return;
        };
        if spec.protocol != config.protocol {
            log::trace!(
                "sim: {} under {} protocol is garbage on the wire",
                spec.mnemonic,
                config.protocol
            );
            return;
        }

        let offset = spec.response_offset();
        if tx.len() <= offset {
            return;
        }
        let addr = spec.address.decode(&tx[1..]) as usize;
        let out = &mut rx[offset..];

        match opcode {
            opcodes::RDID => {
                let id = [
                    self.identity.manufacturer_id,
                    (self.identity.device_id >> 8) as u8,
                    self.identity.device_id as u8,
                ];
                let n = out.len().min(id.len());
                out[..n].copy_from_slice(&id[..n]);
            }
            opcodes::RES => out.fill(self.identity.signature),
            opcodes::REMS => {
                let pair = if addr & 1 == 0 {
                    [self.identity.manufacturer_id, self.identity.device_id as u8]
                } else {
                    [self.identity.device_id as u8, self.identity.manufacturer_id]
                };
                for (i, b) in out.iter_mut().enumerate() {
                    *b = pair[i % 2];
                }
            }
            opcodes::READ | opcodes::READ_4B | opcodes::DOR | opcodes::QOR => {
                for (i, b) in out.iter_mut().enumerate() {
                    *b = self.data[(addr + i) % self.data.len()];
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qspi_core::spi::ProtocolWidth;

    fn flash() -> SimFlash {
        SimFlash::new(FlashIdentity::default(), 4096)
    }

    #[test]
    fn test_rdid() {
        let mut rx = [0u8; 4];
        flash().respond(&BusConfig::new(), &[0x9F, 0, 0, 0], &mut rx);
        assert_eq!(rx, [HIGH_Z, 0x01, 0x20, 0x18]);
    }

    #[test]
    fn test_read_from_address() {
        let mut tx = [0u8; 8];
        tx[0] = opcodes::READ;
        tx[3] = 0x10;
        let mut rx = [0u8; 8];
        flash().respond(&BusConfig::new(), &tx, &mut rx);
        assert_eq!(rx, [HIGH_Z, HIGH_Z, HIGH_Z, HIGH_Z, 0x10, 0x11, 0x12, 0x13]);
    }

    #[test]
    fn test_dual_read_needs_dual_protocol() {
        let mut tx = [0u8; 10];
        tx[0] = opcodes::DOR;
        let mut rx = [0u8; 10];

        flash().respond(&BusConfig::new(), &tx, &mut rx);
        assert!(rx.iter().all(|&b| b == HIGH_Z));

        let dual = BusConfig::new().with_protocol(ProtocolWidth::Dual);
        flash().respond(&dual, &tx, &mut rx);
        assert_eq!(&rx[5..], &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_res_and_rems() {
        let mut rx = [0u8; 6];
        flash().respond(&BusConfig::new(), &[opcodes::RES, 0, 0, 0, 0, 0], &mut rx);
        assert_eq!(&rx[4..], &[0x17, 0x17]);

        flash().respond(&BusConfig::new(), &[opcodes::REMS, 0, 0, 0, 0, 0], &mut rx);
        assert_eq!(&rx[4..], &[0x01, 0x18]);
    }

    #[test]
    fn test_cs_active_high_never_selects() {
        let cfg = BusConfig {
            cs_active: ChipSelectPolarity::High,
            ..BusConfig::new()
        };
        let mut rx = [0u8; 4];
        flash().respond(&cfg, &[0x9F, 0, 0, 0], &mut rx);
        assert_eq!(rx, [HIGH_Z; 4]);
    }

    #[test]
    fn test_instruction_only_frame_has_no_data() {
        let mut rx = [0u8; 4];
        flash().respond(&BusConfig::new(), &[opcodes::READ_4B, 0, 0, 0], &mut rx);
        assert_eq!(rx, [HIGH_Z; 4]);
    }
}
