//! Fixed-length command frames
//!
//! A frame is what gets clocked out on MOSI: the opcode, optional address
//! bytes, then zero dummies that keep SCK running while the device answers.
//! Frames live on the stack so the sequencer works without an allocator.

use heapless::Vec;

use super::CommandSpec;
use crate::error::{Error, Result};

/// Largest frame the sequencer will build
pub const MAX_FRAME_LEN: usize = 256;

/// Byte buffer holding one frame (or its response)
pub type FrameBuf = Vec<u8, MAX_FRAME_LEN>;

/// A zero-filled frame of fixed length
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: FrameBuf,
}

impl CommandFrame {
    /// Opcode at offset 0, everything else zero
    pub fn command(opcode: u8, len: usize) -> Result<Self> {
        let mut bytes = zeroed(len)?;
        bytes[0] = opcode;
        Ok(Self { bytes })
    }

    /// Opcode followed by `address` in the command's address width, MSB first
    pub fn command_at(spec: &CommandSpec, address: u32, len: usize) -> Result<Self> {
        let needed = spec.header_len();
        if len < needed {
            return Err(Error::FrameTooShort { len, needed });
        }

        let mut frame = Self::command(spec.opcode, len)?;
        spec.address.encode(address, &mut frame.bytes[1..]);
        Ok(frame)
    }

    /// Literal bytes, zero-padded up to `len`
    pub fn raw(data: &[u8], len: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidFrameLength { len: 0 });
        }
        if len < data.len() {
            return Err(Error::FrameTooShort {
                len,
                needed: data.len(),
            });
        }

        let mut bytes = zeroed(len)?;
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self { bytes })
    }

    /// First byte of the frame
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Frames are never empty; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A zeroed receive buffer of the same length
    pub fn response_buffer(&self) -> Result<FrameBuf> {
        zeroed(self.bytes.len())
    }
}

fn zeroed(len: usize) -> Result<FrameBuf> {
    if len == 0 {
        return Err(Error::InvalidFrameLength { len });
    }
    let mut bytes = FrameBuf::new();
    bytes
        .resize(len, 0)
        .map_err(|_| Error::InvalidFrameLength { len })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::{catalogue, opcodes};

    #[test]
    fn test_command_zero_filled() {
        let frame = CommandFrame::command(opcodes::READ, 70).unwrap();
        assert_eq!(frame.len(), 70);
        assert_eq!(frame.opcode(), 0x03);
        assert!(frame.as_bytes()[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_command_at_encodes_address() {
        let frame = CommandFrame::command_at(&catalogue::READ, 0x01_0203, 8).unwrap();
        assert_eq!(frame.as_bytes(), &[0x03, 0x01, 0x02, 0x03, 0, 0, 0, 0]);

        let frame = CommandFrame::command_at(&catalogue::READ_4B, 0x0A0B_0C0D, 6).unwrap();
        assert_eq!(frame.as_bytes(), &[0x13, 0x0A, 0x0B, 0x0C, 0x0D, 0]);
    }

    #[test]
    fn test_command_at_too_short() {
        // READ_4B with an asserted address needs opcode + 4 bytes
        assert_eq!(
            CommandFrame::command_at(&catalogue::READ_4B, 0, 4),
            Err(Error::FrameTooShort { len: 4, needed: 5 })
        );
        // Instruction-only frames are fine without an address
        assert!(CommandFrame::command(opcodes::READ_4B, 4).is_ok());
    }

    #[test]
    fn test_invalid_lengths() {
        assert_eq!(
            CommandFrame::command(opcodes::RDID, 0),
            Err(Error::InvalidFrameLength { len: 0 })
        );
        assert_eq!(
            CommandFrame::command(opcodes::RDID, MAX_FRAME_LEN + 1),
            Err(Error::InvalidFrameLength {
                len: MAX_FRAME_LEN + 1
            })
        );
        assert!(CommandFrame::command(opcodes::RDID, MAX_FRAME_LEN).is_ok());
    }

    #[test]
    fn test_raw_padding() {
        let frame = CommandFrame::raw(&[0x34, 0x12, 0x97, 0xDA], 5).unwrap();
        assert_eq!(frame.as_bytes(), &[0x34, 0x12, 0x97, 0xDA, 0x00]);
        assert!(CommandFrame::raw(&[1, 2, 3], 2).is_err());
        assert!(CommandFrame::raw(&[], 2).is_err());
    }

    #[test]
    fn test_response_buffer_matches_length() {
        let frame = CommandFrame::command(opcodes::QOR, 20).unwrap();
        let rx = frame.response_buffer().unwrap();
        assert_eq!(rx.len(), frame.len());
        assert!(rx.iter().all(|&b| b == 0));
    }
}
