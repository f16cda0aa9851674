//! Known flash commands and their frame layout
//!
//! Each entry records the opcode, the protocol width the device expects it
//! under, and how many address and dummy bytes precede the response. The
//! first `response_offset()` bytes of a receive buffer are high-impedance
//! filler and carry no data.

use super::{opcodes, AddressWidth, ProtocolWidth};

/// Layout of a flash command frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Opcode byte
    pub opcode: u8,
    /// Short mnemonic
    pub mnemonic: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Protocol width the device expects
    pub protocol: ProtocolWidth,
    /// Address bytes following the opcode
    pub address: AddressWidth,
    /// Dummy bytes between the address and the response
    pub dummy_bytes: usize,
}

impl CommandSpec {
    /// Length of opcode + address
    pub const fn header_len(&self) -> usize {
        1 + self.address.bytes()
    }

    /// Offset of the first meaningful response byte
    pub const fn response_offset(&self) -> usize {
        self.header_len() + self.dummy_bytes
    }
}

/// Read Data, 3-byte address
pub const READ: CommandSpec = CommandSpec {
    opcode: opcodes::READ,
    mnemonic: "READ",
    description: "Read with 3-byte address",
    protocol: ProtocolWidth::Single,
    address: AddressWidth::ThreeByte,
    dummy_bytes: 0,
};

/// Read device ID
pub const RDID: CommandSpec = CommandSpec {
    opcode: opcodes::RDID,
    mnemonic: "RDID",
    description: "Read device ID",
    protocol: ProtocolWidth::Single,
    address: AddressWidth::None,
    dummy_bytes: 0,
};

/// Read electronic signature
pub const RES: CommandSpec = CommandSpec {
    opcode: opcodes::RES,
    mnemonic: "RES",
    description: "Read electronic signature",
    protocol: ProtocolWidth::Single,
    address: AddressWidth::None,
    dummy_bytes: 3,
};

/// Dual Output Read
pub const DOR: CommandSpec = CommandSpec {
    opcode: opcodes::DOR,
    mnemonic: "DOR",
    description: "Dual-protocol read",
    protocol: ProtocolWidth::Dual,
    address: AddressWidth::ThreeByte,
    dummy_bytes: 1,
};

/// Quad Output Read
pub const QOR: CommandSpec = CommandSpec {
    opcode: opcodes::QOR,
    mnemonic: "QOR",
    description: "Quad-protocol read",
    protocol: ProtocolWidth::Quad,
    address: AddressWidth::ThreeByte,
    dummy_bytes: 1,
};

/// Read Data, 4-byte address
pub const READ_4B: CommandSpec = CommandSpec {
    opcode: opcodes::READ_4B,
    mnemonic: "READ_4B",
    description: "Read with 4-byte address",
    protocol: ProtocolWidth::Single,
    address: AddressWidth::FourByte,
    dummy_bytes: 0,
};

/// Read electronic manufacturer and device signature
pub const REMS: CommandSpec = CommandSpec {
    opcode: opcodes::REMS,
    mnemonic: "REMS",
    description: "Read electronic signature (multi-byte)",
    protocol: ProtocolWidth::Single,
    address: AddressWidth::ThreeByte,
    dummy_bytes: 0,
};

/// Every known command
pub const ALL: &[CommandSpec] = &[READ, RDID, RES, DOR, QOR, READ_4B, REMS];

/// Look up a command by opcode
pub fn lookup(opcode: u8) -> Option<&'static CommandSpec> {
    ALL.iter().find(|c| c.opcode == opcode)
}
