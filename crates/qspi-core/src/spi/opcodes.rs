//! SPI NOR flash opcodes used by the demonstration plans
//!
//! Values follow the Cypress S25FL datasheet naming. The caller is expected
//! to pad every instruction with enough dummy bytes to keep SCK running while
//! the device answers.

// ============================================================================
// Single protocol commands
// ============================================================================

/// Read Data with 3-byte address
pub const READ: u8 = 0x03;
/// Read device ID
pub const RDID: u8 = 0x9F;
/// Read electronic signature
pub const RES: u8 = 0x05;
/// Read Data with 4-byte address
pub const READ_4B: u8 = 0x13;
/// Read electronic signature (manufacturer and device ID, multi-byte)
pub const REMS: u8 = 0x90;

// ============================================================================
// Dual protocol commands
// ============================================================================

/// Dual Output Read (1-1-2)
pub const DOR: u8 = 0x3B;

// ============================================================================
// Quad protocol commands
// ============================================================================

/// Quad Output Read (1-1-4)
pub const QOR: u8 = 0x6B;
