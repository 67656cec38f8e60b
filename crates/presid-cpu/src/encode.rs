//! Encoding helpers for emitting 6502 machine code.

// Opcodes used by generated code
pub const OP_LDX_IMM: u8 = 0xA2;
pub const OP_LDY_IMM: u8 = 0xA0;
pub const OP_STX_ABS: u8 = 0x8E;
pub const OP_STY_ABS: u8 = 0x8C;
pub const OP_INX: u8 = 0xE8;
pub const OP_INY: u8 = 0xC8;
pub const OP_RTS: u8 = 0x60;

/// Encode a two-byte immediate instruction.
#[inline]
#[must_use]
pub const fn encode_immediate(opcode: u8, value: u8) -> [u8; 2] {
    [opcode, value]
}

/// Encode a three-byte absolute instruction (operand little-endian).
#[inline]
#[must_use]
pub const fn encode_absolute(opcode: u8, addr: u16) -> [u8; 3] {
    let [lo, hi] = addr.to_le_bytes();
    [opcode, lo, hi]
}

/// Read a little-endian 16-bit word from two bytes.
#[inline]
#[must_use]
pub const fn word(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}
