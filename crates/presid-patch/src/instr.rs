//! Patch instructions and their native encodings.

use std::fmt::{self, Display};

use presid_cpu::{OP_RTS, encode_absolute, encode_immediate};

use crate::IndexRegister;

/// One instruction of a patch program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatchInstr {
    LoadImmediate { reg: IndexRegister, value: u8 },
    Increment { reg: IndexRegister },
    StoreAbsolute { reg: IndexRegister, addr: u16 },
    Return,
}

impl PatchInstr {
    /// Encoded size in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::LoadImmediate { .. } => 2,
            Self::Increment { .. } | Self::Return => 1,
            Self::StoreAbsolute { .. } => 3,
        }
    }

    /// Append the native encoding to `out`.
    pub fn encode_into(self, out: &mut Vec<u8>) {
        match self {
            Self::LoadImmediate { reg, value } => {
                out.extend_from_slice(&encode_immediate(reg.load_immediate_opcode(), value));
            }
            Self::Increment { reg } => out.push(reg.increment_opcode()),
            Self::StoreAbsolute { reg, addr } => {
                out.extend_from_slice(&encode_absolute(reg.store_absolute_opcode(), addr));
            }
            Self::Return => out.push(OP_RTS),
        }
    }
}

impl Display for PatchInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadImmediate { reg, value } => write!(f, "LD{reg} #${value:02X}"),
            Self::Increment { reg } => write!(f, "IN{reg}"),
            Self::StoreAbsolute { reg, addr } => write!(f, "ST{reg} ${addr:04X}"),
            Self::Return => f.write_str("RTS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(instr: PatchInstr) -> Vec<u8> {
        let mut out = Vec::new();
        instr.encode_into(&mut out);
        assert_eq!(out.len(), instr.size());
        out
    }

    #[test]
    fn test_encode_x_register() {
        let reg = IndexRegister::X;
        let load = PatchInstr::LoadImmediate { reg, value: 5 };
        let store = PatchInstr::StoreAbsolute { reg, addr: 0xD418 };
        assert_eq!(encoded(load), [0xA2, 0x05]);
        assert_eq!(encoded(PatchInstr::Increment { reg }), [0xE8]);
        assert_eq!(encoded(store), [0x8E, 0x18, 0xD4]);
        assert_eq!(encoded(PatchInstr::Return), [0x60]);
    }

    #[test]
    fn test_encode_y_register() {
        let reg = IndexRegister::Y;
        let load = PatchInstr::LoadImmediate { reg, value: 0xFF };
        let store = PatchInstr::StoreAbsolute { reg, addr: 0x0010 };
        assert_eq!(encoded(load), [0xA0, 0xFF]);
        assert_eq!(encoded(PatchInstr::Increment { reg }), [0xC8]);
        assert_eq!(encoded(store), [0x8C, 0x10, 0x00]);
    }

    #[test]
    fn test_display() {
        let reg = IndexRegister::X;
        let y = IndexRegister::Y;
        let load = PatchInstr::LoadImmediate { reg, value: 5 };
        let store = PatchInstr::StoreAbsolute { reg, addr: 0x10 };
        assert_eq!(load.to_string(), "LDX #$05");
        assert_eq!(store.to_string(), "STX $0010");
        assert_eq!(PatchInstr::Increment { reg: y }.to_string(), "INY");
        assert_eq!(PatchInstr::Return.to_string(), "RTS");
    }
}
