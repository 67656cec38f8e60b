//! Opcode table for the NMOS 6502 instruction set.

use std::fmt::{self, Display};

/// Instruction mnemonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stable undocumented instructions
    Alr,
    Anc,
    Arr,
    Dcp,
    Isc,
    Lax,
    Rla,
    Rra,
    Sax,
    Sbx,
    Slo,
    Sre,
}

impl Mnemonic {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
            Self::Alr => "ALR",
            Self::Anc => "ANC",
            Self::Arr => "ARR",
            Self::Dcp => "DCP",
            Self::Isc => "ISC",
            Self::Lax => "LAX",
            Self::Rla => "RLA",
            Self::Rra => "RRA",
            Self::Sax => "SAX",
            Self::Sbx => "SBX",
            Self::Slo => "SLO",
            Self::Sre => "SRE",
        }
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operand addressing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl AddrMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndexedIndirect
            | Self::IndirectIndexed
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

/// Decoded opcode metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    /// Outside the documented NMOS instruction set.
    pub undocumented: bool,
}

impl OpInfo {
    #[must_use]
    pub const fn new(mnemonic: Mnemonic, mode: AddrMode) -> Self {
        Self {
            mnemonic,
            mode,
            undocumented: false,
        }
    }

    #[must_use]
    pub const fn undocumented(mnemonic: Mnemonic, mode: AddrMode) -> Self {
        Self {
            mnemonic,
            mode,
            undocumented: true,
        }
    }

    /// Instruction size in bytes including the opcode.
    #[must_use]
    pub const fn size(self) -> u8 {
        1 + self.mode.operand_len()
    }
}

/// Decode an opcode byte.
///
/// Covers the 151 documented opcodes and the stable undocumented ones.
/// Returns `None` for the JAM opcodes and the unstable undocumented
/// instructions (XAA, LAX immediate, AHX, TAS, SHX, SHY, LAS).
#[must_use]
pub const fn decode(opcode: u8) -> Option<OpInfo> {
    match decode_documented(opcode) {
        Some(info) => Some(info),
        None => decode_undocumented(opcode),
    }
}

#[allow(clippy::enum_glob_use, clippy::too_many_lines)]
const fn decode_documented(opcode: u8) -> Option<OpInfo> {
    use AddrMode::*;
    use Mnemonic::*;

    let (mnemonic, mode) = match opcode {
        0x69 => (Adc, Immediate),
        0x65 => (Adc, ZeroPage),
        0x75 => (Adc, ZeroPageX),
        0x6D => (Adc, Absolute),
        0x7D => (Adc, AbsoluteX),
        0x79 => (Adc, AbsoluteY),
        0x61 => (Adc, IndexedIndirect),
        0x71 => (Adc, IndirectIndexed),

        0x29 => (And, Immediate),
        0x25 => (And, ZeroPage),
        0x35 => (And, ZeroPageX),
        0x2D => (And, Absolute),
        0x3D => (And, AbsoluteX),
        0x39 => (And, AbsoluteY),
        0x21 => (And, IndexedIndirect),
        0x31 => (And, IndirectIndexed),

        0x0A => (Asl, Accumulator),
        0x06 => (Asl, ZeroPage),
        0x16 => (Asl, ZeroPageX),
        0x0E => (Asl, Absolute),
        0x1E => (Asl, AbsoluteX),

        0x90 => (Bcc, Relative),
        0xB0 => (Bcs, Relative),
        0xF0 => (Beq, Relative),
        0x30 => (Bmi, Relative),
        0xD0 => (Bne, Relative),
        0x10 => (Bpl, Relative),
        0x50 => (Bvc, Relative),
        0x70 => (Bvs, Relative),

        0x24 => (Bit, ZeroPage),
        0x2C => (Bit, Absolute),

        0x00 => (Brk, Implied),

        0x18 => (Clc, Implied),
        0xD8 => (Cld, Implied),
        0x58 => (Cli, Implied),
        0xB8 => (Clv, Implied),

        0xC9 => (Cmp, Immediate),
        0xC5 => (Cmp, ZeroPage),
        0xD5 => (Cmp, ZeroPageX),
        0xCD => (Cmp, Absolute),
        0xDD => (Cmp, AbsoluteX),
        0xD9 => (Cmp, AbsoluteY),
        0xC1 => (Cmp, IndexedIndirect),
        0xD1 => (Cmp, IndirectIndexed),

        0xE0 => (Cpx, Immediate),
        0xE4 => (Cpx, ZeroPage),
        0xEC => (Cpx, Absolute),

        0xC0 => (Cpy, Immediate),
        0xC4 => (Cpy, ZeroPage),
        0xCC => (Cpy, Absolute),

        0xC6 => (Dec, ZeroPage),
        0xD6 => (Dec, ZeroPageX),
        0xCE => (Dec, Absolute),
        0xDE => (Dec, AbsoluteX),

        0xCA => (Dex, Implied),
        0x88 => (Dey, Implied),

        0x49 => (Eor, Immediate),
        0x45 => (Eor, ZeroPage),
        0x55 => (Eor, ZeroPageX),
        0x4D => (Eor, Absolute),
        0x5D => (Eor, AbsoluteX),
        0x59 => (Eor, AbsoluteY),
        0x41 => (Eor, IndexedIndirect),
        0x51 => (Eor, IndirectIndexed),

        0xE6 => (Inc, ZeroPage),
        0xF6 => (Inc, ZeroPageX),
        0xEE => (Inc, Absolute),
        0xFE => (Inc, AbsoluteX),

        0xE8 => (Inx, Implied),
        0xC8 => (Iny, Implied),

        0x4C => (Jmp, Absolute),
        0x6C => (Jmp, Indirect),
        0x20 => (Jsr, Absolute),

        0xA9 => (Lda, Immediate),
        0xA5 => (Lda, ZeroPage),
        0xB5 => (Lda, ZeroPageX),
        0xAD => (Lda, Absolute),
        0xBD => (Lda, AbsoluteX),
        0xB9 => (Lda, AbsoluteY),
        0xA1 => (Lda, IndexedIndirect),
        0xB1 => (Lda, IndirectIndexed),

        0xA2 => (Ldx, Immediate),
        0xA6 => (Ldx, ZeroPage),
        0xB6 => (Ldx, ZeroPageY),
        0xAE => (Ldx, Absolute),
        0xBE => (Ldx, AbsoluteY),

        0xA0 => (Ldy, Immediate),
        0xA4 => (Ldy, ZeroPage),
        0xB4 => (Ldy, ZeroPageX),
        0xAC => (Ldy, Absolute),
        0xBC => (Ldy, AbsoluteX),

        0x4A => (Lsr, Accumulator),
        0x46 => (Lsr, ZeroPage),
        0x56 => (Lsr, ZeroPageX),
        0x4E => (Lsr, Absolute),
        0x5E => (Lsr, AbsoluteX),

        0xEA => (Nop, Implied),

        0x09 => (Ora, Immediate),
        0x05 => (Ora, ZeroPage),
        0x15 => (Ora, ZeroPageX),
        0x0D => (Ora, Absolute),
        0x1D => (Ora, AbsoluteX),
        0x19 => (Ora, AbsoluteY),
        0x01 => (Ora, IndexedIndirect),
        0x11 => (Ora, IndirectIndexed),

        0x48 => (Pha, Implied),
        0x08 => (Php, Implied),
        0x68 => (Pla, Implied),
        0x28 => (Plp, Implied),

        0x2A => (Rol, Accumulator),
        0x26 => (Rol, ZeroPage),
        0x36 => (Rol, ZeroPageX),
        0x2E => (Rol, Absolute),
        0x3E => (Rol, AbsoluteX),

        0x6A => (Ror, Accumulator),
        0x66 => (Ror, ZeroPage),
        0x76 => (Ror, ZeroPageX),
        0x6E => (Ror, Absolute),
        0x7E => (Ror, AbsoluteX),

        0x40 => (Rti, Implied),
        0x60 => (Rts, Implied),

        0xE9 => (Sbc, Immediate),
        0xE5 => (Sbc, ZeroPage),
        0xF5 => (Sbc, ZeroPageX),
        0xED => (Sbc, Absolute),
        0xFD => (Sbc, AbsoluteX),
        0xF9 => (Sbc, AbsoluteY),
        0xE1 => (Sbc, IndexedIndirect),
        0xF1 => (Sbc, IndirectIndexed),

        0x38 => (Sec, Implied),
        0xF8 => (Sed, Implied),
        0x78 => (Sei, Implied),

        0x85 => (Sta, ZeroPage),
        0x95 => (Sta, ZeroPageX),
        0x8D => (Sta, Absolute),
        0x9D => (Sta, AbsoluteX),
        0x99 => (Sta, AbsoluteY),
        0x81 => (Sta, IndexedIndirect),
        0x91 => (Sta, IndirectIndexed),

        0x86 => (Stx, ZeroPage),
        0x96 => (Stx, ZeroPageY),
        0x8E => (Stx, Absolute),

        0x84 => (Sty, ZeroPage),
        0x94 => (Sty, ZeroPageX),
        0x8C => (Sty, Absolute),

        0xAA => (Tax, Implied),
        0xA8 => (Tay, Implied),
        0xBA => (Tsx, Implied),
        0x8A => (Txa, Implied),
        0x9A => (Txs, Implied),
        0x98 => (Tya, Implied),

        _ => return None,
    };

    Some(OpInfo::new(mnemonic, mode))
}

#[allow(clippy::enum_glob_use, clippy::too_many_lines)]
const fn decode_undocumented(opcode: u8) -> Option<OpInfo> {
    use AddrMode::*;
    use Mnemonic::*;

    let (mnemonic, mode) = match opcode {
        0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => (Nop, Implied),
        0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => (Nop, Immediate),
        0x04 | 0x44 | 0x64 => (Nop, ZeroPage),
        0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => (Nop, ZeroPageX),
        0x0C => (Nop, Absolute),
        0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => (Nop, AbsoluteX),

        0xEB => (Sbc, Immediate),

        0x0B | 0x2B => (Anc, Immediate),
        0x4B => (Alr, Immediate),
        0x6B => (Arr, Immediate),
        0xCB => (Sbx, Immediate),

        0xA7 => (Lax, ZeroPage),
        0xB7 => (Lax, ZeroPageY),
        0xAF => (Lax, Absolute),
        0xBF => (Lax, AbsoluteY),
        0xA3 => (Lax, IndexedIndirect),
        0xB3 => (Lax, IndirectIndexed),

        0x87 => (Sax, ZeroPage),
        0x97 => (Sax, ZeroPageY),
        0x8F => (Sax, Absolute),
        0x83 => (Sax, IndexedIndirect),

        0xC7 => (Dcp, ZeroPage),
        0xD7 => (Dcp, ZeroPageX),
        0xCF => (Dcp, Absolute),
        0xDF => (Dcp, AbsoluteX),
        0xDB => (Dcp, AbsoluteY),
        0xC3 => (Dcp, IndexedIndirect),
        0xD3 => (Dcp, IndirectIndexed),

        0xE7 => (Isc, ZeroPage),
        0xF7 => (Isc, ZeroPageX),
        0xEF => (Isc, Absolute),
        0xFF => (Isc, AbsoluteX),
        0xFB => (Isc, AbsoluteY),
        0xE3 => (Isc, IndexedIndirect),
        0xF3 => (Isc, IndirectIndexed),

        0x07 => (Slo, ZeroPage),
        0x17 => (Slo, ZeroPageX),
        0x0F => (Slo, Absolute),
        0x1F => (Slo, AbsoluteX),
        0x1B => (Slo, AbsoluteY),
        0x03 => (Slo, IndexedIndirect),
        0x13 => (Slo, IndirectIndexed),

        0x27 => (Rla, ZeroPage),
        0x37 => (Rla, ZeroPageX),
        0x2F => (Rla, Absolute),
        0x3F => (Rla, AbsoluteX),
        0x3B => (Rla, AbsoluteY),
        0x23 => (Rla, IndexedIndirect),
        0x33 => (Rla, IndirectIndexed),

        0x47 => (Sre, ZeroPage),
        0x57 => (Sre, ZeroPageX),
        0x4F => (Sre, Absolute),
        0x5F => (Sre, AbsoluteX),
        0x5B => (Sre, AbsoluteY),
        0x43 => (Sre, IndexedIndirect),
        0x53 => (Sre, IndirectIndexed),

        0x67 => (Rra, ZeroPage),
        0x77 => (Rra, ZeroPageX),
        0x6F => (Rra, Absolute),
        0x7F => (Rra, AbsoluteX),
        0x7B => (Rra, AbsoluteY),
        0x63 => (Rra, IndexedIndirect),
        0x73 => (Rra, IndirectIndexed),

        _ => return None,
    };

    Some(OpInfo::undocumented(mnemonic, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_counts() {
        let decoded: Vec<OpInfo> = (0..=255u8).filter_map(decode).collect();
        let documented = decoded.iter().filter(|info| !info.undocumented).count();
        assert_eq!(documented, 151);
        assert_eq!(decoded.len(), 236);
    }

    #[test]
    fn test_decode_store_absolute() {
        let info = decode(0x8E).unwrap();
        assert_eq!(info.mnemonic, Mnemonic::Stx);
        assert_eq!(info.mode, AddrMode::Absolute);
        assert!(!info.undocumented);
        assert_eq!(info.size(), 3);
    }

    #[test]
    fn test_decode_undocumented() {
        let lax = decode(0xA7).unwrap();
        assert_eq!(lax.mnemonic, Mnemonic::Lax);
        assert_eq!(lax.mode, AddrMode::ZeroPage);
        assert!(lax.undocumented);

        assert_eq!(decode(0xFC).unwrap().size(), 3);
        assert_eq!(decode(0xEB).unwrap().mnemonic, Mnemonic::Sbc);
    }

    #[test]
    fn test_decode_unsupported() {
        // JAM
        assert!(decode(0x02).is_none());
        assert!(decode(0xF2).is_none());
        // XAA, LAX #imm
        assert!(decode(0x8B).is_none());
        assert!(decode(0xAB).is_none());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(decode(0x60).unwrap().size(), 1);
        assert_eq!(decode(0xA2).unwrap().size(), 2);
        assert_eq!(decode(0xD0).unwrap().size(), 2);
        assert_eq!(decode(0x6C).unwrap().size(), 3);
    }

    #[test]
    fn test_mnemonic_display() {
        assert_eq!(Mnemonic::Ldx.to_string(), "LDX");
        assert_eq!(format!("{}", Mnemonic::Rts), "RTS");
    }
}
