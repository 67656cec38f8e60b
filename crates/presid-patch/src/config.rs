//! Synthesis configuration.

use std::fmt::{self, Display};

use presid_cpu::{OP_INX, OP_INY, OP_LDX_IMM, OP_LDY_IMM, OP_STX_ABS, OP_STY_ABS};

/// Index register used to carry store values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexRegister {
    #[default]
    X,
    Y,
}

impl IndexRegister {
    #[must_use]
    pub const fn load_immediate_opcode(self) -> u8 {
        match self {
            Self::X => OP_LDX_IMM,
            Self::Y => OP_LDY_IMM,
        }
    }

    #[must_use]
    pub const fn increment_opcode(self) -> u8 {
        match self {
            Self::X => OP_INX,
            Self::Y => OP_INY,
        }
    }

    #[must_use]
    pub const fn store_absolute_opcode(self) -> u8 {
        match self {
            Self::X => OP_STX_ABS,
            Self::Y => OP_STY_ABS,
        }
    }
}

impl Display for IndexRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::Y => f.write_str("Y"),
        }
    }
}

/// Patch synthesis configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SynthConfig {
    /// Register used for loads, increments and stores.
    pub register: IndexRegister,
    /// Treat the register as holding 0 on entry, so a first group of value 1
    /// becomes an increment. Only sound when the caller guarantees it.
    pub assume_zero_register: bool,
}

impl SynthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_register(mut self, register: IndexRegister) -> Self {
        self.register = register;
        self
    }

    #[must_use]
    pub const fn with_assume_zero_register(mut self, enabled: bool) -> Self {
        self.assume_zero_register = enabled;
        self
    }
}
