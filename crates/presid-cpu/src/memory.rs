//! Plain 64 KiB memory with no instrumentation.

use crate::{ADDRESS_SPACE_SIZE, Bus};

/// Flat RAM covering the full address space.
pub struct FlatMemory {
    bytes: Box<[u8]>,
}

impl FlatMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; ADDRESS_SPACE_SIZE].into_boxed_slice(),
        }
    }

    /// Copy `data` to `addr`, wrapping at the top of the address space.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let mut cursor = addr;
        for &byte in data {
            self.bytes[usize::from(cursor)] = byte;
            cursor = cursor.wrapping_add(1);
        }
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for FlatMemory {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.bytes[usize::from(addr)]
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.bytes[usize::from(addr)] = value;
    }
}
