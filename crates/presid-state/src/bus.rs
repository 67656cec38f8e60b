//! Bus adapter that records every CPU access.

use presid_cpu::Bus;

use crate::{AddressSpace, CellState};

/// Borrowed view of an [`AddressSpace`] handed to the CPU core.
///
/// Reads mark `READ`, writes mark `WRITTEN`; both bump the access counter.
pub struct InstrumentedBus<'a> {
    space: &'a mut AddressSpace,
}

impl<'a> InstrumentedBus<'a> {
    #[must_use]
    pub const fn new(space: &'a mut AddressSpace) -> Self {
        Self { space }
    }
}

impl Bus for InstrumentedBus<'_> {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.space.touch(addr, CellState::READ);
        self.space.peek(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.space.touch(addr, CellState::WRITTEN);
        self.space.poke(addr, value);
    }
}

impl AddressSpace {
    /// Instrumented bus over this space.
    #[must_use]
    pub const fn bus(&mut self) -> InstrumentedBus<'_> {
        InstrumentedBus::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_marks_and_counts() {
        let mut space = AddressSpace::new(0x5A);
        let value = space.bus().read(0x0300);
        assert_eq!(value, 0x5A);
        assert_eq!(space.state(0x0300), CellState::READ);
        assert_eq!(space.access_count(0x0300), 1);
    }

    #[test]
    fn test_write_marks_and_stores() {
        let mut space = AddressSpace::new(0);
        {
            let mut bus = space.bus();
            bus.write(0x0300, 0x11);
            bus.write(0x0300, 0x22);
            let _ = bus.read(0x0300);
        }
        assert_eq!(space.peek(0x0300), 0x22);
        assert_eq!(space.state(0x0300), CellState::READ | CellState::WRITTEN);
        assert_eq!(space.access_count(0x0300), 3);
    }

    #[test]
    fn test_instrumentation_never_changes_values() {
        let mut space = AddressSpace::new(0x33);
        for addr in [0x0000, 0x7FFF, 0xFFFF] {
            let _ = space.bus().read(addr);
            assert_eq!(space.peek(addr), 0x33);
        }
    }
}
