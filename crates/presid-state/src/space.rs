//! Cell storage and per-cell instrumentation.

use std::fmt::{self, Display};
use std::ops::{BitOr, BitOrAssign};

use presid_cpu::ADDRESS_SPACE_SIZE;

/// Instrumentation flags recorded for a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellState(u8);

impl CellState {
    pub const EMPTY: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITTEN: Self = Self(2);
    pub const INITIALIZED: Self = Self(4);
    pub const ALL: Self = Self(7);

    /// Build from raw bits, dropping anything outside [`Self::ALL`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one flag of `mask` is set.
    #[must_use]
    pub const fn intersects(self, mask: Self) -> bool {
        self.0 & mask.0 != 0
    }

    #[must_use]
    pub const fn label(self) -> StateLabel {
        StateLabel::from_state(self)
    }
}

impl BitOr for CellState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellState {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Human-readable classification of a cell's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateLabel {
    Empty,
    Read,
    Written,
    ReadWritten,
    Init,
    InitRead,
    InitWritten,
    InitReadWritten,
}

impl StateLabel {
    #[must_use]
    pub const fn from_state(state: CellState) -> Self {
        let read = state.intersects(CellState::READ);
        let written = state.intersects(CellState::WRITTEN);
        let init = state.intersects(CellState::INITIALIZED);
        match (init, read, written) {
            (false, false, false) => Self::Empty,
            (false, true, false) => Self::Read,
            (false, false, true) => Self::Written,
            (false, true, true) => Self::ReadWritten,
            (true, false, false) => Self::Init,
            (true, true, false) => Self::InitRead,
            (true, false, true) => Self::InitWritten,
            (true, true, true) => Self::InitReadWritten,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Read => "read",
            Self::Written => "written",
            Self::ReadWritten => "read/written",
            Self::Init => "init",
            Self::InitRead => "init/read",
            Self::InitWritten => "init/written",
            Self::InitReadWritten => "init/read/written",
        }
    }
}

impl Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 64 KiB memory image with instrumentation.
///
/// Values and instrumentation live in parallel arrays. Instrumentation only
/// changes through the bus, the region operations and [`Self::load_bytes`];
/// it never feeds back into values.
#[derive(Clone)]
pub struct AddressSpace {
    values: Box<[u8]>,
    states: Box<[CellState]>,
    counts: Box<[u32]>,
}

impl AddressSpace {
    /// Create a space with every cell set to `fill` and no instrumentation.
    #[must_use]
    pub fn new(fill: u8) -> Self {
        Self {
            values: vec![fill; ADDRESS_SPACE_SIZE].into_boxed_slice(),
            states: vec![CellState::EMPTY; ADDRESS_SPACE_SIZE].into_boxed_slice(),
            counts: vec![0; ADDRESS_SPACE_SIZE].into_boxed_slice(),
        }
    }

    /// Refill all values and clear all instrumentation.
    pub fn reset(&mut self, fill: u8) {
        self.values.fill(fill);
        self.clear_tracking();
    }

    /// Clear state flags and access counters, keeping values.
    pub fn clear_tracking(&mut self) {
        self.states.fill(CellState::EMPTY);
        self.counts.fill(0);
    }

    /// Read a value without touching instrumentation.
    #[inline]
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.values[usize::from(addr)]
    }

    /// Write a value without touching instrumentation.
    #[inline]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.values[usize::from(addr)] = value;
    }

    /// Read a little-endian 32-bit word without touching instrumentation.
    #[must_use]
    pub fn peek_u32(&self, addr: u16) -> u32 {
        let peek = |offset| self.peek(addr.wrapping_add(offset));
        u32::from_le_bytes([peek(0), peek(1), peek(2), peek(3)])
    }

    #[inline]
    #[must_use]
    pub fn state(&self, addr: u16) -> CellState {
        self.states[usize::from(addr)]
    }

    #[inline]
    #[must_use]
    pub fn access_count(&self, addr: u16) -> u32 {
        self.counts[usize::from(addr)]
    }

    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Copy `data` to `addr`, optionally flagging the bytes as initialized.
    ///
    /// Wraps at the top of the address space; loaders check bounds first.
    pub fn load_bytes(&mut self, addr: u16, data: &[u8], mark_initialized: bool) {
        let mut cursor = addr;
        for &byte in data {
            self.values[usize::from(cursor)] = byte;
            if mark_initialized {
                self.states[usize::from(cursor)] |= CellState::INITIALIZED;
            }
            cursor = cursor.wrapping_add(1);
        }
    }

    /// Record an access: OR `flag` into the state and bump the counter.
    #[inline]
    pub(crate) fn touch(&mut self, addr: u16, flag: CellState) {
        let idx = usize::from(addr);
        self.states[idx] |= flag;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    #[inline]
    pub(crate) fn set_state(&mut self, addr: u16, state: CellState) {
        self.states[usize::from(addr)] = state;
    }

    /// Drop state and counter of one cell.
    #[inline]
    pub fn clear_cell(&mut self, addr: u16) {
        self.states[usize::from(addr)] = CellState::EMPTY;
        self.counts[usize::from(addr)] = 0;
    }

    /// Addresses whose state satisfies `predicate`, ascending.
    pub fn changed<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = u16> + 'a
    where
        F: Fn(CellState) -> bool + 'a,
    {
        let all = 0..=u16::MAX;
        all.filter(move |&addr| predicate(self.state(addr)))
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new(0)
    }
}
