//! Region classification over the instrumented address space.

use std::fmt::{self, Display};

use tracing::debug;

use crate::{AddressSpace, CellState};

/// Inclusive address interval, always stored as `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    start: u16,
    end: u16,
}

/// Zero page, ignored after a frame-driven run.
pub const ZERO_PAGE: Region = Region::new(0x0000, 0x00FF);

/// Hardware stack page.
pub const STACK_PAGE_REGION: Region = Region::new(0x0100, 0x01FF);

/// SID chip register block (including mirrors).
pub const SID_REGISTERS: Region = Region::new(0xD400, 0xD7FF);

impl Region {
    /// Build a region from two endpoints in either order.
    #[must_use]
    pub const fn new(a: u16, b: u16) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[must_use]
    pub const fn single(addr: u16) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    #[must_use]
    pub const fn start(self) -> u16 {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> u16 {
        self.end
    }

    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Number of addresses covered (1..=65536).
    #[must_use]
    pub fn size(self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }

    pub fn addresses(self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "${:04X}", self.start)
        } else {
            write!(f, "${:04X}-${:04X}", self.start, self.end)
        }
    }
}

/// Maximal run of matching cells; `end` is exclusive and may be `0x10000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionRun {
    pub start: u16,
    pub end: u32,
}

impl RegionRun {
    /// Last address inside the run.
    #[must_use]
    pub fn last(self) -> u16 {
        u16::try_from(self.end - 1).unwrap_or(u16::MAX)
    }
}

impl Display for RegionRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}-{:04X}", self.start, self.last())
    }
}

impl AddressSpace {
    /// Clear state flags and access counters across `region`.
    pub fn ignore(&mut self, region: Region) {
        debug!(%region, cells = region.size(), "ignoring region");
        for addr in region.addresses() {
            self.clear_cell(addr);
        }
    }

    /// Set every state flag across `region`, whatever execution did.
    pub fn force_include(&mut self, region: Region) {
        debug!(%region, cells = region.size(), "including region");
        for addr in region.addresses() {
            let state = self.state(addr) | CellState::ALL;
            self.set_state(addr, state);
        }
    }

    /// Whether any cell in `region` has a state flag set.
    #[must_use]
    pub fn is_used(&self, region: Region) -> bool {
        region.addresses().any(|addr| !self.state(addr).is_empty())
    }

    /// Group cells whose state intersects `mask` into ascending maximal runs.
    #[must_use]
    pub fn merge_to_ranges(&self, mask: CellState) -> Vec<RegionRun> {
        let mut runs = Vec::new();
        let mut open: Option<u16> = None;

        for addr in 0..=u16::MAX {
            let hit = self.state(addr).intersects(mask);
            match (open, hit) {
                (None, true) => open = Some(addr),
                (Some(start), false) => {
                    runs.push(RegionRun {
                        start,
                        end: u32::from(addr),
                    });
                    open = None;
                }
                _ => {}
            }
        }

        if let Some(start) = open {
            runs.push(RegionRun {
                start,
                end: 0x1_0000,
            });
        }

        runs
    }
}
