//! Scripted CPU double for controller tests.

use presid_cpu::{Bus, CpuCore, STACK_PAGE};

/// One scripted instruction.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    Nop,
    Read(u16),
    Write(u16, u8),
    /// Bump the 32-bit frame counter at `counter`, then toggle `flipflop`.
    NextFrame { flipflop: u16, counter: u16 },
    /// Pull a return address and jump past it, like `RTS`.
    Return,
}

/// Core that replays a fixed action list, cycling forever.
pub struct ScriptedCore {
    script: Vec<Action>,
    cursor: usize,
    pub pc: u16,
    pub a: u8,
    pub sp: u8,
    pub status: u8,
    pub resets: usize,
}

impl ScriptedCore {
    pub const fn new(script: Vec<Action>) -> Self {
        Self {
            script,
            cursor: 0,
            pc: 0,
            a: 0,
            sp: 0,
            status: 0,
            resets: 0,
        }
    }

    fn pull<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_PAGE | u16::from(self.sp))
    }
}

impl CpuCore for ScriptedCore {
    fn reset<B: Bus + ?Sized>(&mut self, _bus: &mut B) {
        self.resets += 1;
        self.cursor = 0;
    }

    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> presid_cpu::Result<()> {
        let action = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        self.pc = self.pc.wrapping_add(1);

        match action {
            Action::Nop => {}
            Action::Read(addr) => {
                let _ = bus.read(addr);
            }
            Action::Write(addr, value) => bus.write(addr, value),
            Action::NextFrame { flipflop, counter } => {
                let frame = u32::from_le_bytes([0u16, 1, 2, 3].map(|i| bus.read(counter + i)));
                for (i, byte) in (0u16..).zip((frame + 1).to_le_bytes()) {
                    bus.write(counter + i, byte);
                }
                let toggled = bus.read(flipflop) ^ 1;
                bus.write(flipflop, toggled);
            }
            Action::Return => {
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
            }
        }
        Ok(())
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
        self.cursor = 0;
    }

    fn set_accumulator(&mut self, value: u8) {
        self.a = value;
    }

    fn set_stack_pointer(&mut self, sp: u8) {
        self.sp = sp;
    }

    fn set_status(&mut self, status: u8) {
        self.status = status;
    }
}
