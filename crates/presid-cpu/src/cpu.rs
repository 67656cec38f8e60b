//! NMOS 6502 interpreter.

use crate::{
    AddrMode, Bus, CpuCore, CpuError, FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT,
    FLAG_NEGATIVE, FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO, IRQ_VECTOR, Mnemonic, RESET_VECTOR,
    Registers, Result, STACK_PAGE, decode, word,
};

/// Resolved operand of a decoded instruction.
#[derive(Clone, Copy, Debug)]
enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Address(u16),
}

/// NMOS 6502 core.
///
/// Every memory access, including opcode and operand fetches and stack
/// traffic, is issued through the [`Bus`] passed to [`CpuCore::step`].
/// The stable undocumented opcodes execute like the NMOS part; JAM and the
/// unstable ones fail with [`CpuError::UnsupportedOpcode`].
#[derive(Clone, Debug, Default)]
pub struct Mos6502 {
    regs: Registers,
}

impl Mos6502 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regs: Registers::new(),
        }
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    fn fetch<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        word(lo, hi)
    }

    fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        bus.write(STACK_PAGE | u16::from(self.regs.sp), value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    fn pull<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        bus.read(STACK_PAGE | u16::from(self.regs.sp))
    }

    fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    fn pull_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        word(lo, hi)
    }

    /// Pointer fetch within the zero page (the high byte wraps to $00).
    fn zero_page_word<B: Bus + ?Sized>(bus: &mut B, ptr: u8) -> u16 {
        let lo = bus.read(u16::from(ptr));
        let hi = bus.read(u16::from(ptr.wrapping_add(1)));
        word(lo, hi)
    }

    fn resolve<B: Bus + ?Sized>(&mut self, bus: &mut B, mode: AddrMode) -> Operand {
        let Registers { x, y, .. } = self.regs;
        match mode {
            AddrMode::Implied => Operand::Implied,
            AddrMode::Accumulator => Operand::Accumulator,
            AddrMode::Immediate => Operand::Immediate(self.fetch(bus)),
            AddrMode::ZeroPage => Operand::Address(u16::from(self.fetch(bus))),
            AddrMode::ZeroPageX => Operand::Address(u16::from(self.fetch(bus).wrapping_add(x))),
            AddrMode::ZeroPageY => Operand::Address(u16::from(self.fetch(bus).wrapping_add(y))),
            AddrMode::Absolute => Operand::Address(self.fetch_word(bus)),
            AddrMode::AbsoluteX => {
                Operand::Address(self.fetch_word(bus).wrapping_add(u16::from(x)))
            }
            AddrMode::AbsoluteY => {
                Operand::Address(self.fetch_word(bus).wrapping_add(u16::from(y)))
            }
            AddrMode::Indirect => {
                // The pointer's high byte is fetched without carrying into the page.
                let ptr = self.fetch_word(bus);
                let [ptr_lo, ptr_hi] = ptr.to_le_bytes();
                let lo = bus.read(ptr);
                let hi = bus.read(word(ptr_lo.wrapping_add(1), ptr_hi));
                Operand::Address(word(lo, hi))
            }
            AddrMode::IndexedIndirect => {
                let ptr = self.fetch(bus).wrapping_add(x);
                Operand::Address(Self::zero_page_word(bus, ptr))
            }
            AddrMode::IndirectIndexed => {
                let ptr = self.fetch(bus);
                Operand::Address(Self::zero_page_word(bus, ptr).wrapping_add(u16::from(y)))
            }
            AddrMode::Relative => {
                let offset = i8::from_le_bytes([self.fetch(bus)]);
                Operand::Address(self.regs.pc.wrapping_add_signed(i16::from(offset)))
            }
        }
    }

    fn load<B: Bus + ?Sized>(&self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Immediate(value) => value,
            Operand::Address(addr) => bus.read(addr),
            Operand::Accumulator | Operand::Implied => self.regs.a,
        }
    }

    fn store<B: Bus + ?Sized>(bus: &mut B, operand: Operand, value: u8) {
        if let Operand::Address(addr) = operand {
            bus.write(addr, value);
        }
    }

    /// Read-modify-write on memory or the accumulator; returns the new value.
    fn modify<B, F>(&mut self, bus: &mut B, operand: Operand, f: F) -> u8
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut Registers, u8) -> u8,
    {
        let result = if let Operand::Address(addr) = operand {
            let value = bus.read(addr);
            let result = f(&mut self.regs, value);
            bus.write(addr, result);
            result
        } else {
            let a = self.regs.a;
            let result = f(&mut self.regs, a);
            self.regs.a = result;
            result
        };
        self.regs.set_nz(result);
        result
    }

    const fn branch(&mut self, operand: Operand, taken: bool) {
        if let (true, Operand::Address(target)) = (taken, operand) {
            self.regs.pc = target;
        }
    }

    const fn compare(&mut self, register: u8, value: u8) {
        self.regs.set_flag(FLAG_CARRY, register >= value);
        self.regs.set_nz(register.wrapping_sub(value));
    }

    fn adc(&mut self, value: u8) {
        let a = u16::from(self.regs.a);
        let v = u16::from(value);
        let carry = u16::from(self.regs.flag(FLAG_CARRY));
        let binary = a + v + carry;

        if self.regs.flag(FLAG_DECIMAL) {
            let mut lo = (a & 0x0F) + (v & 0x0F) + carry;
            if lo > 0x09 {
                lo += 0x06;
            }
            let mut hi = (a >> 4) + (v >> 4) + u16::from(lo > 0x0F);
            // NMOS: Z from the binary sum, N and V from the intermediate high nibble.
            self.regs.set_flag(FLAG_ZERO, binary & 0xFF == 0);
            self.regs.set_flag(FLAG_NEGATIVE, hi & 0x08 != 0);
            self.regs.set_flag(
                FLAG_OVERFLOW,
                ((hi << 4) ^ a) & 0x80 != 0 && (a ^ v) & 0x80 == 0,
            );
            if hi > 0x09 {
                hi += 0x06;
            }
            self.regs.set_flag(FLAG_CARRY, hi > 0x0F);
            let [result, _] = ((hi << 4) | (lo & 0x0F)).to_le_bytes();
            self.regs.a = result;
        } else {
            let [result, _] = binary.to_le_bytes();
            self.regs.set_flag(FLAG_CARRY, binary > 0xFF);
            self.regs
                .set_flag(FLAG_OVERFLOW, (!(a ^ v) & (a ^ binary)) & 0x80 != 0);
            self.regs.a = result;
            self.regs.set_nz(result);
        }
    }

    fn sbc(&mut self, value: u8) {
        if !self.regs.flag(FLAG_DECIMAL) {
            self.adc(!value);
            return;
        }

        let a = i16::from(self.regs.a);
        let v = i16::from(value);
        let borrow = i16::from(!self.regs.flag(FLAG_CARRY));
        let binary = a - v - borrow;

        let mut lo = (a & 0x0F) - (v & 0x0F) - borrow;
        let mut hi = (a >> 4) - (v >> 4);
        if lo < 0 {
            lo -= 0x06;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 0x06;
        }

        // Flags follow the binary subtraction.
        let [result, _] = binary.to_le_bytes();
        self.regs.set_flag(FLAG_CARRY, binary >= 0);
        self.regs
            .set_flag(FLAG_OVERFLOW, ((a ^ v) & (a ^ binary)) & 0x80 != 0);
        self.regs.set_nz(result);
        let [decimal, _] = ((hi << 4) | (lo & 0x0F)).to_le_bytes();
        self.regs.a = decimal;
    }

    #[allow(clippy::too_many_lines)]
    fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B, mnemonic: Mnemonic, operand: Operand) {
        match mnemonic {
            Mnemonic::Lda => {
                self.regs.a = self.load(bus, operand);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Ldx => {
                self.regs.x = self.load(bus, operand);
                self.regs.set_nz(self.regs.x);
            }
            Mnemonic::Ldy => {
                self.regs.y = self.load(bus, operand);
                self.regs.set_nz(self.regs.y);
            }
            Mnemonic::Sta => Self::store(bus, operand, self.regs.a),
            Mnemonic::Stx => Self::store(bus, operand, self.regs.x),
            Mnemonic::Sty => Self::store(bus, operand, self.regs.y),

            Mnemonic::Adc => {
                let value = self.load(bus, operand);
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = self.load(bus, operand);
                self.sbc(value);
            }
            Mnemonic::And => {
                self.regs.a &= self.load(bus, operand);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Ora => {
                self.regs.a |= self.load(bus, operand);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Eor => {
                self.regs.a ^= self.load(bus, operand);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Cmp => {
                let value = self.load(bus, operand);
                self.compare(self.regs.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.load(bus, operand);
                self.compare(self.regs.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.load(bus, operand);
                self.compare(self.regs.y, value);
            }
            Mnemonic::Bit => {
                let value = self.load(bus, operand);
                self.regs.set_flag(FLAG_ZERO, self.regs.a & value == 0);
                self.regs.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
                self.regs.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
            }

            Mnemonic::Asl => {
                self.modify(bus, operand, asl);
            }
            Mnemonic::Lsr => {
                self.modify(bus, operand, lsr);
            }
            Mnemonic::Rol => {
                self.modify(bus, operand, rol);
            }
            Mnemonic::Ror => {
                self.modify(bus, operand, ror);
            }
            Mnemonic::Inc => {
                self.modify(bus, operand, |_, v| v.wrapping_add(1));
            }
            Mnemonic::Dec => {
                self.modify(bus, operand, |_, v| v.wrapping_sub(1));
            }

            Mnemonic::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.set_nz(self.regs.x);
            }
            Mnemonic::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.set_nz(self.regs.y);
            }
            Mnemonic::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.set_nz(self.regs.x);
            }
            Mnemonic::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.set_nz(self.regs.y);
            }

            Mnemonic::Tax => {
                self.regs.x = self.regs.a;
                self.regs.set_nz(self.regs.x);
            }
            Mnemonic::Tay => {
                self.regs.y = self.regs.a;
                self.regs.set_nz(self.regs.y);
            }
            Mnemonic::Txa => {
                self.regs.a = self.regs.x;
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Tya => {
                self.regs.a = self.regs.y;
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Tsx => {
                self.regs.x = self.regs.sp;
                self.regs.set_nz(self.regs.x);
            }
            Mnemonic::Txs => self.regs.sp = self.regs.x,

            Mnemonic::Pha => self.push(bus, self.regs.a),
            Mnemonic::Php => self.push(bus, self.regs.status | FLAG_BREAK | FLAG_UNUSED),
            Mnemonic::Pla => {
                self.regs.a = self.pull(bus);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Plp => {
                self.regs.status = (self.pull(bus) & !FLAG_BREAK) | FLAG_UNUSED;
            }

            Mnemonic::Bcc => self.branch(operand, !self.regs.flag(FLAG_CARRY)),
            Mnemonic::Bcs => self.branch(operand, self.regs.flag(FLAG_CARRY)),
            Mnemonic::Bne => self.branch(operand, !self.regs.flag(FLAG_ZERO)),
            Mnemonic::Beq => self.branch(operand, self.regs.flag(FLAG_ZERO)),
            Mnemonic::Bpl => self.branch(operand, !self.regs.flag(FLAG_NEGATIVE)),
            Mnemonic::Bmi => self.branch(operand, self.regs.flag(FLAG_NEGATIVE)),
            Mnemonic::Bvc => self.branch(operand, !self.regs.flag(FLAG_OVERFLOW)),
            Mnemonic::Bvs => self.branch(operand, self.regs.flag(FLAG_OVERFLOW)),

            Mnemonic::Jmp => {
                if let Operand::Address(target) = operand {
                    self.regs.pc = target;
                }
            }
            Mnemonic::Jsr => {
                if let Operand::Address(target) = operand {
                    let ret = self.regs.pc.wrapping_sub(1);
                    self.push_word(bus, ret);
                    self.regs.pc = target;
                }
            }
            Mnemonic::Rts => {
                self.regs.pc = self.pull_word(bus).wrapping_add(1);
            }
            Mnemonic::Brk => {
                let ret = self.regs.pc.wrapping_add(1);
                self.push_word(bus, ret);
                self.push(bus, self.regs.status | FLAG_BREAK | FLAG_UNUSED);
                self.regs.set_flag(FLAG_INTERRUPT, true);
                let lo = bus.read(IRQ_VECTOR);
                let hi = bus.read(IRQ_VECTOR.wrapping_add(1));
                self.regs.pc = word(lo, hi);
            }
            Mnemonic::Rti => {
                self.regs.status = (self.pull(bus) & !FLAG_BREAK) | FLAG_UNUSED;
                self.regs.pc = self.pull_word(bus);
            }

            Mnemonic::Clc => self.regs.set_flag(FLAG_CARRY, false),
            Mnemonic::Sec => self.regs.set_flag(FLAG_CARRY, true),
            Mnemonic::Cld => self.regs.set_flag(FLAG_DECIMAL, false),
            Mnemonic::Sed => self.regs.set_flag(FLAG_DECIMAL, true),
            Mnemonic::Cli => self.regs.set_flag(FLAG_INTERRUPT, false),
            Mnemonic::Sei => self.regs.set_flag(FLAG_INTERRUPT, true),
            Mnemonic::Clv => self.regs.set_flag(FLAG_OVERFLOW, false),
            // Operand bytes were consumed by `resolve`; no memory access.
            Mnemonic::Nop => {}

            Mnemonic::Alr
            | Mnemonic::Anc
            | Mnemonic::Arr
            | Mnemonic::Dcp
            | Mnemonic::Isc
            | Mnemonic::Lax
            | Mnemonic::Rla
            | Mnemonic::Rra
            | Mnemonic::Sax
            | Mnemonic::Sbx
            | Mnemonic::Slo
            | Mnemonic::Sre => self.execute_combined(bus, mnemonic, operand),
        }
    }

    /// Undocumented instructions that fuse two documented operations.
    fn execute_combined<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        mnemonic: Mnemonic,
        operand: Operand,
    ) {
        match mnemonic {
            Mnemonic::Lax => {
                let value = self.load(bus, operand);
                self.regs.a = value;
                self.regs.x = value;
                self.regs.set_nz(value);
            }
            Mnemonic::Sax => Self::store(bus, operand, self.regs.a & self.regs.x),
            Mnemonic::Dcp => {
                let value = self.modify(bus, operand, |_, v| v.wrapping_sub(1));
                self.compare(self.regs.a, value);
            }
            Mnemonic::Isc => {
                let value = self.modify(bus, operand, |_, v| v.wrapping_add(1));
                self.sbc(value);
            }
            Mnemonic::Slo => {
                self.regs.a |= self.modify(bus, operand, asl);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Rla => {
                self.regs.a &= self.modify(bus, operand, rol);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Sre => {
                self.regs.a ^= self.modify(bus, operand, lsr);
                self.regs.set_nz(self.regs.a);
            }
            Mnemonic::Rra => {
                let value = self.modify(bus, operand, ror);
                self.adc(value);
            }
            Mnemonic::Anc => {
                self.regs.a &= self.load(bus, operand);
                self.regs.set_nz(self.regs.a);
                self.regs.set_flag(FLAG_CARRY, self.regs.a & 0x80 != 0);
            }
            Mnemonic::Alr => {
                self.regs.a &= self.load(bus, operand);
                self.modify(bus, Operand::Accumulator, lsr);
            }
            Mnemonic::Arr => {
                // Binary-mode behaviour; decimal mode is not modelled.
                self.regs.a &= self.load(bus, operand);
                let result = self.modify(bus, Operand::Accumulator, ror);
                self.regs.set_flag(FLAG_CARRY, result & 0x40 != 0);
                self.regs
                    .set_flag(FLAG_OVERFLOW, ((result >> 6) ^ (result >> 5)) & 0x01 != 0);
            }
            Mnemonic::Sbx => {
                let value = self.load(bus, operand);
                let masked = self.regs.a & self.regs.x;
                self.regs.set_flag(FLAG_CARRY, masked >= value);
                self.regs.x = masked.wrapping_sub(value);
                self.regs.set_nz(self.regs.x);
            }
            _ => unreachable!("{mnemonic} is a documented instruction"),
        }
    }
}

const fn asl(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(FLAG_CARRY, value & 0x80 != 0);
    value << 1
}

const fn lsr(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(FLAG_CARRY, value & 0x01 != 0);
    value >> 1
}

fn rol(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = u8::from(regs.flag(FLAG_CARRY));
    regs.set_flag(FLAG_CARRY, value & 0x80 != 0);
    (value << 1) | carry_in
}

fn ror(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = u8::from(regs.flag(FLAG_CARRY)) << 7;
    regs.set_flag(FLAG_CARRY, value & 0x01 != 0);
    (value >> 1) | carry_in
}

impl CpuCore for Mos6502 {
    fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        let lo = bus.read(RESET_VECTOR);
        let hi = bus.read(RESET_VECTOR.wrapping_add(1));
        self.regs.pc = word(lo, hi);
    }

    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let pc = self.regs.pc;
        let opcode = self.fetch(bus);
        let Some(info) = decode(opcode) else {
            self.regs.pc = pc;
            return Err(CpuError::UnsupportedOpcode { opcode, pc });
        };
        let operand = self.resolve(bus, info.mode);
        self.execute(bus, info.mnemonic, operand);
        Ok(())
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    fn set_accumulator(&mut self, value: u8) {
        self.regs.a = value;
    }

    fn set_stack_pointer(&mut self, sp: u8) {
        self.regs.sp = sp;
    }

    fn set_status(&mut self, status: u8) {
        self.regs.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlatMemory, RETURN_SENTINEL};

    const ORIGIN: u16 = 0x0600;

    fn setup(program: &[u8]) -> (Mos6502, FlatMemory) {
        let mut memory = FlatMemory::new();
        memory.load(ORIGIN, program);
        let mut cpu = Mos6502::new();
        cpu.set_pc(ORIGIN);
        (cpu, memory)
    }

    fn run(cpu: &mut Mos6502, memory: &mut FlatMemory, steps: usize) {
        for _ in 0..steps {
            cpu.step(memory).expect("step failed");
        }
    }

    #[test]
    fn test_load_store() {
        // LDX #$05; STX $10; INX; STX $11
        let (mut cpu, mut memory) = setup(&[0xA2, 0x05, 0x86, 0x10, 0xE8, 0x86, 0x11]);
        run(&mut cpu, &mut memory, 4);
        assert_eq!(memory.read(0x10), 5);
        assert_eq!(memory.read(0x11), 6);
        assert_eq!(cpu.registers().x, 6);
    }

    #[test]
    fn test_adc_binary_overflow() {
        // CLC; LDA #$50; ADC #$50
        let (mut cpu, mut memory) = setup(&[0x18, 0xA9, 0x50, 0x69, 0x50]);
        run(&mut cpu, &mut memory, 3);
        let regs = cpu.registers();
        assert_eq!(regs.a, 0xA0);
        assert!(regs.flag(FLAG_OVERFLOW));
        assert!(regs.flag(FLAG_NEGATIVE));
        assert!(!regs.flag(FLAG_CARRY));
    }

    #[test]
    fn test_adc_decimal() {
        // SED; CLC; LDA #$09; ADC #$01
        let (mut cpu, mut memory) = setup(&[0xF8, 0x18, 0xA9, 0x09, 0x69, 0x01]);
        run(&mut cpu, &mut memory, 4);
        assert_eq!(cpu.registers().a, 0x10);
        assert!(!cpu.registers().flag(FLAG_CARRY));

        // SED; CLC; LDA #$99; ADC #$01
        let (mut cpu, mut memory) = setup(&[0xF8, 0x18, 0xA9, 0x99, 0x69, 0x01]);
        run(&mut cpu, &mut memory, 4);
        assert_eq!(cpu.registers().a, 0x00);
        assert!(cpu.registers().flag(FLAG_CARRY));
    }

    #[test]
    fn test_sbc_binary_and_decimal() {
        // SEC; LDA #$10; SBC #$01
        let (mut cpu, mut memory) = setup(&[0x38, 0xA9, 0x10, 0xE9, 0x01]);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(cpu.registers().a, 0x0F);
        assert!(cpu.registers().flag(FLAG_CARRY));

        // SED; SEC; LDA #$10; SBC #$01
        let (mut cpu, mut memory) = setup(&[0xF8, 0x38, 0xA9, 0x10, 0xE9, 0x01]);
        run(&mut cpu, &mut memory, 4);
        assert_eq!(cpu.registers().a, 0x09);
        assert!(cpu.registers().flag(FLAG_CARRY));
    }

    #[test]
    fn test_compare_flags() {
        // LDA #$40; CMP #$40
        let (mut cpu, mut memory) = setup(&[0xA9, 0x40, 0xC9, 0x40]);
        run(&mut cpu, &mut memory, 2);
        assert!(cpu.registers().flag(FLAG_ZERO));
        assert!(cpu.registers().flag(FLAG_CARRY));
    }

    #[test]
    fn test_branch_loop() {
        // LDX #$03; DEX; BNE -3; STX $20
        let (mut cpu, mut memory) = setup(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0x86, 0x20]);
        run(&mut cpu, &mut memory, 1 + 3 * 2 + 1);
        assert_eq!(cpu.registers().x, 0);
        assert_eq!(cpu.pc(), ORIGIN + 7);
    }

    #[test]
    fn test_rmw_rotate() {
        // SEC; ROR $30
        let (mut cpu, mut memory) = setup(&[0x38, 0x66, 0x30]);
        memory.write(0x30, 0x01);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(memory.read(0x30), 0x80);
        assert!(cpu.registers().flag(FLAG_CARRY));
        assert!(cpu.registers().flag(FLAG_NEGATIVE));
    }

    #[test]
    fn test_jsr_rts() {
        // JSR $0610; (at $0610) RTS
        let (mut cpu, mut memory) = setup(&[0x20, 0x10, 0x06]);
        memory.load(0x0610, &[0x60]);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), 0x0610);
        assert_eq!(memory.read(0x01FD), 0x06);
        assert_eq!(memory.read(0x01FC), 0x02);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), ORIGIN + 3);
        assert_eq!(cpu.registers().sp, 0xFD);
    }

    #[test]
    fn test_rts_to_sentinel() {
        let (mut cpu, mut memory) = setup(&[0x60]);
        memory.write(0x01FE, 0xFE);
        memory.write(0x01FF, 0xFF);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), RETURN_SENTINEL);
        assert!(cpu.is_return_sentinel(cpu.pc()));
    }

    #[test]
    fn test_jmp_indirect_page_wrap() {
        // JMP ($02FF) reads the high byte from $0200
        let (mut cpu, mut memory) = setup(&[0x6C, 0xFF, 0x02]);
        memory.write(0x02FF, 0x34);
        memory.write(0x0200, 0x12);
        memory.write(0x0300, 0x99);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), 0x1234);
    }

    #[test]
    fn test_brk_rti() {
        let (mut cpu, mut memory) = setup(&[0x00, 0xEA, 0xEA]);
        memory.load(IRQ_VECTOR, &[0x00, 0x07]);
        memory.load(0x0700, &[0x40]);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), 0x0700);
        assert!(cpu.registers().flag(FLAG_INTERRUPT));
        assert_eq!(memory.read(0x01FB) & FLAG_BREAK, FLAG_BREAK);
        run(&mut cpu, &mut memory, 1);
        assert_eq!(cpu.pc(), ORIGIN + 2);
        assert!(!cpu.registers().flag(FLAG_BREAK));
    }

    #[test]
    fn test_php_plp() {
        // SEC; PHP; CLC; PLP
        let (mut cpu, mut memory) = setup(&[0x38, 0x08, 0x18, 0x28]);
        run(&mut cpu, &mut memory, 4);
        assert!(cpu.registers().flag(FLAG_CARRY));
        assert!(!cpu.registers().flag(FLAG_BREAK));
        assert!(cpu.registers().flag(FLAG_UNUSED));
    }

    #[test]
    fn test_zero_page_index_wraps() {
        // LDX #$10; LDA #$AA; STA $F8,X
        let (mut cpu, mut memory) = setup(&[0xA2, 0x10, 0xA9, 0xAA, 0x95, 0xF8]);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(memory.read(0x0008), 0xAA);
        assert_eq!(memory.read(0x0108), 0x00);
    }

    #[test]
    fn test_indirect_indexed() {
        // LDY #$02; LDA ($40),Y
        let (mut cpu, mut memory) = setup(&[0xA0, 0x02, 0xB1, 0x40]);
        memory.load(0x0040, &[0x00, 0x30]);
        memory.write(0x3002, 0x77);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(cpu.registers().a, 0x77);
    }

    #[test]
    fn test_unsupported_opcode() {
        let (mut cpu, mut memory) = setup(&[0x02]);
        let err = cpu.step(&mut memory).unwrap_err();
        assert_eq!(
            err,
            CpuError::UnsupportedOpcode {
                opcode: 0x02,
                pc: ORIGIN
            }
        );
        assert_eq!(cpu.pc(), ORIGIN);
    }

    #[test]
    fn test_lax_sax() {
        // LAX $40; SAX $41 (after LDA #$0F)
        let (mut cpu, mut memory) = setup(&[0xA7, 0x40, 0xA9, 0x0F, 0x87, 0x41]);
        memory.write(0x40, 0x3C);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(cpu.registers().x, 0x3C);
        assert_eq!(memory.read(0x41), 0x0C);
    }

    #[test]
    fn test_dcp_compares_decremented_value() {
        // LDA #$10; DCP $50
        let (mut cpu, mut memory) = setup(&[0xA9, 0x10, 0xC7, 0x50]);
        memory.write(0x50, 0x11);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(memory.read(0x50), 0x10);
        assert!(cpu.registers().flag(FLAG_ZERO));
        assert!(cpu.registers().flag(FLAG_CARRY));
    }

    #[test]
    fn test_isc_subtracts_incremented_value() {
        // SEC; LDA #$10; ISC $50
        let (mut cpu, mut memory) = setup(&[0x38, 0xA9, 0x10, 0xE7, 0x50]);
        memory.write(0x50, 0x01);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(memory.read(0x50), 0x02);
        assert_eq!(cpu.registers().a, 0x0E);
    }

    #[test]
    fn test_slo_and_rra() {
        // LDA #$01; SLO $60; CLC; RRA $61
        let (mut cpu, mut memory) = setup(&[0xA9, 0x01, 0x07, 0x60, 0x18, 0x67, 0x61]);
        memory.write(0x60, 0x40);
        memory.write(0x61, 0x04);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(memory.read(0x60), 0x80);
        assert_eq!(cpu.registers().a, 0x81);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(memory.read(0x61), 0x02);
        assert_eq!(cpu.registers().a, 0x83);
    }

    #[test]
    fn test_immediate_combined_ops() {
        // LDA #$FF; ANC #$8F; LDX #$0F; SBX #$03
        let (mut cpu, mut memory) = setup(&[0xA9, 0xFF, 0x0B, 0x8F, 0xA2, 0x0F, 0xCB, 0x03]);
        run(&mut cpu, &mut memory, 2);
        assert_eq!(cpu.registers().a, 0x8F);
        assert!(cpu.registers().flag(FLAG_CARRY));
        run(&mut cpu, &mut memory, 2);
        assert_eq!(cpu.registers().x, 0x0C);
        assert!(cpu.registers().flag(FLAG_CARRY));

        // SEC; LDA #$FF; ARR #$C0
        let (mut cpu, mut memory) = setup(&[0x38, 0xA9, 0xFF, 0x6B, 0xC0]);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(cpu.registers().a, 0xE0);
        assert!(cpu.registers().flag(FLAG_CARRY));
        assert!(!cpu.registers().flag(FLAG_OVERFLOW));
    }

    #[test]
    fn test_undocumented_nop_skips_operand() {
        // NOP $1234,X; NOP #$55; LDA #$01
        let (mut cpu, mut memory) = setup(&[0xFC, 0x34, 0x12, 0x80, 0x55, 0xA9, 0x01]);
        run(&mut cpu, &mut memory, 3);
        assert_eq!(cpu.pc(), ORIGIN + 7);
        assert_eq!(cpu.registers().a, 0x01);
    }

    #[test]
    fn test_reset_reads_vector() {
        let mut memory = FlatMemory::new();
        memory.load(RESET_VECTOR, &[0x00, 0xC0]);
        let mut cpu = Mos6502::new();
        cpu.registers_mut().a = 0x55;
        cpu.reset(&mut memory);
        assert_eq!(cpu.pc(), 0xC000);
        assert_eq!(cpu.registers().a, 0);
        assert_eq!(cpu.registers().sp, 0xFD);
    }
}
