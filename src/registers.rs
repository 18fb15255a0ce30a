use crate::memory::{mask, TypeAddr};

pub const FLAG: u8 = 0xF;

pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[(reg_num & 0xF) as usize] = value;
    }

    // 7XNN: no carry into VF
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let total = self.get(reg_num).wrapping_add(value);
        self.set_register(reg_num, total);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[(reg_num & 0xF) as usize]
    }

    /// VF, read as the carry/borrow/collision flag.
    pub fn flag(&self) -> u8 {
        self.get(FLAG)
    }

    pub fn set_flag(&mut self, set: bool) {
        self.set_register(FLAG, set as u8);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.registers
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = mask(self.0.wrapping_add(2));
    }

    pub fn decrement(&mut self) {
        self.0 = mask(self.0.wrapping_sub(2));
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = mask(addr);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = mask(addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_register_wraps_without_flag() {
        let mut regs = Registers::new();
        regs.set_register(0x3, 0xFF);
        regs.add_to_register(0x3, 0x02);
        assert_eq!(regs.get(0x3), 0x01);
        assert_eq!(regs.flag(), 0);
    }

    #[test]
    fn flag_aliases_vf() {
        let mut regs = Registers::new();
        regs.set_flag(true);
        assert_eq!(regs.get(0xF), 1);
        regs.set_register(0xF, 0x42);
        assert_eq!(regs.flag(), 0x42);
    }

    #[test]
    fn pc_wraps_both_ways() {
        let mut pc = ProgramCounter(0xFFE);
        pc.increment();
        assert_eq!(pc.0, 0x000);
        pc.decrement();
        assert_eq!(pc.0, 0xFFE);
        pc.set_addr(0x1234);
        assert_eq!(pc.0, 0x234);
    }
}
