use std::{fs, path::Path};

use log::debug;

use crate::error::{Fault, LoadError};
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const ADDR_MASK: TypeAddr = 0x0FFF;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

// glyphs live at the very bottom of the reserved area so FX29 is just VX * 5
pub const FONT_BASE: TypeAddr = 0x000;
pub const GLYPH_HEIGHT: TypeAddr = 5;

pub const STACK_CAPACITY: usize = 16;

type FontBytes = [u8; 5 * 16];

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Wraps an address into the 12-bit space.
pub fn mask(addr: TypeAddr) -> TypeAddr {
    addr & ADDR_MASK
}

pub struct Memory {
    // 4k bytes
    // font data stored from 000 -> 04F, programs from 200 onwards
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = FONT_BASE as usize;
        bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);

        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        }
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[mask(addr) as usize] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[mask(addr) as usize]
    }

    /// Reads `len` bytes starting at `addr`, wrapping past 0xFFF.
    pub fn read(&self, addr: TypeAddr, len: usize) -> Vec<u8> {
        (0..len as TypeAddr)
            .map(|offset| self.get(addr.wrapping_add(offset)))
            .collect()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Big-endian word at the program counter; advances it past the word.
    pub fn next_instruction(&mut self) -> u16 {
        let (l, r) = (self.get(self.pc.0), self.get(self.pc.0.wrapping_add(1)));
        self.pc.increment();
        ((l as u16) << 8) | r as u16
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    // copies the program image verbatim to 0x200
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: bytes.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
        debug!("loaded {} byte program at {:#05x}", bytes.len(), start);
        Ok(())
    }

    pub fn load_rom_by_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let program = fs::read(path)?;
        self.load_rom(program.as_slice())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Stack {
    addresses: [TypeAddr; STACK_CAPACITY],
    depth: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_CAPACITY],
            depth: 0,
        }
    }

    /// Pushes a return address. `pc` is the caller's address for reporting.
    pub fn push(&mut self, addr: TypeAddr, pc: TypeAddr) -> Result<(), Fault> {
        if self.depth == STACK_CAPACITY {
            return Err(Fault::StackOverflow { pc });
        }
        self.addresses[self.depth] = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: TypeAddr) -> Result<TypeAddr, Fault> {
        if self.depth == 0 {
            return Err(Fault::StackUnderflow { pc });
        }
        self.depth -= 1;
        Ok(self.addresses[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
