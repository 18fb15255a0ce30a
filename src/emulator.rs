use std::path::Path;

use log::{error, info, trace, warn};

use crate::{
    decode::{Instruction, OpCodes},
    display::FrameBuffer,
    error::{Fault, LoadError},
    keyboard::{Keypad, KEY_COUNT},
    memory::{mask, Memory, TypeAddr, FONT_BASE, GLYPH_HEIGHT},
    registers::Registers,
    rng::{RandomSource, ThreadRandom},
    timer::Timers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Halted,
}

/// Progress of an FX0A key wait across repeated executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    Idle,
    // keys already down when the wait began, minus those released since
    Waiting { held: [bool; KEY_COUNT] },
    Captured(u8),
}

pub struct Emulator {
    pub fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub timers: Timers,
    pub keypad: Keypad,
    current: Instruction,
    run_state: RunState,
    key_wait: KeyWait,
    rng: Box<dyn RandomSource>,
    fault: Option<Fault>,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_rng(Box::new(ThreadRandom::new()))
    }

    pub fn with_rng(rng: Box<dyn RandomSource>) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            timers: Timers::new(),
            keypad: Keypad::new(),
            current: Instruction::default(),
            run_state: RunState::Running,
            key_wait: KeyWait::Idle,
            rng,
            fault: None,
        }
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.mem.load_rom(rom)
    }

    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.mem.load_rom_by_file(path)
    }

    pub fn fetch_decode(&mut self) -> OpCodes {
        self.current = Instruction::new(self.mem.next_instruction());
        OpCodes::decode(&self.current)
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<(), Fault> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::PopSubroutine => {
                let addr = self.mem.stack.pop(self.caller_pc())?;
                self.mem.set_pc(addr);
            }
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => {
                // pc already points past the call
                self.mem.stack.push(self.mem.pc.0, self.caller_pc())?;
                self.mem.set_pc(addr);
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                self.skip_if(self.regs.get(vx) == nn);
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                self.skip_if(self.regs.get(vx) != nn);
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) == self.regs.get(vy));
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) != self.regs.get(vy));
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            // 8XY4 writes the flag after the sum; the subtracts and shifts
            // write it first and then operate on the (possibly aliased) VX/VY
            OpCodes::Add(vx, vy) => {
                let (z, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_register(vx, z);
                self.regs.set_flag(carry);
            }
            OpCodes::SubtractForward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vx) > self.regs.get(vy)); // no borrow
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, x.wrapping_sub(y));
            }
            OpCodes::SubtractBackward(vx, vy) => {
                self.regs.set_flag(self.regs.get(vy) > self.regs.get(vx)); // no borrow
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, y.wrapping_sub(x));
            }
            OpCodes::RightShift(vx, _) => {
                self.regs.set_flag(self.regs.get(vx) & 1 == 1);
                self.regs.set_register(vx, self.regs.get(vx) >> 1);
            }
            OpCodes::LeftShift(vx, _) => {
                self.regs.set_flag(self.regs.get(vx) >> 7 == 1);
                self.regs.set_register(vx, self.regs.get(vx) << 1);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem
                    .set_pc(addr.wrapping_add(self.regs.get(0) as TypeAddr));
            }
            OpCodes::Random(vx, nn) => {
                let byte = self.rng.next_byte();
                self.regs.set_register(vx, byte & nn);
            }
            OpCodes::Display(vx, vy, height) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let sprite = self.mem.read(self.mem.index.0, height as usize);
                let collision = self.fb.paint(x, y, &sprite);
                self.regs.set_flag(collision);
            }
            OpCodes::SkipIfPressed(vx) => {
                self.skip_if(self.keypad.is_pressed(self.regs.get(vx)));
            }
            OpCodes::SkipIfNotPressed(vx) => {
                self.skip_if(!self.keypad.is_pressed(self.regs.get(vx)));
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.timers.delay),
            OpCodes::GetKey(vx) => self.wait_for_key(vx),
            OpCodes::CopyRegisterToDelay(vx) => self.timers.delay = self.regs.get(vx),
            OpCodes::CopyRegisterToSound(vx) => self.timers.sound = self.regs.get(vx),
            OpCodes::AddToIndex(vx) => {
                self.mem
                    .set_index(self.mem.index.0.wrapping_add(self.regs.get(vx) as TypeAddr));
            }
            OpCodes::PointChar(vx) => {
                let glyph = self.regs.get(vx) as TypeAddr;
                self.mem.set_index(FONT_BASE + glyph * GLYPH_HEIGHT);
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, value / 10 % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem
                        .set(self.mem.index.0.wrapping_add(i as TypeAddr), digit);
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.regs.get(reg);
                    self.mem
                        .set(self.mem.index.0.wrapping_add(reg as TypeAddr), reg_val);
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.mem.index.0.wrapping_add(reg as TypeAddr));
                    self.regs.set_register(reg, reg_val);
                }
            }
            OpCodes::Unknown(raw) => {
                warn!("unknown instruction {:04X} at {:#05X}", raw, self.caller_pc());
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.mem.pc.increment();
        }
    }

    // address of the instruction being executed
    fn caller_pc(&self) -> TypeAddr {
        mask(self.mem.pc.0.wrapping_sub(2))
    }

    fn wait_for_key(&mut self, vx: u8) {
        let pressed = self.keypad.as_array();
        match self.key_wait {
            KeyWait::Waiting { mut held } => {
                for (h, p) in held.iter_mut().zip(pressed) {
                    *h &= p;
                }
                let fresh = (0..KEY_COUNT).find(|&k| pressed[k] && !held[k]);
                if let Some(key) = fresh {
                    self.regs.set_register(vx, key as u8);
                    self.key_wait = KeyWait::Captured(key as u8);
                } else {
                    self.key_wait = KeyWait::Waiting { held };
                    self.mem.pc.decrement();
                }
            }
            KeyWait::Idle | KeyWait::Captured(_) => {
                self.key_wait = KeyWait::Waiting { held: pressed };
                self.mem.pc.decrement();
            }
        }
    }

    /// Executes exactly one fetch/decode/execute cycle while running.
    pub fn tick(&mut self) {
        if self.run_state != RunState::Running {
            return;
        }
        let operation = self.fetch_decode();
        trace!("{:#05X}: {:04X} {:?}", self.caller_pc(), self.current.raw, operation);
        if let Err(fault) = self.execute_ins(operation) {
            error!("{fault}");
            self.fault = Some(fault);
            self.run_state = RunState::Halted;
        }
    }

    /// Executes up to `n` instructions, stopping early if the machine
    /// leaves the running state.
    pub fn run(&mut self, n: u32) {
        for _ in 0..n {
            if self.run_state != RunState::Running {
                break;
            }
            self.tick();
        }
    }

    pub fn sync_timers(&mut self) {
        self.timers.tick();
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn current_instruction(&self) -> Instruction {
        self.current
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state != RunState::Halted
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn toggle_pause(&mut self) {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Halted => RunState::Halted,
        };
        info!("run state is now {:?}", self.run_state);
    }

    pub fn quit(&mut self) {
        self.run_state = RunState::Halted;
        info!("halted on request");
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
