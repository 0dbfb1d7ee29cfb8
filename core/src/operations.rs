use log::trace;
use rand::Rng;

use crate::constants::{ADDRESS_MASK, GLYPH_HEIGHT, SPRITE_SHEET_START};
use crate::error::Fault;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::quirks::Quirks;
use crate::state::{KeyWait, State};

const VF: u8 = 0xF;

impl State {
    /// Fetches the opcode at PC, decodes it, bumps PC past it and executes it.
    ///
    /// Returns the instruction that ran. On error the state may be partially updated, so callers
    /// that need atomicity should cycle a copy.
    pub fn cycle<R: Rng + ?Sized>(
        &mut self,
        keypad: &Keypad,
        rng: &mut R,
        quirks: Quirks,
    ) -> Result<Instruction, Fault> {
        let at = self.pc;
        let op = Opcode(self.memory.read16(at)?);
        let instruction = Instruction::decode(op).ok_or(Fault::InvalidOpcode {
            opcode: op.0,
            pc: at,
        })?;
        trace!("{:#06X}: {} {}", at, op, instruction);

        self.pc = at.wrapping_add(2);
        self.execute(instruction, at, keypad, rng, quirks)?;
        Ok(instruction)
    }

    /// Applies `instruction`, which was fetched from `at`. PC has already been bumped.
    fn execute<R: Rng + ?Sized>(
        &mut self,
        instruction: Instruction,
        at: u16,
        keypad: &Keypad,
        rng: &mut R,
        quirks: Quirks,
    ) -> Result<(), Fault> {
        use Instruction::*;

        match instruction {
            Clear => self.frame_buffer.clear(),
            Return => self.pc = self.pop(at)?,
            Jump(addr) => self.pc = addr,
            Call(addr) => {
                self.push(self.pc, at, addr)?;
                self.pc = addr;
            }
            SkipEqImm { x, kk } => self.skip_if(self.vx(x) == kk),
            SkipNeImm { x, kk } => self.skip_if(self.vx(x) != kk),
            SkipEqReg { x, y } => self.skip_if(self.vx(x) == self.vx(y)),
            SkipNeReg { x, y } => self.skip_if(self.vx(x) != self.vx(y)),
            LoadImm { x, kk } => self.set_v(x, kk),
            // no carry flag for immediates
            AddImm { x, kk } => self.set_v(x, self.vx(x).wrapping_add(kk)),
            Move { x, y } => self.set_v(x, self.vx(y)),
            Or { x, y } => self.set_v(x, self.vx(x) | self.vx(y)),
            And { x, y } => self.set_v(x, self.vx(x) & self.vx(y)),
            Xor { x, y } => self.set_v(x, self.vx(x) ^ self.vx(y)),
            AddReg { x, y } => {
                let (res, carry) = self.vx(x).overflowing_add(self.vx(y));
                self.set_with_flag(x, res, carry);
            }
            Sub { x, y } => {
                let (a, b) = (self.vx(x), self.vx(y));
                self.set_with_flag(x, a.wrapping_sub(b), a >= b);
            }
            SubN { x, y } => {
                let (a, b) = (self.vx(x), self.vx(y));
                self.set_with_flag(x, b.wrapping_sub(a), b >= a);
            }
            ShiftRight { x, y } => {
                let src = if quirks.shift_uses_vy { self.vx(y) } else { self.vx(x) };
                self.set_with_flag(x, src >> 1, src & 0x1 == 0x1);
            }
            ShiftLeft { x, y } => {
                let src = if quirks.shift_uses_vy { self.vx(y) } else { self.vx(x) };
                self.set_with_flag(x, src << 1, src & 0x80 == 0x80);
            }
            LoadI(addr) => self.i = addr,
            JumpV0(addr) => self.pc = addr + u16::from(self.v[0x0]),
            Random { x, kk } => self.set_v(x, rng.gen::<u8>() & kk),
            Draw { x, y, n } => {
                let (px, py) = (usize::from(self.vx(x)), usize::from(self.vx(y)));
                let rows = self.memory.slice(self.i, usize::from(n))?;
                let collided = self.frame_buffer.draw_sprite(px, py, rows);
                self.set_v(VF, collided as u8);
            }
            SkipKey { x } => self.skip_if(keypad.is_pressed(self.vx(x))),
            SkipNoKey { x } => self.skip_if(!keypad.is_pressed(self.vx(x))),
            LoadDelay { x } => self.set_v(x, self.delay_timer),
            WaitKey { x } => {
                // Stay on this instruction until a key arrives.
                self.key_wait = Some(KeyWait {
                    register: x,
                    key: None,
                });
                self.pc = at;
            }
            SetDelay { x } => self.delay_timer = self.vx(x),
            SetSound { x } => self.sound_timer = self.vx(x),
            AddI { x } => self.i = self.i.wrapping_add(u16::from(self.vx(x))) & ADDRESS_MASK,
            LoadGlyph { x } => {
                self.i = SPRITE_SHEET_START + u16::from(self.vx(x) & 0xF) * GLYPH_HEIGHT
            }
            StoreBcd { x } => {
                let value = self.vx(x);
                let bcd = [value / 100, value / 10 % 10, value % 10];
                self.memory.write_slice(self.i, &bcd)?;
            }
            StoreRegs { x } => {
                let count = usize::from(x) + 1;
                self.memory.write_slice(self.i, &self.v[..count])?;
                if quirks.load_store_increments_i {
                    self.i = self.i.wrapping_add(count as u16) & ADDRESS_MASK;
                }
            }
            LoadRegs { x } => {
                let count = usize::from(x) + 1;
                let bytes = self.memory.slice(self.i, count)?;
                self.v[..count].copy_from_slice(bytes);
                if quirks.load_store_increments_i {
                    self.i = self.i.wrapping_add(count as u16) & ADDRESS_MASK;
                }
            }
        }
        Ok(())
    }

    /// Completes a pending `Fx0A` once a key has been pressed.
    ///
    /// Returns whether the wait is over.
    pub(crate) fn resolve_key_wait(&mut self) -> bool {
        match self.key_wait {
            Some(KeyWait {
                register,
                key: Some(key),
            }) => {
                self.set_v(register, key);
                self.key_wait = None;
                self.pc = self.pc.wrapping_add(2);
                true
            }
            _ => false,
        }
    }

    fn vx(&self, x: u8) -> u8 {
        self.v[usize::from(x)]
    }

    fn set_v(&mut self, x: u8, value: u8) {
        self.v[usize::from(x)] = value;
    }

    /// The flag is written last so it wins when `x` is VF.
    fn set_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.set_v(x, value);
        self.set_v(VF, flag as u8);
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}
