use std::fmt;

use crate::constants::{PROGRAM_START, STACK_DEPTH};
use crate::error::Fault;
use crate::framebuffer::Framebuffer;
use crate::memory::Memory;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz by whoever drives the clock
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
/// - 64x32 frame buffer
///
/// ## Input
/// - Emulation halts while `key_wait` is set, until a key is pressed
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: Memory,
    pub frame_buffer: Framebuffer,
    pub key_wait: Option<KeyWait>,
}

/// An `Fx0A` that hasn't been satisfied yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyWait {
    /// Register that receives the key.
    pub register: u8,
    /// First key pressed since the wait began.
    pub key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory: Memory::new(),
            frame_buffer: Framebuffer::new(),
            key_wait: None,
        }
    }

    /// The return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    /// `at` is the address of the call instruction, used for reporting.
    pub(crate) fn push(&mut self, ret: u16, at: u16, target: u16) -> Result<(), Fault> {
        let slot = self
            .stack
            .get_mut(self.sp as usize)
            .ok_or(Fault::StackOverflow { pc: at, target })?;
        *slot = ret;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self, at: u16) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow { pc: at });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    pub(crate) fn decrement_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Register dump, e.g. for diagnosing a fault.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PC={:#06X} I={:#06X} SP={} DT={} ST={}",
            self.pc, self.i, self.sp, self.delay_timer, self.sound_timer
        )?;
        for (row, registers) in self.v.chunks(8).enumerate() {
            let line: Vec<String> = registers
                .iter()
                .enumerate()
                .map(|(n, value)| format!("V{:X}={:02X}", row * 8 + n, value))
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        let stack: Vec<String> = self.stack().iter().map(|a| format!("{:#06X}", a)).collect();
        write!(f, "stack=[{}]", stack.join(", "))?;
        if let Some(wait) = self.key_wait {
            write!(f, " awaiting key for V{:X}", wait.register)?;
        }
        Ok(())
    }
}
