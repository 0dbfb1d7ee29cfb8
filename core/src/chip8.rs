use std::collections::VecDeque;
use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::constants::{MAX_SAVED_STATES, MEMORY_SIZE, PROGRAM_START};
use crate::error::Fault;
use crate::framebuffer::Framebuffer;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::quirks::Quirks;
use crate::state::State;

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the `keypad` with public interfaces for manipulating it
///  - the random source used by `Cxkk`
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// `step` and `tick_timers` are deliberately separate: the caller runs instructions at whatever
/// rate it likes and ticks the timers at 60Hz.
pub struct Chip8<R = StdRng> {
    state: State,
    previous_states: VecDeque<State>,
    keypad: Keypad,
    rng: R,
    quirks: Quirks,
}

impl Chip8<StdRng> {
    /// A machine whose random numbers are seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `Cxkk` results are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> Chip8<R> {
    pub fn with_rng(rng: R) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::new(),
            keypad: Keypad::new(),
            rng,
            quirks: Quirks::default(),
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Copies a program into memory at `PROGRAM_START`.
    ///
    /// # Arguments
    /// * `rom` the raw program image
    pub fn load_program(&mut self, rom: &[u8]) -> Result<(), Fault> {
        let capacity = MEMORY_SIZE - PROGRAM_START as usize;
        if rom.len() > capacity {
            return Err(Fault::RomTooLarge {
                size: rom.len(),
                capacity,
            });
        }
        self.state.memory.load(PROGRAM_START, rom)?;
        debug!("loaded {} byte program at {:#06X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Returns the machine to its power-on state. Memory is wiped, so the program must be
    /// loaded again.
    pub fn reset(&mut self) {
        self.state = State::new();
        self.previous_states.clear();
        self.keypad.release_all();
        debug!("reset");
    }

    /// Advances the CPU by a single instruction
    /// - completes a pending key wait instead if a key has arrived
    /// - does nothing while still awaiting a keypress
    /// - otherwise gets and executes the next opcode
    ///
    /// A failing instruction leaves the machine exactly as it was before the call.
    pub fn step(&mut self) -> Result<(), Fault> {
        if self.state.key_wait.is_some() {
            let before = self.state;
            if self.state.resolve_key_wait() {
                debug!("key wait satisfied, resuming at {:#06X}", self.state.pc);
                self.save_state(before);
            }
            return Ok(());
        }

        let mut next = self.state;
        let instruction = next.cycle(&self.keypad, &mut self.rng, self.quirks)?;
        if let Instruction::WaitKey { x } = instruction {
            debug!("awaiting key for V{:X}", x);
        }
        let before = std::mem::replace(&mut self.state, next);
        self.save_state(before);
        Ok(())
    }

    /// Decrements the delay and sound timers if they're above 0. Call at 60Hz.
    pub fn tick_timers(&mut self) {
        self.state.decrement_timers();
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key, 0x0..=0xF
    /// * `pressed` whether it went down or up
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad.set_key(key, pressed);
        if pressed && self.keypad.is_pressed(key) {
            if let Some(wait) = self.state.key_wait.as_mut() {
                wait.key.get_or_insert(key);
            }
        }
    }

    pub fn release_keys(&mut self) {
        self.keypad.release_all();
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Reverses the CPU by a single step if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = state;
                self.state.frame_buffer.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.previous_states.len()
    }

    /// Puts a state in previous_states
    /// - if there are already MAX_SAVED_STATES saved then the oldest is dropped
    fn save_state(&mut self, state: State) {
        if self.previous_states.len() == MAX_SAVED_STATES {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(state);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.frame_buffer
    }

    /// Returns the Framebuffer if the display should be redrawn
    pub fn take_frame(&mut self) -> Option<&Framebuffer> {
        if self.state.frame_buffer.take_dirty() {
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether a tone should currently be playing.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.state.key_wait.is_some()
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    pub fn index(&self) -> u16 {
        self.state.i
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn stack(&self) -> &[u16] {
        self.state.stack()
    }

    /// The instruction at PC, if it decodes.
    pub fn next_instruction(&self) -> Option<Instruction> {
        let word = self.state.memory.read16(self.state.pc).ok()?;
        Instruction::decode(word.into())
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Display for Chip8<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STACK_DEPTH;

    fn with_program(program: &[u16]) -> Chip8 {
        let rom: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut chip8 = Chip8::seeded(0);
        chip8.load_program(&rom).unwrap();
        chip8
    }

    #[test]
    fn test_add_program() {
        let mut chip8 = with_program(&[0x6A02, 0x6B03, 0x8AB4]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.registers()[0xA], 5);
        assert_eq!(chip8.registers()[0xF], 0);
        assert_eq!(chip8.pc(), PROGRAM_START + 6);
    }

    #[test]
    fn test_draw_twice_program() {
        // clear, point I at a 0xFF byte, draw it twice at (0, 0)
        let mut chip8 = with_program(&[0x00E0, 0xA20A, 0xD011, 0xD011, 0x1208, 0xFF00]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert!((0..8).all(|x| chip8.framebuffer().pixel_at(x, 0)));
        assert_eq!(chip8.registers()[0xF], 0);

        chip8.step().unwrap();
        assert!((0..8).all(|x| !chip8.framebuffer().pixel_at(x, 0)));
        assert_eq!(chip8.registers()[0xF], 1);
    }

    #[test]
    fn test_key_wait() {
        let mut chip8 = with_program(&[0xF30A, 0x1202]);
        for _ in 0..10 {
            chip8.step().unwrap();
            assert_eq!(chip8.pc(), PROGRAM_START);
            assert!(chip8.is_waiting_for_key());
        }
        chip8.set_key(5, true);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x3], 5);
        assert_eq!(chip8.pc(), PROGRAM_START + 2);
        assert!(!chip8.is_waiting_for_key());
    }

    #[test]
    fn test_key_wait_needs_a_new_press() {
        let mut chip8 = with_program(&[0xF30A]);
        chip8.set_key(0xA, true);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert!(chip8.is_waiting_for_key());

        chip8.set_key(0xA, false);
        chip8.set_key(0xA, true);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x3], 0xA);
    }

    #[test]
    fn test_key_wait_takes_first_press() {
        let mut chip8 = with_program(&[0xF00A]);
        chip8.step().unwrap();
        chip8.set_key(0x9, true);
        chip8.set_key(0x2, true);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x0], 0x9);
    }

    #[test]
    fn test_skip_key_reads_keypad() {
        let mut chip8 = with_program(&[0x6104, 0xE19E, 0x0000, 0x6201]);
        chip8.set_key(0x4, true);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), PROGRAM_START + 6);
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x2], 1);
    }

    #[test]
    fn test_released_keys_no_longer_skip() {
        let mut chip8 = with_program(&[0x6104, 0xE19E, 0x6201]);
        chip8.set_key(0x4, true);
        chip8.release_keys();
        assert!(!chip8.keypad().is_pressed(0x4));
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.pc(), PROGRAM_START + 4);
    }

    #[test]
    fn test_call_return_round_trip() {
        // each subroutine calls the next; the deepest one unwinds
        let mut program = Vec::new();
        for depth in 0..STACK_DEPTH as u16 {
            program.push(0x2000 | (PROGRAM_START + 4 * (depth + 1)));
            program.push(0x00EE);
        }
        program.push(0x00EE);
        let mut chip8 = with_program(&program);

        for depth in 1..=STACK_DEPTH {
            chip8.step().unwrap();
            assert_eq!(chip8.stack().len(), depth);
        }
        for depth in (0..STACK_DEPTH).rev() {
            chip8.step().unwrap();
            assert_eq!(chip8.stack().len(), depth);
            assert_eq!(chip8.pc(), PROGRAM_START + 4 * depth as u16 + 2);
        }
    }

    #[test]
    fn test_seventeenth_call_overflows() {
        // 0x2200 calls itself forever
        let mut chip8 = with_program(&[0x2200]);
        for _ in 0..STACK_DEPTH {
            chip8.step().unwrap();
        }
        assert_eq!(
            chip8.step(),
            Err(Fault::StackOverflow {
                pc: 0x200,
                target: 0x200
            })
        );
        assert_eq!(chip8.stack().len(), STACK_DEPTH);
    }

    #[test]
    fn test_fault_leaves_state_untouched() {
        let mut chip8 = with_program(&[0x6A02, 0xFFFF]);
        chip8.step().unwrap();
        assert_eq!(
            chip8.step(),
            Err(Fault::InvalidOpcode {
                opcode: 0xFFFF,
                pc: 0x202
            })
        );
        assert_eq!(chip8.pc(), 0x202);
        assert_eq!(chip8.history_len(), 1);
    }

    #[test]
    fn test_running_off_the_end_of_memory_faults() {
        let mut chip8 = with_program(&[0x1FFF]);
        chip8.step().unwrap();
        assert_eq!(chip8.step(), Err(Fault::AddressFault { addr: 0x1000 }));
    }

    #[test]
    fn test_rom_too_large() {
        let mut chip8 = Chip8::seeded(0);
        let rom = vec![0; MEMORY_SIZE - PROGRAM_START as usize + 1];
        assert_eq!(
            chip8.load_program(&rom),
            Err(Fault::RomTooLarge {
                size: 3585,
                capacity: 3584
            })
        );
        assert!(chip8.load_program(&rom[1..]).is_ok());
    }

    #[test]
    fn test_timers_tick_independently_of_steps() {
        let mut chip8 = with_program(&[0x6102, 0xF115, 0xF118, 0x1206]);
        for _ in 0..4 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.delay_timer(), 2);
        assert!(chip8.sound_active());

        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 1);
        assert_eq!(chip8.sound_timer(), 1);
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 0);
        assert!(!chip8.sound_active());
    }

    #[test]
    fn test_same_seed_same_random_numbers() {
        let program = [0xC0FF, 0xC1FF, 0xC2FF];
        let mut a = with_program(&program);
        let mut b = with_program(&program);
        for _ in 0..3 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.registers(), b.registers());
    }

    #[test]
    fn test_rewind() {
        let mut chip8 = with_program(&[0x6001, 0x6002]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x0], 2);

        assert!(chip8.rewind());
        assert_eq!(chip8.registers()[0x0], 1);
        assert_eq!(chip8.pc(), 0x202);
        assert!(chip8.rewind());
        assert_eq!(chip8.pc(), 0x200);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_drops_old_saved_states() {
        let mut chip8 = with_program(&[0x1200]);
        for _ in 0..MAX_SAVED_STATES + 1 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.history_len(), MAX_SAVED_STATES);
    }

    #[test]
    fn test_take_frame_only_when_changed() {
        let mut chip8 = with_program(&[0x00E0, 0x6000]);
        assert!(chip8.take_frame().is_none());
        chip8.step().unwrap();
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
        chip8.step().unwrap();
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_quirks_are_applied() {
        let rom: Vec<u8> = [0x6103u16, 0x8016]
            .iter()
            .flat_map(|w| w.to_be_bytes())
            .collect();
        let mut chip8 = Chip8::seeded(0).with_quirks(Quirks::cosmac());
        assert_eq!(chip8.quirks(), Quirks::cosmac());
        chip8.load_program(&rom).unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.registers()[0x0], 0x1);
        assert_eq!(chip8.registers()[0xF], 0x1);
    }

    #[test]
    fn test_reset() {
        let mut chip8 = with_program(&[0x6A02]);
        chip8.step().unwrap();
        chip8.set_key(0x1, true);
        chip8.reset();
        assert_eq!(chip8.pc(), PROGRAM_START);
        assert_eq!(chip8.registers()[0xA], 0);
        assert_eq!(chip8.history_len(), 0);
        assert_eq!(chip8.keypad().first_pressed(), None);
    }

    #[test]
    fn test_next_instruction() {
        let chip8 = with_program(&[0x6A02]);
        assert_eq!(
            chip8.next_instruction(),
            Some(Instruction::LoadImm { x: 0xA, kk: 0x02 })
        );
    }
}
