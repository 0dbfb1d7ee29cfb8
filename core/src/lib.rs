pub use chip8::Chip8;
pub use clock::Clock;
pub use constants::{CLOCK_SPEED, TIMER_HZ};
pub use error::Fault;
pub use framebuffer::{Framebuffer, Pixels};
pub use instruction::Instruction;
pub use keypad::Keypad;
pub use memory::Memory;
pub use opcode::Opcode;
pub use quirks::Quirks;

mod chip8;
mod clock;
pub mod constants;
mod error;
mod framebuffer;
mod instruction;
mod keypad;
mod memory;
mod opcode;
mod operations;
mod quirks;
pub mod state;
