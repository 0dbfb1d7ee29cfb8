use thiserror::Error;

/// Everything that can go wrong while loading or running a Chip-8 program.
///
/// None of these are transient: a fault means either the ROM is malformed or the interpreter
/// has a bug, so the session should be stopped (or reset) rather than retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("memory access out of bounds at {addr:#06X}")]
    AddressFault { addr: usize },

    #[error("stack overflow calling {target:#05X} from {pc:#06X}")]
    StackOverflow { pc: u16, target: u16 },

    #[error("stack underflow returning from {pc:#06X}")]
    StackUnderflow { pc: u16 },

    #[error("invalid opcode {opcode:#06X} at {pc:#06X}")]
    InvalidOpcode { opcode: u16, pc: u16 },

    #[error("ROM is {size} bytes but only {capacity} bytes are available")]
    RomTooLarge { size: usize, capacity: usize },
}
