/// Width of the Chip-8 display in pixels.
pub const DISPLAY_WIDTH: usize = 64;

/// Height of the Chip-8 display in pixels.
pub const DISPLAY_HEIGHT: usize = 32;

/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// ROMs are loaded into memory starting at this address.
pub const PROGRAM_START: u16 = 0x200;

/// I is a 12-bit register; arithmetic on it wraps within the address space.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Maximum number of nested subroutine calls.
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad.
pub const KEY_COUNT: usize = 16;

/// Rate at which the delay and sound timers decay.
pub const TIMER_HZ: u32 = 60;

/// Default instruction rate in Hz.
pub const CLOCK_SPEED: u32 = 960;

/// How many past states are kept around for rewinding.
pub const MAX_SAVED_STATES: usize = 600;

/// Each glyph in the sprite sheet is 5 rows tall.
pub const GLYPH_HEIGHT: u16 = 5;

/// Address of the first glyph in the sprite sheet.
pub const SPRITE_SHEET_START: u16 = 0x000;

/// # Sprite Sheet
/// Hexadecimal digits 0..F as 4x5 sprites, stored in the reserved region below `PROGRAM_START`.
///
/// ```text
/// 0xF0 -> 1111
/// 0x90 -> 1001
/// 0x90 -> 1001
/// 0x90 -> 1001
/// 0xF0 -> 1111
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
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
