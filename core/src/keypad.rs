use std::fmt;

use log::warn;

use crate::constants::KEY_COUNT;

/// # Keypad
/// The pressed state of the 16 hexadecimal keys.
///
/// Only the input backend writes to the keypad; the CPU only ever reads it.
#[derive(Copy, Clone, Default)]
pub struct Keypad {
    pressed: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad {
            pressed: [false; KEY_COUNT],
        }
    }

    /// Set the pressed status of a key
    ///
    /// # Arguments
    /// * `key` the index of the key, 0x0..=0xF
    /// * `pressed` whether it is now held down
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.pressed.get_mut(key as usize) {
            Some(state) => *state = pressed,
            None => warn!("ignoring state change for nonexistent key {:#04X}", key),
        }
    }

    /// Whether `key` is held down. Keys past 0xF are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed.get(key as usize).copied().unwrap_or(false)
    }

    /// The lowest numbered key currently held down, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.pressed.iter().position(|&p| p).map(|key| key as u8)
    }

    pub fn release_all(&mut self) {
        self.pressed = [false; KEY_COUNT];
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.pressed
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(key, _)| key as u8)
    }
}

impl fmt::Debug for Keypad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let keys: String = self.pressed_keys().map(|k| format!("{:X}", k)).collect();
        write!(f, "Keypad(pressed={:?})", keys)
    }
}
