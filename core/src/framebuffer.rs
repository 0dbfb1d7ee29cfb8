use std::fmt;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Raw pixel grid indexed as `[y][x]`; each cell is 1 (on) or 0 (off).
pub type Pixels = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

const PIXEL_ON: char = '\u{2588}';
const PIXEL_OFF: char = ' ';

/// # Frame Buffer
/// The 64x32 monochrome screen.
///
/// Sprites are XORed onto the grid. Coordinates wrap around both edges rather than clipping, and
/// any lit pixel that a sprite turns off counts as a collision.
///
/// `dirty` is raised by every mutation and lowered by whoever renders the frame, so a display only
/// needs to redraw when something actually changed.
#[derive(Copy, Clone)]
pub struct Framebuffer {
    pixels: Pixels,
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XORs `rows` onto the grid with its top left corner at `x`, `y`.
    ///
    /// Each byte is one 8 pixel wide row, most significant bit leftmost.
    /// Returns whether any pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collided = false;
        for (row, byte) in rows.iter().enumerate() {
            let py = (y + row) % DISPLAY_HEIGHT;
            for bit in 0..8 {
                let pixel = (byte >> (7 - bit)) & 0x1;
                if pixel == 0 {
                    continue;
                }
                let px = (x + bit) % DISPLAY_WIDTH;
                collided |= self.pixels[py][px] == 0x1;
                self.pixels[py][px] ^= pixel;
            }
        }
        self.dirty = true;
        collided
    }

    /// Whether the pixel at `x`, `y` is on. Coordinates wrap like they do when drawing.
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH] == 0x1
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next `take_dirty` to report a change.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the frame changed since the last call and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One line of text per row, lit pixels drawn as full blocks.
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (y, row) in self.pixels.iter().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            let line: String = row
                .iter()
                .map(|&p| if p == 0x1 { PIXEL_ON } else { PIXEL_OFF })
                .collect();
            f.write_str(&line)?;
        }
        Ok(())
    }
}
