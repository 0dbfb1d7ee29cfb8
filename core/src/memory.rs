use crate::constants::{MEMORY_SIZE, SPRITE_SHEET, SPRITE_SHEET_START};
use crate::error::Fault;

/// # Memory
/// 4096 bytes of byte-addressable RAM.
///
/// - `0x000..0x050` holds the hexadecimal sprite sheet
/// - `0x050..0x200` is otherwise reserved
/// - `0x200..` is where ROMs are loaded
///
/// Every access is bounds checked; multi-byte accesses validate the whole range before touching
/// anything so a failing instruction never leaves memory half written.
#[derive(Copy, Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = SPRITE_SHEET_START as usize;
        bytes[start..start + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory { bytes }
    }

    pub fn read8(&self, addr: u16) -> Result<u8, Fault> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Fault::AddressFault { addr: addr as usize })
    }

    pub fn write8(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        let byte = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(Fault::AddressFault { addr: addr as usize })?;
        *byte = value;
        Ok(())
    }

    /// Reads the big-endian word at `addr` and `addr + 1`.
    pub fn read16(&self, addr: u16) -> Result<u16, Fault> {
        let word = self.slice(addr, 2)?;
        Ok(u16::from(word[0]) << 8 | u16::from(word[1]))
    }

    /// Borrows `len` bytes starting at `addr`.
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        let range = self.range(addr, len)?;
        Ok(&self.bytes[range])
    }

    /// Copies `data` into memory starting at `addr`.
    pub fn write_slice(&mut self, addr: u16, data: &[u8]) -> Result<(), Fault> {
        let range = self.range(addr, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Bulk copy used by the loader.
    pub fn load(&mut self, offset: u16, data: &[u8]) -> Result<(), Fault> {
        self.write_slice(offset, data)
    }

    fn range(&self, addr: u16, len: usize) -> Result<std::ops::Range<usize>, Fault> {
        let start = addr as usize;
        let end = start + len;
        if end > self.bytes.len() {
            // Report the first byte that falls outside memory.
            return Err(Fault::AddressFault {
                addr: start.max(self.bytes.len()),
            });
        }
        Ok(start..end)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
