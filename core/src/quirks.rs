/// # Quirks
/// Behaviors that differ between historical Chip-8 interpreters.
///
/// The default matches what most modern ROMs expect.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift Vy into Vx (COSMAC VIP) instead of shifting Vx in place.
    pub shift_uses_vy: bool,
    /// `Fx55`/`Fx65` leave I pointing just past the last register transferred.
    pub load_store_increments_i: bool,
}

impl Quirks {
    /// The behavior of the original COSMAC VIP interpreter.
    pub fn cosmac() -> Self {
        Quirks {
            shift_uses_vy: true,
            load_store_increments_i: true,
        }
    }
}
