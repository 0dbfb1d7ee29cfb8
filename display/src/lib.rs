pub use audio::Beeper;
pub use display::Display;

mod audio;
mod display;
