use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use chip8_core::{Chip8, Quirks, CLOCK_SPEED};

use session::Session;

mod keymap;
mod run;
mod session;
mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// SDL2 window with sound
    Sdl,
    /// Text rendering in the current terminal
    Terminal,
}

/// Chip-8 virtual machine
#[derive(Parser)]
#[command(name = "chip8", version)]
struct Args {
    /// Path of the ROM to run
    rom: PathBuf,

    /// Display/audio backend
    #[arg(long, value_enum, default_value_t = Backend::Sdl)]
    backend: Backend,

    /// Instructions executed per second
    #[arg(
        short,
        long,
        default_value_t = CLOCK_SPEED,
        value_parser = clap::value_parser!(u32).range(1..=1_000_000)
    )]
    clock: u32,

    /// Window size multiplier (sdl only)
    #[arg(
        short,
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    scale: u32,

    /// Seed for the random number instruction, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Shift Vy into Vx for 8xy6/8xyE instead of shifting Vx in place
    #[arg(long, default_value_t = false)]
    shift_vy: bool,

    /// Leave I past the last register after Fx55/Fx65
    #[arg(long, default_value_t = false)]
    load_store_increments_i: bool,

    /// Don't play the sound timer's tone
    #[arg(long, default_value_t = false)]
    mute: bool,
}

/// Frontend settings that aren't part of the machine itself.
pub struct Settings {
    pub scale: u32,
    pub mute: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("unable to read ROM {}", args.rom.display()))?;

    let quirks = Quirks {
        shift_uses_vy: args.shift_vy,
        load_store_increments_i: args.load_store_increments_i,
    };
    let chip8 = match args.seed {
        Some(seed) => Chip8::seeded(seed),
        None => Chip8::new(),
    };
    let mut chip8 = chip8.with_quirks(quirks);
    chip8
        .load_program(&rom)
        .with_context(|| format!("unable to load ROM {}", args.rom.display()))?;
    info!(
        "loaded {} ({} bytes), running at {}Hz on {:?}",
        args.rom.display(),
        rom.len(),
        args.clock,
        args.backend
    );
    info!("quirks: {:?}", chip8.quirks());

    let session = Session::new(chip8, args.clock, Instant::now());
    let settings = Settings {
        scale: args.scale,
        mute: args.mute,
    };
    match args.backend {
        Backend::Sdl => run::run(session, &settings),
        Backend::Terminal => terminal::run(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chip8", "pong.ch8"]).unwrap();
        assert_eq!(args.rom, PathBuf::from("pong.ch8"));
        assert_eq!(args.backend, Backend::Sdl);
        assert_eq!(args.clock, CLOCK_SPEED);
        assert_eq!(args.scale, 10);
        assert!(!args.shift_vy);
    }

    #[test]
    fn test_terminal_backend_with_quirks() {
        let args = Args::try_parse_from([
            "chip8",
            "--backend",
            "terminal",
            "--clock",
            "500",
            "--shift-vy",
            "--seed",
            "7",
            "pong.ch8",
        ])
        .unwrap();
        assert_eq!(args.backend, Backend::Terminal);
        assert_eq!(args.clock, 500);
        assert!(args.shift_vy);
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_clock_must_be_positive_and_bounded() {
        assert!(Args::try_parse_from(["chip8", "--clock", "0", "pong.ch8"]).is_err());
        assert!(Args::try_parse_from(["chip8", "--clock", "2000000000", "pong.ch8"]).is_err());
        let args = Args::try_parse_from(["chip8", "--clock", "1000000", "pong.ch8"]).unwrap();
        assert_eq!(args.clock, 1_000_000);
    }

    #[test]
    fn test_scale_is_bounded() {
        assert!(Args::try_parse_from(["chip8", "--scale", "0", "pong.ch8"]).is_err());
        assert!(Args::try_parse_from(["chip8", "--scale", "500000000", "pong.ch8"]).is_err());
        let args = Args::try_parse_from(["chip8", "-s", "100", "pong.ch8"]).unwrap();
        assert_eq!(args.scale, 100);
    }

    #[test]
    fn test_rom_is_required() {
        assert!(Args::try_parse_from(["chip8"]).is_err());
    }
}
