use std::time::Instant;

use anyhow::{anyhow, Result};
use log::{info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use chip8_display::{Beeper, Display};

use crate::keymap::keymap;
use crate::session::Session;
use crate::Settings;

/// Runs a session in an SDL2 window until it's closed or the CPU faults.
pub fn run(mut session: Session, settings: &Settings) -> Result<()> {
    // Get SDL2 context
    let sdl: sdl2::Sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display = Display::new(&sdl, settings.scale).map_err(|e| anyhow!(e))?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;
    let mut beeper = if settings.mute {
        None
    } else {
        match Beeper::new(&sdl) {
            Ok(beeper) => Some(beeper),
            Err(e) => {
                warn!("no audio, continuing muted: {}", e);
                None
            }
        }
    };

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                // Key-up events are lost while unfocused
                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => session.chip8.release_keys(),
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => session.chip8.set_key(kc, true),
                    (Keycode::Space, _) => session.fast_forward = true,
                    (Keycode::Backspace, _) => session.rewind = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => session.chip8.set_key(kc, false),
                    (Keycode::Space, _) => session.fast_forward = false,
                    (Keycode::Backspace, _) => session.rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        let frames = session.advance(Instant::now())?;

        // If the frame changed, render it
        if frames > 0 {
            if let Some(frame) = session.chip8.take_frame() {
                display.render(frame).map_err(|e| anyhow!(e))?;
            }
            if let Some(beeper) = beeper.as_mut() {
                beeper.set_playing(session.chip8.sound_active());
            }
        }

        // Handle timing
        std::thread::sleep(session.idle_time(Instant::now()));
    }

    info!("window closed");
    Ok(())
}
