use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::{cursor, execute, queue, terminal};
use log::info;

use chip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT};
use chip8_core::Framebuffer;

use crate::keymap::char_keymap;
use crate::session::Session;

/// Terminals report key presses but not releases, so a press is held for this many 60Hz frames.
const HOLD_FRAMES: u8 = 6;

/// Puts the terminal into raw mode on an alternate screen and puts it back when dropped.
struct RawTerminal {
    stdout: Stdout,
}

impl RawTerminal {
    fn enter() -> Result<Self> {
        let (columns, lines) = terminal::size()?;
        if (columns as usize) < DISPLAY_WIDTH || (lines as usize) < DISPLAY_HEIGHT + 1 {
            bail!(
                "terminal is {}x{}, need at least {}x{}",
                columns,
                lines,
                DISPLAY_WIDTH,
                DISPLAY_HEIGHT + 1
            );
        }
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(RawTerminal { stdout })
    }

    fn draw(&mut self, frame: &Framebuffer) -> Result<()> {
        for (y, line) in frame.to_string().lines().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, y as u16), Print(line))?;
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn status(&mut self, text: &str) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, DISPLAY_HEIGHT as u16),
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(text)
        )?;
        self.stdout.flush()?;
        Ok(())
    }

    fn bell(&mut self) -> Result<()> {
        execute!(self.stdout, Print('\u{7}'))?;
        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        // Nothing useful can be done if restoring fails.
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Counts down how long each key has left before it is released.
#[derive(Default)]
struct HeldKeys {
    frames_left: [u8; KEY_COUNT],
}

impl HeldKeys {
    fn press(&mut self, key: u8) {
        self.frames_left[key as usize] = HOLD_FRAMES;
    }

    /// Advances one frame, returning the keys that should now be released.
    fn tick(&mut self) -> Vec<u8> {
        let mut released = Vec::new();
        for (key, left) in self.frames_left.iter_mut().enumerate() {
            if *left > 0 {
                *left -= 1;
                if *left == 0 {
                    released.push(key as u8);
                }
            }
        }
        released
    }
}

/// Runs a session in the terminal until Escape (or Ctrl-C) is pressed or the CPU faults.
pub fn run(mut session: Session) -> Result<()> {
    let mut term = RawTerminal::enter()?;
    term.status("Esc quits")?;
    let mut held = HeldKeys::default();
    let mut sounding = false;

    loop {
        while event::poll(Duration::from_millis(0))? {
            let key = match event::read()? {
                Event::Key(key) => key,
                _ => continue,
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key {
                KeyEvent {
                    code: KeyCode::Esc, ..
                } => {
                    info!("quit from terminal");
                    return Ok(());
                }
                KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                    ..
                } if modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyEvent {
                    code: KeyCode::Char(c),
                    ..
                } => {
                    if let Some(kc) = char_keymap(c) {
                        session.chip8.set_key(kc, true);
                        held.press(kc);
                    }
                }
                _ => {}
            }
        }

        let frames = session.advance(Instant::now())?;
        for _ in 0..frames {
            for key in held.tick() {
                session.chip8.set_key(key, false);
            }
        }

        if frames > 0 {
            if let Some(frame) = session.chip8.take_frame() {
                term.draw(frame)?;
            }
            let active = session.chip8.sound_active();
            if active && !sounding {
                term.bell()?;
            }
            sounding = active;
        }

        std::thread::sleep(session.idle_time(Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_release_after_hold() {
        let mut held = HeldKeys::default();
        held.press(0x5);
        for _ in 0..HOLD_FRAMES - 1 {
            assert!(held.tick().is_empty());
        }
        assert_eq!(held.tick(), vec![0x5]);
        assert!(held.tick().is_empty());
    }

    #[test]
    fn test_repress_extends_hold() {
        let mut held = HeldKeys::default();
        held.press(0x1);
        held.tick();
        held.press(0x1);
        for _ in 0..HOLD_FRAMES - 1 {
            assert!(held.tick().is_empty());
        }
        assert_eq!(held.tick(), vec![0x1]);
    }
}
