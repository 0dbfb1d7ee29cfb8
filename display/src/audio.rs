use log::debug;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.25;
const SAMPLE_RATE: i32 = 44_100;

/// A square wave, the classic Chip-8 buzzer.
struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase < 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// # Beeper
/// Plays a tone for as long as the Chip-8 sound timer is running.
///
/// The emulator only tells the beeper whether it should be sounding; it never feeds it samples.
pub struct Beeper {
    device: AudioDevice<SquareWave>,
    playing: bool,
}

impl Beeper {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| {
            debug!("audio opened at {}Hz", spec.freq);
            SquareWave {
                phase_inc: TONE_HZ / spec.freq as f32,
                phase: 0.0,
                volume: VOLUME,
            }
        })?;
        Ok(Beeper {
            device,
            playing: false,
        })
    }

    /// Starts or stops the tone. Does nothing if it's already in the requested state.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        if playing {
            self.device.resume();
        } else {
            self.device.pause();
        }
        self.playing = playing;
    }
}
