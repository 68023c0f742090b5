use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};

use crate::backend::{FontId, LoadedFont, SynthBackend, SynthInstance};
use crate::error::BridgeError;
use crate::output::AudioOutput;
use crate::tuning::PITCH_BEND_RANGE;

const BANK_SELECT_MSB: i32 = 0x00;

/// Shared synthesis parameters, applied to every new synth instance and
/// released when the engine context is torn down.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub maximum_polyphony: usize,
    pub enable_reverb_and_chorus: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            maximum_polyphony: 64,
            enable_reverb_and_chorus: true,
        }
    }
}

/// Production backend: rustysynth synthesis driven through cpal output.
///
/// Each load creates an independent synthesizer and stream pair so sessions
/// can be unloaded without disturbing each other.
pub struct SoundFontEngine {
    settings: EngineSettings,
    next_font: AtomicU32,
}

impl SoundFontEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            next_font: AtomicU32::new(1),
        }
    }
}

impl Default for SoundFontEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl SynthBackend for SoundFontEngine {
    type Instance = SoundFontSynth;
    type Driver = AudioOutput;

    fn load(&self, path: &Path) -> Result<LoadedFont<Self>, BridgeError> {
        let mut file = File::open(path)?;
        let font = Arc::new(SoundFont::new(&mut file)?);

        let (device, config) = AudioOutput::default_device()?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let mut settings = SynthesizerSettings::new(sample_rate as i32);
        settings.maximum_polyphony = self.settings.maximum_polyphony;
        settings.enable_reverb_and_chorus = self.settings.enable_reverb_and_chorus;

        let synth = Arc::new(Mutex::new(Synthesizer::new(&font, &settings)?));
        let driver = AudioOutput::spawn(device, config, render_fn(synth.clone(), channels))?;

        Ok(LoadedFont {
            synth: SoundFontSynth { synth },
            driver,
            font_id: FontId(self.next_font.fetch_add(1, Ordering::SeqCst)),
        })
    }
}

/// Renders interleaved output frames from the shared synthesizer. Stereo is
/// mapped to the first two channels of wider layouts; mono output takes the
/// left channel.
fn render_fn(
    synth: Arc<Mutex<Synthesizer>>,
    channels: u16,
) -> impl FnMut(&mut [f32]) + Send + 'static {
    let channels = channels.max(1) as usize;
    let mut left: Vec<f32> = Vec::new();
    let mut right: Vec<f32> = Vec::new();

    move |data| {
        let frames = data.len() / channels;
        left.resize(frames, 0.0);
        right.resize(frames, 0.0);

        match synth.lock() {
            Ok(mut synth) => synth.render(&mut left, &mut right),
            Err(_) => {
                data.fill(0.0);
                return;
            }
        }

        let samples = left.iter().zip(right.iter());
        for (frame, (l, r)) in data.chunks_mut(channels).zip(samples) {
            frame[0] = *l;
            if let Some(sample) = frame.get_mut(1) {
                *sample = *r;
            }
            for extra in frame.iter_mut().skip(2) {
                *extra = 0.0;
            }
        }
    }
}

/// One rustysynth instance, shared with its session's audio thread.
pub struct SoundFontSynth {
    synth: Arc<Mutex<Synthesizer>>,
}

impl SoundFontSynth {
    fn lock(&self) -> MutexGuard<'_, Synthesizer> {
        // A poisoned lock means the audio thread panicked mid-render; the
        // synthesizer state itself is still usable.
        self.synth.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl SynthInstance for SoundFontSynth {
    fn program_select(&mut self, channel: u8, bank: u8, program: u8) {
        let mut synth = self.lock();
        synth.process_midi_message(channel as i32, 0xB0, BANK_SELECT_MSB, bank as i32);
        synth.process_midi_message(channel as i32, 0xC0, program as i32, 0);
    }

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        self.lock()
            .note_on(channel as i32, key as i32, velocity as i32);
    }

    fn note_off(&mut self, channel: u8, key: u8) {
        self.lock().note_off(channel as i32, key as i32);
    }

    fn set_channel_tuning(&mut self, channel: u8, semitones: f64) {
        let value = pitch_wheel_value(semitones);
        let lsb = (value & 0x7F) as i32;
        let msb = (value >> 7) as i32;
        self.lock()
            .process_midi_message(channel as i32, 0xE0, lsb, msb);
    }
}

/// Maps a semitone offset to a 14-bit pitch wheel position, assuming the
/// engine's default ±2 semitone bend range.
fn pitch_wheel_value(semitones: f64) -> u16 {
    let clamped = semitones.clamp(-PITCH_BEND_RANGE, PITCH_BEND_RANGE);
    let raw = (clamped / PITCH_BEND_RANGE) * 8192.0 + 8192.0;
    raw.round().clamp(0.0, 16383.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_wheel_center_and_extremes() {
        assert_eq!(pitch_wheel_value(0.0), 8192);
        assert_eq!(pitch_wheel_value(PITCH_BEND_RANGE), 16383);
        assert_eq!(pitch_wheel_value(-PITCH_BEND_RANGE), 0);
    }

    #[test]
    fn pitch_wheel_scales_linearly() {
        assert_eq!(pitch_wheel_value(1.0), 12288);
        assert_eq!(pitch_wheel_value(-1.0), 4096);
    }

    #[test]
    fn pitch_wheel_clamps_out_of_range_offsets() {
        assert_eq!(pitch_wheel_value(10.0), 16383);
        assert_eq!(pitch_wheel_value(f64::NEG_INFINITY), 0);
    }
}
