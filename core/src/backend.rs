use std::path::Path;

use crate::error::BridgeError;

/// Engine-assigned identifier of a loaded soundfont, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

impl std::fmt::Display for FontId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A synthesizer instance bound to one loaded soundfont.
///
/// MIDI data values are validated by the dispatcher before they reach these
/// methods, so implementations may assume channels are 0-15 and keys and
/// velocities are 0-127.
pub trait SynthInstance: Send {
    /// Binds `channel` to the `(bank, program)` preset of the loaded font.
    /// Engines fall back to a default preset when the pair is absent.
    fn program_select(&mut self, channel: u8, bank: u8, program: u8);

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8);

    fn note_off(&mut self, channel: u8, key: u8);

    /// Shifts `channel` by `semitones` from equal temperament via the pitch
    /// wheel. The offset is already clamped to [`crate::tuning::PITCH_BEND_RANGE`].
    fn set_channel_tuning(&mut self, channel: u8, semitones: f64);
}

/// Everything the backend produces for one session.
pub struct LoadedFont<B: SynthBackend + ?Sized> {
    pub synth: B::Instance,
    pub driver: B::Driver,
    pub font_id: FontId,
}

/// Factory seam between the session registry and the synthesis engine.
///
/// The production implementation is [`crate::engine::SoundFontEngine`]; tests
/// substitute a mock so registry behavior can be checked without an audio
/// device or soundfont fixtures.
pub trait SynthBackend {
    type Instance: SynthInstance;
    type Driver: Send;

    /// Loads the soundfont at `path` and creates a synth instance bound to
    /// the shared engine settings, together with a running audio driver
    /// pulling from it.
    fn load(&self, path: &Path) -> Result<LoadedFont<Self>, BridgeError>;
}
