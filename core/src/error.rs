use std::io;

use thiserror::Error;

use crate::registry::SessionHandle;

/// Errors surfaced by the bridge. Engine-level failures are wrapped so the
/// caller can always tell a failed load apart from an unknown handle.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to read soundfont file: {0}")]
    SoundfontIo(#[from] io::Error),

    #[error("Failed to parse soundfont: {0}")]
    SoundfontParse(#[from] rustysynth::SoundFontError),

    #[error("Failed to initialize synthesizer: {0}")]
    SynthInit(#[from] rustysynth::SynthesizerError),

    #[error("No audio output device available")]
    NoOutputDevice,

    #[error("Failed to open audio stream: {0}")]
    AudioStream(String),

    #[error("Unknown soundfont handle {0}")]
    UnknownHandle(SessionHandle),

    #[error("MIDI channel {0} out of range (expected 0-15)")]
    ChannelOutOfRange(u8),

    #[error("Note key {0} out of range (expected 0-127)")]
    KeyOutOfRange(u8),

    #[error("Velocity {0} out of range (expected 0-127)")]
    VelocityOutOfRange(u8),

    #[error("Tuning offset {0} is not a finite number")]
    InvalidTuning(f64),
}
