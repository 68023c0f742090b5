//! Session registry and dispatcher for soundfont playback.
//!
//! The heavy lifting — soundfont parsing, synthesis, and real-time output —
//! is delegated to the `rustysynth` and `cpal` crates. This crate owns the
//! lifecycle around them: an [`EngineContext`] maps integer session handles
//! to synthesizer/driver/font triples and forwards playback and tuning
//! calls to the instance a handle names.

pub mod backend;
pub mod engine;
pub mod error;
pub mod output;
pub mod registry;
pub mod tuning;

pub use backend::{FontId, LoadedFont, SynthBackend, SynthInstance};
pub use engine::{EngineSettings, SoundFontEngine};
pub use error::BridgeError;
pub use output::AudioOutput;
pub use registry::{EngineContext, SessionHandle};
pub use tuning::{TuningTable, PITCH_BEND_RANGE, TUNING_KEYS};
