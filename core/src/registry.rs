use std::collections::HashMap;
use std::path::Path;

use crate::backend::{FontId, SynthBackend, SynthInstance};
use crate::error::BridgeError;
use crate::tuning::TuningTable;

/// Identifier of one loaded soundfont session, unique for the lifetime of an
/// [`EngineContext`]. Handles start at 1 and are never reused, so a stale
/// handle always resolves to an "unknown handle" error instead of a
/// different session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u32);

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One loaded soundfont with its synth instance and audio driver.
///
/// The driver is declared first so it drops before the synth: the output
/// stream must stop pulling samples before the instance goes away.
struct Session<B: SynthBackend> {
    driver: B::Driver,
    synth: B::Instance,
    font_id: FontId,
}

/// Owns every loaded session, the shared tuning table, and the engine
/// backend. All bridge operations go through this context; there are no
/// process-wide registries in this crate.
pub struct EngineContext<B: SynthBackend> {
    backend: B,
    sessions: HashMap<SessionHandle, Session<B>>,
    next_handle: u32,
    tuning: TuningTable,
}

impl<B: SynthBackend> EngineContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            sessions: HashMap::new(),
            next_handle: 1,
            tuning: TuningTable::new(),
        }
    }

    /// Loads the soundfont at `path`, selects `(bank, program)` on all 16
    /// MIDI channels of the new synth instance, and registers the session.
    ///
    /// A failed load propagates the engine error and allocates no handle.
    pub fn load_soundfont(
        &mut self,
        path: &Path,
        bank: u8,
        program: u8,
    ) -> Result<SessionHandle, BridgeError> {
        let mut loaded = self.backend.load(path)?;

        for channel in 0..16 {
            loaded.synth.program_select(channel, bank, program);
        }

        let handle = SessionHandle(self.next_handle);
        self.next_handle += 1;
        self.sessions.insert(
            handle,
            Session {
                driver: loaded.driver,
                synth: loaded.synth,
                font_id: loaded.font_id,
            },
        );

        log::info!(
            "loaded soundfont {} (font {}) as session {}",
            path.display(),
            loaded.font_id,
            handle
        );
        Ok(handle)
    }

    /// Binds `channel` of the session's synth to the `(bank, program)` preset
    /// of its loaded font.
    pub fn select_instrument(
        &mut self,
        handle: SessionHandle,
        channel: u8,
        bank: u8,
        program: u8,
    ) -> Result<(), BridgeError> {
        check_channel(channel)?;
        let session = self.session_mut(handle)?;
        session.synth.program_select(channel, bank, program);
        Ok(())
    }

    /// Sends a note-on, applying the tuning table offset for `key` to the
    /// channel first so tuned keys sound shifted from equal temperament.
    pub fn play_note(
        &mut self,
        handle: SessionHandle,
        channel: u8,
        key: u8,
        velocity: u8,
    ) -> Result<(), BridgeError> {
        check_channel(channel)?;
        check_key(key)?;
        if velocity > 127 {
            return Err(BridgeError::VelocityOutOfRange(velocity));
        }

        let offset = self.tuning.get(key);
        let session = self.session_mut(handle)?;
        session.synth.set_channel_tuning(channel, offset);
        session.synth.note_on(channel, key, velocity);
        Ok(())
    }

    pub fn stop_note(
        &mut self,
        handle: SessionHandle,
        channel: u8,
        key: u8,
    ) -> Result<(), BridgeError> {
        check_channel(channel)?;
        check_key(key)?;
        let session = self.session_mut(handle)?;
        session.synth.note_off(channel, key);
        Ok(())
    }

    /// Stores a tuning offset for `key` and applies it to channel 0 of the
    /// target session immediately. Other channels pick the offset up at
    /// their next note-on of that key.
    pub fn tune_notes(
        &mut self,
        handle: SessionHandle,
        key: u8,
        semitones: f64,
    ) -> Result<(), BridgeError> {
        if !self.sessions.contains_key(&handle) {
            return Err(BridgeError::UnknownHandle(handle));
        }
        self.tuning.set(key, semitones)?;

        let offset = self.tuning.get(key);
        let session = self.session_mut(handle)?;
        session.synth.set_channel_tuning(0, offset);
        Ok(())
    }

    /// Releases the session's driver and synth and removes it from the
    /// registry. The handle is not reused afterwards.
    pub fn unload_soundfont(&mut self, handle: SessionHandle) -> Result<(), BridgeError> {
        let session = self
            .sessions
            .remove(&handle)
            .ok_or(BridgeError::UnknownHandle(handle))?;
        log::info!("unloaded session {} (font {})", handle, session.font_id);
        Ok(())
    }

    /// Tears down every session and the shared engine settings.
    pub fn dispose(mut self) {
        log::info!("disposing engine context with {} sessions", self.sessions.len());
        self.sessions.clear();
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut Session<B>, BridgeError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(BridgeError::UnknownHandle(handle))
    }
}

fn check_channel(channel: u8) -> Result<(), BridgeError> {
    if channel > 15 {
        return Err(BridgeError::ChannelOutOfRange(channel));
    }
    Ok(())
}

fn check_key(key: u8) -> Result<(), BridgeError> {
    if key > 127 {
        return Err(BridgeError::KeyOutOfRange(key));
    }
    Ok(())
}
