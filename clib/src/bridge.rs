use std::ffi::c_char;
use std::sync::Mutex;

use lazy_static::lazy_static;
use sfbridge_core::{BridgeError, EngineContext, SoundFontEngine};

use crate::consts::*;
use crate::utils::*;

enum ContextSlot {
    /// No call has reached the library yet; the context is created lazily.
    Empty,
    Active(EngineContext<SoundFontEngine>),
    /// Tombstone left by `SfBridge_Dispose`. Every later call is rejected.
    Disposed,
}

lazy_static! {
    static ref CONTEXT: Mutex<ContextSlot> = Mutex::new(ContextSlot::Empty);
}

fn lock_slot() -> std::sync::MutexGuard<'static, ContextSlot> {
    CONTEXT.lock().unwrap_or_else(|err| err.into_inner())
}

/// Runs `op` against the process-wide engine context, mapping errors to
/// status codes. The mutex serializes all control-plane calls, so hosts may
/// invoke the bridge from any thread.
fn with_context<F>(op: F) -> i32
where
    F: FnOnce(&mut EngineContext<SoundFontEngine>) -> Result<i32, BridgeError>,
{
    let mut slot = lock_slot();

    if matches!(*slot, ContextSlot::Disposed) {
        return SFBRIDGE_ERR_DISPOSED;
    }
    if matches!(*slot, ContextSlot::Empty) {
        *slot = ContextSlot::Active(EngineContext::new(SoundFontEngine::default()));
    }
    let ContextSlot::Active(ctx) = &mut *slot else {
        return SFBRIDGE_ERR_DISPOSED;
    };

    match op(ctx) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("bridge call failed: {err}");
            error_code(&err)
        }
    }
}

/// Loads the soundfont file at `path`, creates a synthesizer and audio
/// driver for it, and selects `(bank, program)` on all 16 MIDI channels.
///
/// --Parameters--
/// - path: NUL-terminated UTF-8 path of the soundfont file. The buffer is
///         owned by the caller and copied before this function returns.
/// - bank: The bank number (0-127) to select on every channel
/// - program: The program number (0-127) to select on every channel
///
/// --Returns--
/// A positive session handle on success, or a negative SFBRIDGE_ERR_* status
/// on failure. A failed load never returns a handle.
#[no_mangle]
pub unsafe extern "C" fn SfBridge_LoadSoundfont(
    path: *const c_char,
    bank: i32,
    program: i32,
) -> i32 {
    let path = match unsafe { path_from_ptr(path) } {
        Some(path) => path,
        None => return SFBRIDGE_ERR_INVALID_PARAM,
    };
    let (bank, program) = match (midi_value(bank), midi_value(program)) {
        (Some(bank), Some(program)) => (bank, program),
        _ => return SFBRIDGE_ERR_INVALID_PARAM,
    };

    with_context(|ctx| {
        ctx.load_soundfont(&path, bank, program)
            .map(|handle| handle.0 as i32)
    })
}

/// Binds a MIDI channel of the session's synthesizer to a `(bank, program)`
/// preset of its loaded soundfont.
///
/// --Parameters--
/// - handle: The session handle returned by SfBridge_LoadSoundfont
/// - channel: The MIDI channel to rebind (0-15)
/// - bank: The bank number (0-127)
/// - program: The program number (0-127)
///
/// --Returns--
/// SFBRIDGE_OK, or a negative SFBRIDGE_ERR_* status.
#[no_mangle]
pub extern "C" fn SfBridge_SelectInstrument(
    handle: i32,
    channel: i32,
    bank: i32,
    program: i32,
) -> i32 {
    let Some(handle) = session_handle(handle) else {
        return SFBRIDGE_ERR_UNKNOWN_HANDLE;
    };
    let (Some(channel), Some(bank), Some(program)) =
        (midi_channel(channel), midi_value(bank), midi_value(program))
    else {
        return SFBRIDGE_ERR_INVALID_PARAM;
    };

    with_context(|ctx| {
        ctx.select_instrument(handle, channel, bank, program)
            .map(|()| SFBRIDGE_OK)
    })
}

/// Sends a note-on to the session's synthesizer, applying any tuning offset
/// stored for `key`.
///
/// --Parameters--
/// - channel: The MIDI channel (0-15)
/// - key: The note key number (0-127)
/// - velocity: The note velocity (0-127)
/// - handle: The session handle returned by SfBridge_LoadSoundfont
///
/// --Returns--
/// SFBRIDGE_OK, or a negative SFBRIDGE_ERR_* status.
#[no_mangle]
pub extern "C" fn SfBridge_PlayNote(channel: i32, key: i32, velocity: i32, handle: i32) -> i32 {
    let Some(handle) = session_handle(handle) else {
        return SFBRIDGE_ERR_UNKNOWN_HANDLE;
    };
    let (Some(channel), Some(key), Some(velocity)) =
        (midi_channel(channel), midi_value(key), midi_value(velocity))
    else {
        return SFBRIDGE_ERR_INVALID_PARAM;
    };

    with_context(|ctx| {
        ctx.play_note(handle, channel, key, velocity)
            .map(|()| SFBRIDGE_OK)
    })
}

/// Sends a note-off to the session's synthesizer.
///
/// --Parameters--
/// - channel: The MIDI channel (0-15)
/// - key: The note key number (0-127)
/// - handle: The session handle returned by SfBridge_LoadSoundfont
///
/// --Returns--
/// SFBRIDGE_OK, or a negative SFBRIDGE_ERR_* status.
#[no_mangle]
pub extern "C" fn SfBridge_StopNote(channel: i32, key: i32, handle: i32) -> i32 {
    let Some(handle) = session_handle(handle) else {
        return SFBRIDGE_ERR_UNKNOWN_HANDLE;
    };
    let (Some(channel), Some(key)) = (midi_channel(channel), midi_value(key)) else {
        return SFBRIDGE_ERR_INVALID_PARAM;
    };

    with_context(|ctx| ctx.stop_note(handle, channel, key).map(|()| SFBRIDGE_OK))
}

/// Stores a tuning offset for `key` in the shared tuning table and applies
/// it to channel 0 of the target session. Other channels pick the offset up
/// at their next note-on of that key.
///
/// --Parameters--
/// - handle: The session handle returned by SfBridge_LoadSoundfont
/// - key: The note key number the offset applies to (0-127)
/// - tune: Tuning offset in semitones, clamped to the ±2 pitch wheel range.
///         Non-finite values are rejected.
///
/// --Returns--
/// SFBRIDGE_OK, or a negative SFBRIDGE_ERR_* status.
#[no_mangle]
pub extern "C" fn SfBridge_TuneNotes(handle: i32, key: i32, tune: f64) -> i32 {
    let Some(handle) = session_handle(handle) else {
        return SFBRIDGE_ERR_UNKNOWN_HANDLE;
    };
    let Some(key) = midi_value(key) else {
        return SFBRIDGE_ERR_INVALID_PARAM;
    };

    with_context(|ctx| ctx.tune_notes(handle, key, tune).map(|()| SFBRIDGE_OK))
}

/// Releases the audio driver and synthesizer of one session and removes it
/// from the registry. The handle is never reused.
///
/// --Parameters--
/// - handle: The session handle returned by SfBridge_LoadSoundfont
///
/// --Returns--
/// SFBRIDGE_OK, or a negative SFBRIDGE_ERR_* status.
#[no_mangle]
pub extern "C" fn SfBridge_UnloadSoundfont(handle: i32) -> i32 {
    let Some(handle) = session_handle(handle) else {
        return SFBRIDGE_ERR_UNKNOWN_HANDLE;
    };

    with_context(|ctx| ctx.unload_soundfont(handle).map(|()| SFBRIDGE_OK))
}

/// Releases every session and the shared engine settings. Intended as
/// process or plugin teardown; after this call every bridge function
/// returns SFBRIDGE_ERR_DISPOSED.
///
/// --Returns--
/// SFBRIDGE_OK, or SFBRIDGE_ERR_DISPOSED if already disposed.
#[no_mangle]
pub extern "C" fn SfBridge_Dispose() -> i32 {
    let mut slot = lock_slot();
    match std::mem::replace(&mut *slot, ContextSlot::Disposed) {
        ContextSlot::Active(ctx) => {
            ctx.dispose();
            SFBRIDGE_OK
        }
        ContextSlot::Empty => SFBRIDGE_OK,
        ContextSlot::Disposed => SFBRIDGE_ERR_DISPOSED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    // The context slot is process-wide, so the whole lifecycle is exercised
    // in one sequential test.
    #[test]
    fn rejects_bad_input_and_everything_after_dispose() {
        let missing = CString::new("/nonexistent/missing.sf2").unwrap();

        // A bad path never yields a handle.
        assert_eq!(
            unsafe { SfBridge_LoadSoundfont(missing.as_ptr(), 0, 0) },
            SFBRIDGE_ERR_LOAD_FAILED
        );
        assert_eq!(
            unsafe { SfBridge_LoadSoundfont(ptr::null(), 0, 0) },
            SFBRIDGE_ERR_INVALID_PARAM
        );
        assert_eq!(
            unsafe { SfBridge_LoadSoundfont(missing.as_ptr(), -1, 0) },
            SFBRIDGE_ERR_INVALID_PARAM
        );
        assert_eq!(
            unsafe { SfBridge_LoadSoundfont(missing.as_ptr(), 0, 128) },
            SFBRIDGE_ERR_INVALID_PARAM
        );

        // Unknown handles are typed errors, not crashes.
        assert_eq!(SfBridge_SelectInstrument(1, 0, 0, 0), SFBRIDGE_ERR_UNKNOWN_HANDLE);
        assert_eq!(SfBridge_PlayNote(0, 60, 100, 1), SFBRIDGE_ERR_UNKNOWN_HANDLE);
        assert_eq!(SfBridge_StopNote(0, 60, -3), SFBRIDGE_ERR_UNKNOWN_HANDLE);
        assert_eq!(SfBridge_TuneNotes(1, 60, 0.5), SFBRIDGE_ERR_UNKNOWN_HANDLE);
        assert_eq!(SfBridge_UnloadSoundfont(1), SFBRIDGE_ERR_UNKNOWN_HANDLE);

        // Out-of-range MIDI data is rejected before dispatch.
        assert_eq!(SfBridge_PlayNote(16, 60, 100, 1), SFBRIDGE_ERR_INVALID_PARAM);
        assert_eq!(SfBridge_PlayNote(0, 128, 100, 1), SFBRIDGE_ERR_INVALID_PARAM);
        assert_eq!(SfBridge_TuneNotes(1, 300, 0.5), SFBRIDGE_ERR_INVALID_PARAM);

        // Dispose is terminal: everything afterwards is a defined error.
        assert_eq!(SfBridge_Dispose(), SFBRIDGE_OK);
        assert_eq!(SfBridge_Dispose(), SFBRIDGE_ERR_DISPOSED);
        assert_eq!(
            unsafe { SfBridge_LoadSoundfont(missing.as_ptr(), 0, 0) },
            SFBRIDGE_ERR_DISPOSED
        );
        assert_eq!(SfBridge_PlayNote(0, 60, 100, 1), SFBRIDGE_ERR_DISPOSED);
        assert_eq!(SfBridge_UnloadSoundfont(1), SFBRIDGE_ERR_DISPOSED);
    }
}
