use std::ffi::{c_char, CStr};
use std::path::PathBuf;

use sfbridge_core::{BridgeError, SessionHandle};

use crate::consts::*;

/// Copies a host-owned NUL-terminated UTF-8 buffer into an owned path.
pub(crate) unsafe fn path_from_ptr(path: *const c_char) -> Option<PathBuf> {
    if path.is_null() {
        return None;
    }
    let path = unsafe { CStr::from_ptr(path) };
    path.to_str().ok().map(PathBuf::from)
}

/// Narrows an FFI integer to a MIDI data byte (0-127).
pub(crate) fn midi_value(value: i32) -> Option<u8> {
    u8::try_from(value).ok().filter(|v| *v < 128)
}

/// Narrows an FFI integer to a MIDI channel (0-15).
pub(crate) fn midi_channel(value: i32) -> Option<u8> {
    u8::try_from(value).ok().filter(|v| *v < 16)
}

/// Interprets an FFI integer as a session handle. Non-positive values can
/// never name a session.
pub(crate) fn session_handle(value: i32) -> Option<SessionHandle> {
    u32::try_from(value).ok().filter(|v| *v > 0).map(SessionHandle)
}

pub(crate) fn error_code(err: &BridgeError) -> i32 {
    match err {
        BridgeError::SoundfontIo(_)
        | BridgeError::SoundfontParse(_)
        | BridgeError::SynthInit(_) => SFBRIDGE_ERR_LOAD_FAILED,
        BridgeError::NoOutputDevice | BridgeError::AudioStream(_) => SFBRIDGE_ERR_AUDIO,
        BridgeError::UnknownHandle(_) => SFBRIDGE_ERR_UNKNOWN_HANDLE,
        BridgeError::ChannelOutOfRange(_)
        | BridgeError::KeyOutOfRange(_)
        | BridgeError::VelocityOutOfRange(_)
        | BridgeError::InvalidTuning(_) => SFBRIDGE_ERR_INVALID_PARAM,
    }
}
