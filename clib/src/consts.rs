/// The call completed successfully.
pub const SFBRIDGE_OK: i32 = 0;

/// The soundfont file could not be read, parsed, or bound to a synthesizer.
pub const SFBRIDGE_ERR_LOAD_FAILED: i32 = -1;

/// The handle does not name a loaded soundfont session.
pub const SFBRIDGE_ERR_UNKNOWN_HANDLE: i32 = -2;

/// The library was already disposed; no further calls are accepted.
pub const SFBRIDGE_ERR_DISPOSED: i32 = -3;

/// A parameter was out of range (channel, key, velocity, bank, program,
/// tuning value, or a malformed path string).
pub const SFBRIDGE_ERR_INVALID_PARAM: i32 = -4;

/// No output device was available or the audio stream could not be opened.
pub const SFBRIDGE_ERR_AUDIO: i32 = -5;
