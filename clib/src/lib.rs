#![allow(clippy::missing_safety_doc)]

pub mod bridge;
pub mod consts;
mod utils;

use pkg_version::*;

const SFBRIDGE_VERSION: u32 =
    pkg_version_patch!() | pkg_version_minor!() << 8 | pkg_version_major!() << 16;

/// Returns the version of the sfbridge library.
///
/// --Returns--
/// The packed version. For example, 0x010102 (hex) would be version 1.1.2
#[no_mangle]
pub extern "C" fn SfBridge_GetVersion() -> u32 {
    SFBRIDGE_VERSION
}
