//! Live keyboard state for the modifier bitmask.
//!
//! On Windows the modifier bitmask is sampled with `GetKeyState` for every
//! key event.  Other platforms have no equivalent of the Win32 per-thread
//! key state, so the host falls back to an empty bitmask there.

use std::sync::Arc;

use keyevent_core::ModifierReader;

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the modifier reader for the current platform.
#[cfg(target_os = "windows")]
pub fn platform_modifier_reader() -> Arc<dyn ModifierReader> {
    Arc::new(keyevent_core::KeyStateModifierReader::new(windows::Win32KeyState))
}

/// Returns the modifier reader for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn platform_modifier_reader() -> Arc<dyn ModifierReader> {
    tracing::warn!("no keyboard state source on this platform; modifiers are always reported as 0");
    Arc::new(keyevent_core::FixedModifiers::default())
}
