//! Win32 keyboard state query.
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use keyevent_core::{KeyStateQuery, VirtualKey};
use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyState;

/// [`KeyStateQuery`] backed by `GetKeyState`.
///
/// `GetKeyState` reports the key state as of the message currently being
/// processed by the calling thread, so it must be queried on the thread that
/// receives the key messages.  A negative result means the key is down.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32KeyState;

impl KeyStateQuery for Win32KeyState {
    fn is_key_down(&self, key: VirtualKey) -> bool {
        // SAFETY: GetKeyState only reads the calling thread's keyboard state
        // and accepts any virtual-key code.
        let state = unsafe { GetKeyState(i32::from(key.code())) };
        state < 0
    }
}
