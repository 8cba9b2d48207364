//! Key event channel message types.
//!
//! Outbound, one JSON object per key transition:
//!
//! ```json
//! {"keyCode":65,"scanCode":30,"characterCodePoint":97,"keymap":"windows","modifiers":0,"type":"keydown"}
//! ```
//!
//! Inbound, the framework's reply:
//!
//! ```json
//! {"handled":true}
//! ```

use serde::{Deserialize, Serialize};

use crate::modifiers::ModifierFlags;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Name of the logical channel carrying key events to the framework.
pub const CHANNEL_NAME: &str = "flutter/keyevent";

/// Keymap tag telling the framework which native key semantics apply.
pub const WINDOWS_KEYMAP: &str = "windows";

/// Scan code bit marking an extended key.
///
/// Win32 reports some keys (e.g. ControlRight) with the same scan code as their
/// non-extended counterpart (ControlLeft) plus an "extended" flag.  The
/// framework's physical key table encodes that flag as these high bits.
pub const SCANCODE_EXTENDED: i32 = 0xE000;

/// Bit set on the translated character when the key is a dead key.
pub const DEAD_KEY_BIT: u32 = 0x8000_0000;

/// Reply field carrying the framework's verdict.
pub const HANDLED_KEY: &str = "handled";

// ── Message types ─────────────────────────────────────────────────────────────

/// Event-type tag of a key event message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventType {
    /// Serialized as `"keydown"`.
    KeyDown,
    /// Serialized as `"keyup"`.
    KeyUp,
}

impl KeyEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyEventType::KeyDown => "keydown",
            KeyEventType::KeyUp => "keyup",
        }
    }
}

/// Message sent to the framework for one key press or release.
///
/// Field order matches the order the framework historically received them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEventMessage {
    /// Native platform key code (Windows VK code), forwarded untranslated.
    pub key_code: i32,
    /// Hardware scan code with [`SCANCODE_EXTENDED`] folded in for extended keys.
    pub scan_code: i32,
    /// Translated character with [`DEAD_KEY_BIT`] cleared.
    pub character_code_point: u32,
    /// Always [`WINDOWS_KEYMAP`] for this adapter.
    pub keymap: String,
    /// Modifier state sampled when the event was built.
    pub modifiers: ModifierFlags,
    /// `"keydown"` or `"keyup"`.
    #[serde(rename = "type")]
    pub event_type: KeyEventType,
}

/// Reply sent back by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEventReply {
    /// `true` if the framework consumed the key event.
    pub handled: bool,
}
