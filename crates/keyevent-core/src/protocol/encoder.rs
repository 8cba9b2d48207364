//! Key event encoder: raw hook data to [`KeyEventMessage`].
//!
//! Two edge transforms happen here:
//!
//! - **Extended keys.**  The hook's extended flag is folded into the scan code
//!   as [`SCANCODE_EXTENDED`], so ControlLeft (`0x1D`) and ControlRight
//!   (`0x1D | 0xE000`) stay distinguishable downstream.
//! - **Dead keys.**  When a dead key is pressed, the OS delivers its
//!   character as `normal_char | 0x80000000`.  Pressing "dead key caret"
//!   yields `0x8000005E`; clearing the bit gives `0x5E` (`'^'`).  The bit is
//!   cleared unconditionally, which also drops the "this was a dead key"
//!   signal; the framework contract has no field for it.

use thiserror::Error;

use crate::keymap::windows_vk::{WM_KEYDOWN, WM_KEYUP};
use crate::modifiers::ModifierFlags;
use crate::protocol::messages::{
    KeyEventMessage, KeyEventType, DEAD_KEY_BIT, SCANCODE_EXTENDED, WINDOWS_KEYMAP,
};

/// Errors produced while encoding a key transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The transition is neither a press nor a release.
    #[error("unknown key event action: {0}")]
    UnrecognizedAction(u32),
}

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    /// Any other raw action value, kept for diagnostics.
    Unknown(u32),
}

impl KeyAction {
    /// Maps the window message that delivered the key to an action.
    ///
    /// Only `WM_KEYDOWN` and `WM_KEYUP` are recognised; system key messages
    /// are reported as [`KeyAction::Unknown`].
    pub fn from_window_message(message: u32) -> Self {
        match message {
            WM_KEYDOWN => KeyAction::Press,
            WM_KEYUP => KeyAction::Release,
            other => KeyAction::Unknown(other),
        }
    }

    fn event_type(self) -> Result<KeyEventType, EncodeError> {
        match self {
            KeyAction::Press => Ok(KeyEventType::KeyDown),
            KeyAction::Release => Ok(KeyEventType::KeyUp),
            KeyAction::Unknown(raw) => Err(EncodeError::UnrecognizedAction(raw)),
        }
    }
}

/// One key press or release as reported by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    /// Native platform key code (Windows VK code).
    pub key_code: i32,
    /// Hardware scan code without the extended bit.
    pub scan_code: i32,
    pub action: KeyAction,
    /// Translated character, possibly carrying [`DEAD_KEY_BIT`].
    pub character: u32,
    /// `true` for extended keys (right-side modifiers, numpad Enter, ...).
    pub is_extended: bool,
    /// `true` if the key was already down before this transition (auto-repeat).
    pub was_down: bool,
}

/// Clears the dead-key marker from a translated character.
///
/// Idempotent: applying it twice equals applying it once.
pub fn undead_char(character: u32) -> u32 {
    character & !DEAD_KEY_BIT
}

/// Folds the extended flag into the high bits of a scan code.
pub fn effective_scan_code(scan_code: i32, is_extended: bool) -> i32 {
    if is_extended {
        scan_code | SCANCODE_EXTENDED
    } else {
        scan_code
    }
}

/// Builds the outbound message for `transition`.
///
/// # Errors
///
/// Returns [`EncodeError::UnrecognizedAction`] for anything other than a
/// press or a release; no message is built in that case.
///
/// # Examples
///
/// ```rust
/// use keyevent_core::{encode_key_event, KeyAction, KeyTransition, ModifierFlags, KeyEventType};
///
/// let transition = KeyTransition {
///     key_code: 0x41,
///     scan_code: 0x1E,
///     action: KeyAction::Press,
///     character: 0x61,
///     is_extended: false,
///     was_down: false,
/// };
/// let message = encode_key_event(&transition, ModifierFlags::empty()).unwrap();
/// assert_eq!(message.event_type, KeyEventType::KeyDown);
/// assert_eq!(message.character_code_point, 97);
/// ```
pub fn encode_key_event(
    transition: &KeyTransition,
    modifiers: ModifierFlags,
) -> Result<KeyEventMessage, EncodeError> {
    let event_type = transition.action.event_type()?;
    Ok(KeyEventMessage {
        key_code: transition.key_code,
        scan_code: effective_scan_code(transition.scan_code, transition.is_extended),
        character_code_point: undead_char(transition.character),
        keymap: WINDOWS_KEYMAP.to_string(),
        modifiers,
        event_type,
    })
}
