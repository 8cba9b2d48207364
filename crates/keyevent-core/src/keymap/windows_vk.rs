//! Windows Virtual Key (VK) codes and keyboard window messages.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! # Generic and sided modifier keys
//!
//! Windows reports modifier state both for a *generic* key (`VK_SHIFT`) and
//! for each physical side (`VK_LSHIFT`, `VK_RSHIFT`).  The generic key is down
//! whenever either side is down, so holding Left Shift makes both `VK_SHIFT`
//! and `VK_LSHIFT` report "down".  The modifier reader queries all of them
//! independently; it never derives one from another.

// ── Keyboard window messages ──────────────────────────────────────────────────

/// `WM_KEYDOWN`: a non-system key was pressed.
pub const WM_KEYDOWN: u32 = 0x0100;
/// `WM_KEYUP`: a non-system key was released.
pub const WM_KEYUP: u32 = 0x0101;
/// `WM_SYSKEYDOWN`: F10 or a key pressed while Alt is held.
pub const WM_SYSKEYDOWN: u32 = 0x0104;
/// `WM_SYSKEYUP`: release counterpart of [`WM_SYSKEYDOWN`].
pub const WM_SYSKEYUP: u32 = 0x0105;

// ── Modifier virtual keys ─────────────────────────────────────────────────────

/// The Windows virtual keys whose state feeds the modifier bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VirtualKey {
    /// `VK_SHIFT`
    Shift = 0x10,
    /// `VK_CONTROL`
    Control = 0x11,
    /// `VK_MENU` (Alt)
    Menu = 0x12,
    /// `VK_CAPITAL` (Caps Lock)
    Capital = 0x14,
    /// `VK_LWIN`
    LeftWin = 0x5B,
    /// `VK_RWIN`
    RightWin = 0x5C,
    /// `VK_NUMLOCK`
    NumLock = 0x90,
    /// `VK_SCROLL` (Scroll Lock)
    Scroll = 0x91,
    /// `VK_LSHIFT`
    LeftShift = 0xA0,
    /// `VK_RSHIFT`
    RightShift = 0xA1,
    /// `VK_LCONTROL`
    LeftControl = 0xA2,
    /// `VK_RCONTROL`
    RightControl = 0xA3,
    /// `VK_LMENU` (Left Alt)
    LeftMenu = 0xA4,
    /// `VK_RMENU` (Right Alt / AltGr)
    RightMenu = 0xA5,
}

impl VirtualKey {
    /// Returns the raw VK code.
    pub fn code(self) -> u8 {
        self as u8
    }
}
