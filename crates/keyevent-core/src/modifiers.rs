//! Modifier key bitmask and the capability that samples it.
//!
//! The bit layout is a fixed contract with the framework's
//! `RawKeyEventDataWindows` modifier definitions; it must not change on one
//! side without the other.
//!
//! The bitmask is computed fresh for every event, immediately before the
//! message is built, because OS modifier state can change between two fast
//! key transitions.  Nothing here caches it.

use serde::{Deserialize, Serialize};

use crate::keymap::VirtualKey;

/// Modifier bitmask sent in the `modifiers` field of a key event message.
///
/// Generic and sided bits are independent: holding Left Shift sets both
/// [`ModifierFlags::SHIFT`] and [`ModifierFlags::SHIFT_LEFT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierFlags(pub i32);

impl ModifierFlags {
    pub const SHIFT: i32 = 1 << 0;
    pub const SHIFT_LEFT: i32 = 1 << 1;
    pub const SHIFT_RIGHT: i32 = 1 << 2;
    pub const CONTROL: i32 = 1 << 3;
    pub const CONTROL_LEFT: i32 = 1 << 4;
    pub const CONTROL_RIGHT: i32 = 1 << 5;
    pub const ALT: i32 = 1 << 6;
    pub const ALT_LEFT: i32 = 1 << 7;
    pub const ALT_RIGHT: i32 = 1 << 8;
    pub const META_LEFT: i32 = 1 << 9;
    pub const META_RIGHT: i32 = 1 << 10;
    pub const CAPS_LOCK: i32 = 1 << 11;
    pub const NUM_LOCK: i32 = 1 << 12;
    pub const SCROLL_LOCK: i32 = 1 << 13;

    /// No modifier held.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if every bit in `bits` is set.
    pub fn contains(&self, bits: i32) -> bool {
        self.0 & bits == bits
    }

    /// Sets every bit in `bits`.
    pub fn insert(&mut self, bits: i32) {
        self.0 |= bits;
    }

    /// Raw bitmask value as it appears on the wire.
    pub fn bits(&self) -> i32 {
        self.0
    }
}

/// Which virtual key drives which bit.
///
/// Order follows the bit positions; every entry is queried on every read.
const MODIFIER_KEY_BITS: [(VirtualKey, i32); 14] = [
    (VirtualKey::Shift, ModifierFlags::SHIFT),
    (VirtualKey::LeftShift, ModifierFlags::SHIFT_LEFT),
    (VirtualKey::RightShift, ModifierFlags::SHIFT_RIGHT),
    (VirtualKey::Control, ModifierFlags::CONTROL),
    (VirtualKey::LeftControl, ModifierFlags::CONTROL_LEFT),
    (VirtualKey::RightControl, ModifierFlags::CONTROL_RIGHT),
    (VirtualKey::Menu, ModifierFlags::ALT),
    (VirtualKey::LeftMenu, ModifierFlags::ALT_LEFT),
    (VirtualKey::RightMenu, ModifierFlags::ALT_RIGHT),
    (VirtualKey::LeftWin, ModifierFlags::META_LEFT),
    (VirtualKey::RightWin, ModifierFlags::META_RIGHT),
    (VirtualKey::Capital, ModifierFlags::CAPS_LOCK),
    (VirtualKey::NumLock, ModifierFlags::NUM_LOCK),
    (VirtualKey::Scroll, ModifierFlags::SCROLL_LOCK),
];

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Produces the current modifier bitmask.
///
/// Called once per key event.  Implementations must not fail: a key whose
/// state cannot be read counts as "not down".
pub trait ModifierReader: Send + Sync {
    /// Samples the live modifier state.
    fn read_modifiers(&self) -> ModifierFlags;
}

/// Per-key "is down" query against OS-owned keyboard state.
///
/// The production implementation wraps Win32 `GetKeyState`; tests substitute
/// a mock so no real input state is needed.
#[cfg_attr(test, mockall::automock)]
pub trait KeyStateQuery: Send + Sync {
    /// Returns `true` if `key` is currently held down.
    fn is_key_down(&self, key: VirtualKey) -> bool;
}

/// [`ModifierReader`] that packs the answers of a [`KeyStateQuery`].
pub struct KeyStateModifierReader<Q> {
    query: Q,
}

impl<Q: KeyStateQuery> KeyStateModifierReader<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }
}

impl<Q: KeyStateQuery> ModifierReader for KeyStateModifierReader<Q> {
    fn read_modifiers(&self) -> ModifierFlags {
        MODIFIER_KEY_BITS
            .iter()
            .filter(|(key, _)| self.query.is_key_down(*key))
            .fold(ModifierFlags::empty(), |mut flags, (_, bit)| {
                flags.insert(*bit);
                flags
            })
    }
}

/// [`ModifierReader`] that always reports the same bitmask.
///
/// Used by tests and by hosts without a live keyboard state source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedModifiers(pub ModifierFlags);

impl ModifierReader for FixedModifiers {
    fn read_modifiers(&self) -> ModifierFlags {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_with_down(keys: &'static [VirtualKey]) -> KeyStateModifierReader<MockKeyStateQuery> {
        let mut query = MockKeyStateQuery::new();
        query
            .expect_is_key_down()
            .returning(move |key| keys.contains(&key));
        KeyStateModifierReader::new(query)
    }

    #[test]
    fn test_no_keys_down_yields_empty_mask() {
        // Arrange
        let reader = reader_with_down(&[]);

        // Act
        let flags = reader.read_modifiers();

        // Assert
        assert_eq!(flags, ModifierFlags::empty());
    }

    #[test]
    fn test_left_shift_sets_generic_and_left_bits_only() {
        // Arrange: Windows reports both VK_SHIFT and VK_LSHIFT down
        let reader = reader_with_down(&[VirtualKey::Shift, VirtualKey::LeftShift]);

        // Act
        let flags = reader.read_modifiers();

        // Assert
        assert!(flags.contains(ModifierFlags::SHIFT));
        assert!(flags.contains(ModifierFlags::SHIFT_LEFT));
        assert!(!flags.contains(ModifierFlags::SHIFT_RIGHT));
        assert_eq!(flags.bits(), 0b11);
    }

    #[test]
    fn test_each_key_maps_to_its_own_bit() {
        for (position, (key, bit)) in MODIFIER_KEY_BITS.iter().enumerate() {
            // Arrange
            let key = *key;
            let mut query = MockKeyStateQuery::new();
            query
                .expect_is_key_down()
                .returning(move |queried| queried == key);
            let reader = KeyStateModifierReader::new(query);

            // Act
            let flags = reader.read_modifiers();

            // Assert
            assert_eq!(flags.bits(), *bit);
            assert_eq!(*bit, 1 << position, "bit layout is a fixed contract");
        }
    }

    #[test]
    fn test_every_modifier_key_is_queried_once_per_read() {
        // Arrange
        let mut query = MockKeyStateQuery::new();
        query.expect_is_key_down().times(14).return_const(false);
        let reader = KeyStateModifierReader::new(query);

        // Act / Assert (mock verifies call count on drop)
        reader.read_modifiers();
    }

    #[test]
    fn test_all_keys_down_sets_fourteen_bits() {
        let mut query = MockKeyStateQuery::new();
        query.expect_is_key_down().return_const(true);
        let reader = KeyStateModifierReader::new(query);

        assert_eq!(reader.read_modifiers().bits(), (1 << 14) - 1);
    }

    #[test]
    fn test_fixed_modifiers_returns_configured_mask() {
        let reader = FixedModifiers(ModifierFlags(ModifierFlags::CONTROL | ModifierFlags::CONTROL_RIGHT));
        assert_eq!(reader.read_modifiers().bits(), 0b10_1000);
    }

    #[test]
    fn test_modifier_flags_serialize_as_plain_integer() {
        let flags = ModifierFlags(ModifierFlags::CAPS_LOCK);
        assert_eq!(serde_json::to_string(&flags).unwrap(), "2048");
    }
}
