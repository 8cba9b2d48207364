//! Platform key constants.
//!
//! Only the Windows keymap is implemented: the adapter advertises the
//! `"windows"` keymap to the framework and forwards native key codes as-is.

pub mod windows_vk;

pub use windows_vk::VirtualKey;
