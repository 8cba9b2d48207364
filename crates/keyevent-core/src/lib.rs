//! # keyevent-core
//!
//! Adapter between raw platform keyboard hook data and the UI framework's
//! `flutter/keyevent` message channel.
//!
//! A key transition reported by the OS hook is turned into a JSON message,
//! sent over an asynchronous channel, and the framework's `{"handled": bool}`
//! reply is relayed back to whoever originated the hook.
//!
//! This crate has zero dependencies on OS APIs.  Live modifier state, the
//! wire codec, and the transport are all reached through traits so the host
//! application decides what sits behind them.
//!
//! # Module overview
//!
//! - **`keymap`** – Win32 virtual key and window message constants used by
//!   the modifier reader and the action mapping.
//!
//! - **`modifiers`** – The framework's modifier bitmask layout and the
//!   [`ModifierReader`] capability that samples it per event.
//!
//! - **`protocol`** – The outbound key event message, the reply schema, the
//!   key event encoder, and the [`MessageCodec`] seam.
//!
//! - **`channel`** – The [`BinaryMessenger`] transport seam plus an
//!   in-process [`LoopbackMessenger`].
//!
//! - **`pending`** – Tracks sent-but-unanswered events against a ceiling.
//!
//! - **`handler`** – [`KeyEventChannelHandler`], the single entry point that
//!   ties everything together.

pub mod channel;
pub mod error;
pub mod handler;
pub mod keymap;
pub mod modifiers;
pub mod pending;
pub mod protocol;

pub use channel::{loopback::LoopbackMessenger, BinaryMessenger, BinaryReply, MessageHandler};
pub use error::KeyEventError;
pub use handler::{Disposition, KeyEventChannelHandler, KeyEventOptions};
pub use keymap::VirtualKey;
pub use modifiers::{FixedModifiers, KeyStateModifierReader, KeyStateQuery, ModifierFlags, ModifierReader};
pub use protocol::codec::{CodecError, JsonMessageCodec, MessageCodec};
pub use protocol::encoder::{encode_key_event, EncodeError, KeyAction, KeyTransition};
pub use protocol::messages::{KeyEventMessage, KeyEventReply, KeyEventType, CHANNEL_NAME};
