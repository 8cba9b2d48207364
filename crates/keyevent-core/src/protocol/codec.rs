//! Codec seam between structured messages and transport bytes.
//!
//! The channel moves opaque byte buffers.  A [`MessageCodec`] turns a JSON
//! document into those bytes and back; [`JsonMessageCodec`] is the UTF-8
//! JSON codec the framework's key event channel uses.

use serde_json::Value;
use thiserror::Error;

use crate::error::KeyEventError;
use crate::protocol::messages::{KeyEventMessage, HANDLED_KEY};

/// Errors raised by a [`MessageCodec`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer held no bytes at all.
    ///
    /// Transports deliver an empty reply when no framework handler is
    /// listening on the channel.
    #[error("empty message")]
    EmptyMessage,

    /// The bytes were not valid JSON, or the value could not be serialized.
    #[error("invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Converts between JSON documents and transport bytes.
pub trait MessageCodec: Send + Sync {
    /// Serializes `message` into a byte buffer.
    fn encode_message(&self, message: &Value) -> Result<Vec<u8>, CodecError>;

    /// Parses a byte buffer back into a JSON document.
    fn decode_message(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// UTF-8 JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageCodec;

impl MessageCodec for JsonMessageCodec {
    fn encode_message(&self, message: &Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(message)?)
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::EmptyMessage);
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Serializes a key event message through `codec`.
///
/// # Errors
///
/// Returns [`CodecError`] if the message cannot be represented or encoded.
pub fn encode_key_event_message(
    codec: &dyn MessageCodec,
    message: &KeyEventMessage,
) -> Result<Vec<u8>, CodecError> {
    let value = serde_json::to_value(message)?;
    codec.encode_message(&value)
}

/// Decodes a framework reply and extracts its `handled` flag.
///
/// # Errors
///
/// - [`KeyEventError::Codec`] if the bytes do not decode.
/// - [`KeyEventError::MissingHandledField`] if the reply has no `handled` field.
/// - [`KeyEventError::InvalidHandledField`] if `handled` is not a boolean.
pub fn decode_handled(codec: &dyn MessageCodec, reply: &[u8]) -> Result<bool, KeyEventError> {
    let value = codec.decode_message(reply)?;
    match value.get(HANDLED_KEY) {
        Some(Value::Bool(handled)) => Ok(*handled),
        Some(other) => Err(KeyEventError::InvalidHandledField(other.to_string())),
        None => Err(KeyEventError::MissingHandledField),
    }
}
