//! Error type for the key event channel handler.

use thiserror::Error;

use crate::protocol::codec::CodecError;
use crate::protocol::encoder::EncodeError;

/// Everything that can keep a key event from producing a `handled` verdict.
#[derive(Debug, Error)]
pub enum KeyEventError {
    /// The transition could not be turned into a message.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The outbound message or the reply could not pass through the codec.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),

    /// The framework replied without a `handled` field.
    #[error("reply is missing the \"handled\" field")]
    MissingHandledField,

    /// The framework's `handled` field was not a boolean.
    #[error("reply \"handled\" field is not a boolean: {0}")]
    InvalidHandledField(String),

    /// The transport dropped the reply continuation without invoking it.
    #[error("transport dropped the reply without answering")]
    ReplyDropped,
}
