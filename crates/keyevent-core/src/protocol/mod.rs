//! Protocol module containing the key event message types, the encoder, and
//! the codec seam.

pub mod codec;
pub mod encoder;
pub mod messages;

pub use codec::{decode_handled, CodecError, JsonMessageCodec, MessageCodec};
pub use encoder::{encode_key_event, EncodeError, KeyAction, KeyTransition};
pub use messages::*;
