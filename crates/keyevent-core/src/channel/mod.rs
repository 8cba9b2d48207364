//! Transport seam for named binary message channels.
//!
//! A [`BinaryMessenger`] moves opaque byte buffers to the framework and hands
//! each reply to the continuation registered with the matching send.  The
//! messenger owns request/reply correlation: this crate never tags messages
//! with ids, it relies on every `send` getting its own continuation.
//!
//! Delivery order is the messenger's business.  [`loopback::LoopbackMessenger`]
//! delivers in FIFO order per messenger.

use async_trait::async_trait;

pub mod loopback;

/// One-shot continuation receiving the reply bytes of a single send.
///
/// May be invoked on any thread.  An empty buffer means the framework side
/// had nothing to say (for example, no handler was registered).
pub type BinaryReply = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// Asynchronous send-with-reply over named channels.
///
/// The production implementation is provided by the embedding engine; tests
/// use recording doubles and [`loopback::LoopbackMessenger`].
pub trait BinaryMessenger: Send + Sync {
    /// Sends `message` on `channel` and returns immediately.
    ///
    /// `reply` is invoked at most once, later, with the bytes of the reply
    /// that logically corresponds to this message.  A transport that gives up
    /// on a message drops `reply` without calling it.
    fn send(&self, channel: &str, message: Vec<u8>, reply: BinaryReply);
}

/// Framework-side receiver for one channel.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handles one incoming message and produces the reply bytes.
    async fn handle_message(&self, message: Vec<u8>) -> Vec<u8>;
}
