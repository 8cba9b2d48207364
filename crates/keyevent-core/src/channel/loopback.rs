//! In-process [`BinaryMessenger`] backed by a Tokio worker task.
//!
//! Sends are queued on an unbounded `mpsc` channel and return immediately, so
//! a synchronous OS hook callback never waits on the framework.  A single
//! worker drains the queue, awaits the registered [`MessageHandler`], and
//! invokes the reply continuation, which keeps replies in send order.
//!
//! Messages for a channel with no registered handler get an empty reply, the
//! same thing an engine does when nothing listens on the framework side.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{BinaryMessenger, BinaryReply, MessageHandler};

type HandlerMap = Arc<RwLock<HashMap<String, Arc<dyn MessageHandler>>>>;

struct Envelope {
    channel: String,
    message: Vec<u8>,
    reply: BinaryReply,
}

/// Loopback transport delivering messages to in-process handlers.
pub struct LoopbackMessenger {
    queue: mpsc::UnboundedSender<Envelope>,
    handlers: HandlerMap,
}

impl LoopbackMessenger {
    /// Creates the messenger and spawns its delivery worker on `runtime`.
    ///
    /// The worker exits once the messenger is dropped and the queue drains.
    pub fn spawn(runtime: &Handle) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let handlers: HandlerMap = Arc::new(RwLock::new(HashMap::new()));
        runtime.spawn(deliver(rx, Arc::clone(&handlers)));
        Self { queue, handlers }
    }

    /// Registers `handler` for `channel`, replacing any previous handler.
    ///
    /// Passing `None` unregisters the channel.
    pub fn set_message_handler(
        &self,
        channel: impl Into<String>,
        handler: Option<Arc<dyn MessageHandler>>,
    ) {
        let channel = channel.into();
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        match handler {
            Some(handler) => {
                handlers.insert(channel, handler);
            }
            None => {
                handlers.remove(&channel);
            }
        }
    }
}

impl BinaryMessenger for LoopbackMessenger {
    fn send(&self, channel: &str, message: Vec<u8>, reply: BinaryReply) {
        let envelope = Envelope {
            channel: channel.to_string(),
            message,
            reply,
        };
        if let Err(mpsc::error::SendError(envelope)) = self.queue.send(envelope) {
            // The reply continuation is dropped together with the envelope.
            warn!(channel = %envelope.channel, "loopback worker has stopped; message dropped");
        }
    }
}

fn lookup(handlers: &HandlerMap, channel: &str) -> Option<Arc<dyn MessageHandler>> {
    handlers
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(channel)
        .cloned()
}

async fn deliver(mut rx: mpsc::UnboundedReceiver<Envelope>, handlers: HandlerMap) {
    while let Some(envelope) = rx.recv().await {
        let response = match lookup(&handlers, &envelope.channel) {
            Some(handler) => handler.handle_message(envelope.message).await,
            None => {
                debug!(channel = %envelope.channel, "no handler registered; replying empty");
                Vec::new()
            }
        };
        (envelope.reply)(response);
    }
    debug!("loopback delivery worker stopped");
}
