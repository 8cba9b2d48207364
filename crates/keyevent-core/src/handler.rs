//! KeyEventChannelHandler: the single entry point for OS key transitions.
//!
//! For every transition the handler:
//!
//! 1. samples the modifier bitmask from its [`ModifierReader`],
//! 2. encodes the transition into a key event message,
//! 3. serializes it with its [`MessageCodec`] and sends it on the key event
//!    channel through its [`BinaryMessenger`],
//! 4. decodes the framework's reply and completes the caller with `handled`.
//!
//! Steps 1–3 happen synchronously inside [`KeyEventChannelHandler::handle_transition`],
//! which never waits for the reply.  Step 4 runs later, on whatever thread the
//! messenger delivers replies on.
//!
//! # Exactly-once completion
//!
//! The caller's callback is moved into exactly one of two branches:
//!
//! ```text
//! handle_transition
//!  ├─ Ok(payload)  → send, callback moves into the reply continuation → Disposition::Sent
//!  └─ Err(reason)  → callback(false) right now                        → Disposition::Rejected
//! ```
//!
//! Because the callback is `FnOnce` and is moved, it cannot run twice.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::channel::BinaryMessenger;
use crate::error::KeyEventError;
use crate::modifiers::ModifierReader;
use crate::pending::{PendingEvents, DEFAULT_MAX_PENDING_EVENTS};
use crate::protocol::codec::{decode_handled, encode_key_event_message, JsonMessageCodec, MessageCodec};
use crate::protocol::encoder::{encode_key_event, KeyTransition};
use crate::protocol::messages::CHANNEL_NAME;

/// Tunables for a [`KeyEventChannelHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEventOptions {
    /// Channel the key events are sent on.
    pub channel_name: String,
    /// Outstanding-event count above which a backlog warning is logged.
    pub max_pending_events: usize,
}

impl Default for KeyEventOptions {
    fn default() -> Self {
        Self {
            channel_name: CHANNEL_NAME.to_string(),
            max_pending_events: DEFAULT_MAX_PENDING_EVENTS,
        }
    }
}

/// Which branch [`KeyEventChannelHandler::handle_transition`] took.
#[derive(Debug)]
pub enum Disposition {
    /// The event was sent; the callback will run when the reply arrives.
    Sent,
    /// The event was not sent; the callback already ran with `false`.
    Rejected(KeyEventError),
}

impl Disposition {
    pub fn is_sent(&self) -> bool {
        matches!(self, Disposition::Sent)
    }
}

/// Continuation receiving the decoded reply of one send.
type ReplyContinuation = Box<dyn FnOnce(Result<bool, KeyEventError>) + Send + 'static>;

/// Relays OS key transitions to the framework and its verdicts back.
///
/// All collaborators are injected, so the handler holds no OS or transport
/// state of its own.  It is `Send + Sync` and can be shared behind an `Arc`.
pub struct KeyEventChannelHandler {
    messenger: Arc<dyn BinaryMessenger>,
    modifier_reader: Arc<dyn ModifierReader>,
    codec: Arc<dyn MessageCodec>,
    channel_name: String,
    pending: Arc<PendingEvents>,
}

impl KeyEventChannelHandler {
    /// Creates a handler on the default channel with the JSON codec.
    pub fn new(
        messenger: Arc<dyn BinaryMessenger>,
        modifier_reader: Arc<dyn ModifierReader>,
    ) -> Self {
        Self::with_options(messenger, modifier_reader, KeyEventOptions::default())
    }

    /// Creates a handler with explicit options and the JSON codec.
    pub fn with_options(
        messenger: Arc<dyn BinaryMessenger>,
        modifier_reader: Arc<dyn ModifierReader>,
        options: KeyEventOptions,
    ) -> Self {
        Self {
            messenger,
            modifier_reader,
            codec: Arc::new(JsonMessageCodec),
            channel_name: options.channel_name,
            pending: Arc::new(PendingEvents::new(options.max_pending_events)),
        }
    }

    /// Replaces the codec used for outbound messages and replies.
    pub fn with_codec(mut self, codec: Arc<dyn MessageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Name of the channel this handler sends on.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Number of sent events still waiting for a reply.
    pub fn pending_events(&self) -> usize {
        self.pending.count()
    }

    /// Handles one key transition from the OS hook.
    ///
    /// `on_complete` is invoked exactly once with the framework's `handled`
    /// verdict: synchronously with `false` if the transition is rejected, or
    /// later from the reply continuation.  A reply that cannot be decoded is
    /// logged and completes with `false`.  If the transport never answers,
    /// `on_complete` never runs.
    pub fn handle_transition<F>(&self, transition: &KeyTransition, on_complete: F) -> Disposition
    where
        F: FnOnce(bool) + Send + 'static,
    {
        match self.prepare(transition) {
            Ok(payload) => {
                let key_code = transition.key_code;
                self.send(
                    payload,
                    Box::new(move |result: Result<bool, KeyEventError>| match result {
                        Ok(handled) => on_complete(handled),
                        Err(err) => {
                            error!(key_code, error = %err, "failed to read framework key event reply");
                            on_complete(false);
                        }
                    }),
                );
                Disposition::Sent
            }
            Err(err) => {
                on_complete(false);
                Disposition::Rejected(err)
            }
        }
    }

    /// Sends one key transition and waits for the framework's verdict.
    ///
    /// Unlike [`handle_transition`](Self::handle_transition), failures are
    /// returned instead of being folded into `false`.
    ///
    /// # Errors
    ///
    /// - [`KeyEventError::Encode`] for transitions that are neither press nor release.
    /// - [`KeyEventError::Codec`], [`KeyEventError::MissingHandledField`],
    ///   [`KeyEventError::InvalidHandledField`] for undecodable replies.
    /// - [`KeyEventError::ReplyDropped`] if the transport discarded the reply.
    pub async fn send_key_event(&self, transition: &KeyTransition) -> Result<bool, KeyEventError> {
        let payload = self.prepare(transition)?;
        let (tx, rx) = oneshot::channel();
        self.send(
            payload,
            Box::new(move |result: Result<bool, KeyEventError>| {
                // The receiver is gone only if the caller stopped waiting.
                let _ = tx.send(result);
            }),
        );
        rx.await.map_err(|_| KeyEventError::ReplyDropped)?
    }

    /// Samples modifiers and builds the outbound payload.
    fn prepare(&self, transition: &KeyTransition) -> Result<Vec<u8>, KeyEventError> {
        let modifiers = self.modifier_reader.read_modifiers();
        let payload = encode_key_event(transition, modifiers)
            .map_err(KeyEventError::from)
            .and_then(|message| {
                encode_key_event_message(self.codec.as_ref(), &message).map_err(KeyEventError::from)
            });
        if let Err(err) = &payload {
            warn!(
                key_code = transition.key_code,
                action = ?transition.action,
                error = %err,
                "key event not sent to framework"
            );
        }
        payload
    }

    /// Sends `payload` and binds `continuation` to its reply.
    fn send(&self, payload: Vec<u8>, continuation: ReplyContinuation) {
        let guard = self.pending.track();
        let codec = Arc::clone(&self.codec);
        debug!(
            channel = %self.channel_name,
            bytes = payload.len(),
            pending = self.pending.count(),
            "sending key event"
        );
        self.messenger.send(
            &self.channel_name,
            payload,
            Box::new(move |reply: Vec<u8>| {
                drop(guard);
                continuation(decode_handled(codec.as_ref(), &reply));
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;

    use serde_json::{json, Value};

    use crate::channel::BinaryReply;
    use crate::modifiers::{FixedModifiers, ModifierFlags};
    use crate::protocol::encoder::{EncodeError, KeyAction};

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Records every send; replies are delivered by the test, whenever it likes.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
        replies: Mutex<Vec<Option<BinaryReply>>>,
    }

    impl RecordingMessenger {
        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn sent_json(&self, index: usize) -> (String, Value) {
            let sent = self.sent.lock().unwrap();
            let (channel, bytes) = &sent[index];
            (channel.clone(), serde_json::from_slice(bytes).expect("sent bytes are JSON"))
        }

        fn take_reply(&self, index: usize) -> BinaryReply {
            self.replies.lock().unwrap()[index]
                .take()
                .expect("reply already consumed")
        }

        fn respond(&self, index: usize, reply: &[u8]) {
            (self.take_reply(index))(reply.to_vec());
        }
    }

    impl BinaryMessenger for RecordingMessenger {
        fn send(&self, channel: &str, message: Vec<u8>, reply: BinaryReply) {
            self.sent.lock().unwrap().push((channel.to_string(), message));
            self.replies.lock().unwrap().push(Some(reply));
        }
    }

    /// Counts how often the modifier state is sampled.
    struct CountingReader {
        reads: AtomicUsize,
        flags: ModifierFlags,
    }

    impl ModifierReader for CountingReader {
        fn read_modifiers(&self) -> ModifierFlags {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.flags
        }
    }

    fn press(key_code: i32) -> KeyTransition {
        KeyTransition {
            key_code,
            scan_code: 0x1E,
            action: KeyAction::Press,
            character: 0x61,
            is_extended: false,
            was_down: false,
        }
    }

    fn make_handler() -> (KeyEventChannelHandler, Arc<RecordingMessenger>) {
        let messenger = Arc::new(RecordingMessenger::default());
        let handler = KeyEventChannelHandler::new(
            Arc::clone(&messenger) as Arc<dyn BinaryMessenger>,
            Arc::new(FixedModifiers::default()),
        );
        (handler, messenger)
    }

    fn recorder() -> (Arc<Mutex<Vec<bool>>>, impl FnOnce(bool) + Send + 'static) {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        (results, move |handled| sink.lock().unwrap().push(handled))
    }

    // ── Normal path ───────────────────────────────────────────────────────────

    #[test]
    fn test_press_is_sent_on_key_event_channel() {
        // Arrange
        let (handler, messenger) = make_handler();
        let (results, callback) = recorder();

        // Act
        let disposition = handler.handle_transition(&press(0x41), callback);

        // Assert
        assert!(disposition.is_sent());
        assert_eq!(messenger.sent_count(), 1);
        let (channel, body) = messenger.sent_json(0);
        assert_eq!(channel, "flutter/keyevent");
        assert_eq!(
            body,
            json!({
                "keyCode": 65,
                "scanCode": 30,
                "characterCodePoint": 97,
                "keymap": "windows",
                "modifiers": 0,
                "type": "keydown"
            })
        );
        assert!(results.lock().unwrap().is_empty(), "callback must wait for the reply");
    }

    #[test]
    fn test_reply_completes_callback_once_with_handled_value() {
        // Arrange
        let (handler, messenger) = make_handler();
        let (results, callback) = recorder();
        handler.handle_transition(&press(0x41), callback);

        // Act
        messenger.respond(0, br#"{"handled":true}"#);

        // Assert
        assert_eq!(*results.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_reply_delivered_on_another_thread() {
        // Arrange
        let (handler, messenger) = make_handler();
        let (results, callback) = recorder();
        handler.handle_transition(&press(0x41), callback);
        let reply = messenger.take_reply(0);

        // Act
        thread::spawn(move || reply(br#"{"handled":false}"#.to_vec()))
            .join()
            .expect("reply thread panicked");

        // Assert
        assert_eq!(*results.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_out_of_order_replies_reach_their_own_callbacks() {
        // Arrange: two events in flight at once
        let (handler, messenger) = make_handler();
        let (first, first_cb) = recorder();
        let (second, second_cb) = recorder();
        handler.handle_transition(&press(0x41), first_cb);
        handler.handle_transition(&press(0x42), second_cb);

        // Act – answer the second one first
        messenger.respond(1, br#"{"handled":true}"#);
        messenger.respond(0, br#"{"handled":false}"#);

        // Assert
        assert_eq!(*first.lock().unwrap(), vec![false]);
        assert_eq!(*second.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_modifiers_are_sampled_once_per_event() {
        // Arrange
        let messenger = Arc::new(RecordingMessenger::default());
        let reader = Arc::new(CountingReader {
            reads: AtomicUsize::new(0),
            flags: ModifierFlags(ModifierFlags::SHIFT | ModifierFlags::SHIFT_LEFT),
        });
        let handler = KeyEventChannelHandler::new(
            Arc::clone(&messenger) as Arc<dyn BinaryMessenger>,
            Arc::clone(&reader) as Arc<dyn ModifierReader>,
        );

        // Act
        for key in [0x41, 0x42, 0x43] {
            handler.handle_transition(&press(key), |_| {});
        }

        // Assert
        assert_eq!(reader.reads.load(Ordering::SeqCst), 3);
        assert_eq!(messenger.sent_json(2).1["modifiers"], json!(3));
    }

    // ── Reject path ───────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_action_completes_synchronously_without_sending() {
        // Arrange
        let (handler, messenger) = make_handler();
        let (results, callback) = recorder();
        let mut transition = press(0x41);
        transition.action = KeyAction::Unknown(3);

        // Act
        let disposition = handler.handle_transition(&transition, callback);

        // Assert
        assert!(matches!(
            disposition,
            Disposition::Rejected(KeyEventError::Encode(EncodeError::UnrecognizedAction(3)))
        ));
        assert_eq!(messenger.sent_count(), 0);
        assert_eq!(*results.lock().unwrap(), vec![false]);
        assert_eq!(handler.pending_events(), 0);
    }

    // ── Malformed replies ─────────────────────────────────────────────────────

    #[test]
    fn test_malformed_replies_complete_with_false() {
        for reply in [
            &b""[..],
            &b"not json"[..],
            &br#"{"other":1}"#[..],
            &br#"{"handled":1}"#[..],
        ] {
            // Arrange
            let (handler, messenger) = make_handler();
            let (results, callback) = recorder();
            handler.handle_transition(&press(0x41), callback);

            // Act
            messenger.respond(0, reply);

            // Assert
            assert_eq!(*results.lock().unwrap(), vec![false], "reply {reply:?}");
        }
    }

    #[test]
    fn test_malformed_reply_does_not_affect_next_event() {
        let (handler, messenger) = make_handler();
        let (first, first_cb) = recorder();
        let (second, second_cb) = recorder();

        handler.handle_transition(&press(0x41), first_cb);
        messenger.respond(0, b"garbage");
        handler.handle_transition(&press(0x41), second_cb);
        messenger.respond(1, br#"{"handled":true}"#);

        assert_eq!(*first.lock().unwrap(), vec![false]);
        assert_eq!(*second.lock().unwrap(), vec![true]);
    }

    // ── Pending backlog ───────────────────────────────────────────────────────

    #[test]
    fn test_pending_count_follows_sends_and_replies() {
        // Arrange
        let (handler, messenger) = make_handler();

        // Act
        handler.handle_transition(&press(0x41), |_| {});
        handler.handle_transition(&press(0x42), |_| {});
        let in_flight = handler.pending_events();
        messenger.respond(0, br#"{"handled":true}"#);

        // Assert
        assert_eq!(in_flight, 2);
        assert_eq!(handler.pending_events(), 1);
    }

    #[test]
    fn test_dropped_reply_releases_pending_slot() {
        let (handler, messenger) = make_handler();
        handler.handle_transition(&press(0x41), |_| {});

        drop(messenger.take_reply(0));

        assert_eq!(handler.pending_events(), 0);
    }

    #[test]
    fn test_options_override_channel_and_ceiling() {
        // Arrange
        let messenger = Arc::new(RecordingMessenger::default());
        let handler = KeyEventChannelHandler::with_options(
            Arc::clone(&messenger) as Arc<dyn BinaryMessenger>,
            Arc::new(FixedModifiers::default()),
            KeyEventOptions {
                channel_name: "test/keys".to_string(),
                max_pending_events: 1,
            },
        );

        // Act – exceed the ceiling; only a warning is expected
        handler.handle_transition(&press(0x41), |_| {});
        handler.handle_transition(&press(0x42), |_| {});

        // Assert
        assert_eq!(handler.channel_name(), "test/keys");
        assert_eq!(messenger.sent_json(0).0, "test/keys");
        assert_eq!(handler.pending_events(), 2);
    }

    // ── Async API ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_send_key_event_returns_decoded_verdict() {
        // Arrange
        let (handler, messenger) = make_handler();
        let responder = Arc::clone(&messenger);
        let answer = tokio::spawn(async move {
            while responder.sent_count() == 0 {
                tokio::task::yield_now().await;
            }
            responder.respond(0, br#"{"handled":true}"#);
        });

        // Act
        let handled = handler.send_key_event(&press(0x41)).await;
        answer.await.expect("responder task panicked");

        // Assert
        assert!(handled.expect("verdict"));
    }

    #[tokio::test]
    async fn test_send_key_event_reports_unknown_action() {
        let (handler, messenger) = make_handler();
        let mut transition = press(0x41);
        transition.action = KeyAction::Unknown(0x0104);

        let result = handler.send_key_event(&transition).await;

        assert!(matches!(
            result,
            Err(KeyEventError::Encode(EncodeError::UnrecognizedAction(0x0104)))
        ));
        assert_eq!(messenger.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_send_key_event_reports_dropped_reply() {
        // Arrange: a messenger that discards every continuation
        struct DroppingMessenger;
        impl BinaryMessenger for DroppingMessenger {
            fn send(&self, _channel: &str, _message: Vec<u8>, _reply: BinaryReply) {}
        }
        let handler =
            KeyEventChannelHandler::new(Arc::new(DroppingMessenger), Arc::new(FixedModifiers::default()));

        // Act
        let result = handler.send_key_event(&press(0x41)).await;

        // Assert
        assert!(matches!(result, Err(KeyEventError::ReplyDropped)));
        assert_eq!(handler.pending_events(), 0);
    }
}
