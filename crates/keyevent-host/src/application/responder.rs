//! ConfiguredResponder: framework stand-in for the key event channel.

use std::collections::HashSet;

use async_trait::async_trait;
use keyevent_core::{KeyEventMessage, KeyEventReply, KeyEventType, MessageHandler};
use tracing::{debug, warn};

/// Reports key downs of a configured set of key codes as handled.
///
/// Key ups are never handled.  A message that is not a key event gets a
/// `{"handled": false}` reply.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredResponder {
    handled_key_codes: HashSet<i32>,
}

impl ConfiguredResponder {
    pub fn new(handled_key_codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            handled_key_codes: handled_key_codes.into_iter().collect(),
        }
    }

    /// Verdict for one decoded key event.
    pub fn is_handled(&self, event: &KeyEventMessage) -> bool {
        event.event_type == KeyEventType::KeyDown && self.handled_key_codes.contains(&event.key_code)
    }
}

#[async_trait]
impl MessageHandler for ConfiguredResponder {
    async fn handle_message(&self, message: Vec<u8>) -> Vec<u8> {
        let handled = match serde_json::from_slice::<KeyEventMessage>(&message) {
            Ok(event) => {
                let handled = self.is_handled(&event);
                debug!(
                    key_code = event.key_code,
                    event_type = event.event_type.as_str(),
                    handled,
                    "responder verdict"
                );
                handled
            }
            Err(e) => {
                warn!(error = %e, "responder received a message that is not a key event");
                false
            }
        };
        serde_json::to_vec(&KeyEventReply { handled }).unwrap_or_default()
    }
}
