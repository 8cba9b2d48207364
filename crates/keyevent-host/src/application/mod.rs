//! Application layer use cases for the key event host.
//!
//! - **`replay`** – Reads scripted key transitions, one per line, and feeds
//!   each through the `KeyEventChannelHandler` the same way an OS key hook
//!   would, reporting the framework's verdict per line.
//!
//! - **`responder`** – A framework stand-in registered on the key event
//!   channel.  It answers key events with a `handled` verdict driven by the
//!   configuration, so the host can run without an embedding engine.

pub mod replay;
pub mod responder;
