//! Infrastructure layer for the key event host.
//!
//! Contains OS-facing adapters: keyboard state queries, configuration
//! file storage, and log output.
//!
//! **Dependency rule**: this layer may depend on `keyevent_core`, but MUST
//! NOT be imported by the `application` layer.

pub mod key_state;
pub mod logging;
pub mod storage;
