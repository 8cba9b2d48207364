//! Replay of scripted key transitions through the key event channel.
//!
//! # Input format
//!
//! One transition per line:
//!
//! ```text
//! <keydown|keyup|MESSAGE> <key> <scan> <char> [extended] [repeat]
//! ```
//!
//! - `MESSAGE` is a raw window message number; `0x0100` and `0x0101` are the
//!   same as `keydown` and `keyup`, anything else is an unknown action.
//! - `key`, `scan`, and `char` are decimal or `0x`-prefixed hexadecimal.
//! - `extended` marks an extended key; `repeat` marks an auto-repeat (the
//!   key was already down).
//! - Blank lines are skipped and `#` starts a comment.
//!
//! ```text
//! # A, then Right Control, then a dead caret
//! keydown 0x41 0x1E 0x61
//! keyup   0x41 0x1E 0x61
//! keydown 0xA3 0x1D 0 extended
//! keydown 0xDD 0x1A 0x8000005E
//! ```
//!
//! Every transition goes through [`KeyEventChannelHandler::handle_transition`]
//! and the replay waits for its verdict before reading the next line, which
//! mirrors an OS hook that blocks until the framework answers.

use keyevent_core::keymap::windows_vk::{WM_KEYDOWN, WM_KEYUP};
use keyevent_core::{Disposition, KeyAction, KeyEventChannelHandler, KeyTransition};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// A line that is not a valid transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown flag {0:?}")]
    UnknownFlag(String),
}

/// Error type for the replay use case.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay input: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write replay output: {0}")]
    Write(#[source] std::io::Error),
}

/// Totals for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Transitions handed to the channel handler.
    pub events: usize,
    /// Transitions the framework reported as handled.
    pub handled: usize,
    /// Transitions rejected before reaching the framework.
    pub rejected: usize,
    /// Lines that could not be parsed.
    pub invalid: usize,
}

/// Parses one input line.
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_transition(line: &str) -> Result<Option<KeyTransition>, ParseError> {
    let content = line.split('#').next().unwrap_or_default();
    let mut fields = content.split_whitespace();

    let Some(action) = fields.next() else {
        return Ok(None);
    };
    let message = match action.to_ascii_lowercase().as_str() {
        "keydown" => WM_KEYDOWN,
        "keyup" => WM_KEYUP,
        _ => parse_number("action", action)?,
    };
    let key_code = parse_signed("key", fields.next())?;
    let scan_code = parse_signed("scan", fields.next())?;
    let character = parse_number("char", fields.next().ok_or(ParseError::MissingField("char"))?)?;

    let mut transition = KeyTransition {
        key_code,
        scan_code,
        action: KeyAction::from_window_message(message),
        character,
        is_extended: false,
        was_down: false,
    };
    for flag in fields {
        match flag.to_ascii_lowercase().as_str() {
            "extended" => transition.is_extended = true,
            "repeat" => transition.was_down = true,
            _ => return Err(ParseError::UnknownFlag(flag.to_string())),
        }
    }
    Ok(Some(transition))
}

fn parse_number(field: &'static str, token: &str) -> Result<u32, ParseError> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse(),
    };
    parsed.map_err(|_| ParseError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

fn parse_signed(field: &'static str, token: Option<&str>) -> Result<i32, ParseError> {
    let token = token.ok_or(ParseError::MissingField(field))?;
    let value = parse_number(field, token)?;
    i32::try_from(value).map_err(|_| ParseError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

/// Feeds every transition in `input` through `handler` and writes one
/// verdict line per transition to `out`.
///
/// Invalid lines are reported and skipped; they do not stop the replay.
///
/// Replies are awaited between writes, so `out` should not hold a lock that
/// log output also needs (pass `std::io::stdout()`, not a `StdoutLock`).
///
/// # Errors
///
/// Returns [`ReplayError`] only if reading `input` or writing `out` fails.
pub async fn run_replay<R, W>(
    handler: &KeyEventChannelHandler,
    input: R,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError>
where
    R: AsyncBufRead + Unpin,
    W: std::io::Write,
{
    let mut summary = ReplaySummary::default();
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.map_err(ReplayError::Read)? {
        line_no += 1;
        let transition = match parse_transition(&line) {
            Ok(Some(transition)) => transition,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping invalid replay line");
                summary.invalid += 1;
                writeln!(out, "line {line_no}: invalid: {e}").map_err(ReplayError::Write)?;
                continue;
            }
        };

        summary.events += 1;
        let verdict = match dispatch(handler, &transition).await {
            Verdict::Handled => {
                summary.handled += 1;
                "handled"
            }
            Verdict::NotHandled => "not handled",
            Verdict::Rejected => {
                summary.rejected += 1;
                "not handled (rejected)"
            }
        };
        writeln!(
            out,
            "line {line_no}: key 0x{:02X} {:?} -> {verdict}",
            transition.key_code, transition.action
        )
        .map_err(ReplayError::Write)?;
    }

    info!(
        events = summary.events,
        handled = summary.handled,
        rejected = summary.rejected,
        invalid = summary.invalid,
        "replay finished"
    );
    Ok(summary)
}

enum Verdict {
    Handled,
    NotHandled,
    Rejected,
}

async fn dispatch(handler: &KeyEventChannelHandler, transition: &KeyTransition) -> Verdict {
    let (tx, rx) = oneshot::channel();
    let disposition = handler.handle_transition(transition, move |handled| {
        let _ = tx.send(handled);
    });
    if let Disposition::Rejected(reason) = disposition {
        debug!(key_code = transition.key_code, %reason, "transition rejected");
        return Verdict::Rejected;
    }
    match rx.await {
        Ok(true) => Verdict::Handled,
        Ok(false) => Verdict::NotHandled,
        Err(_) => {
            warn!(key_code = transition.key_code, "key event reply was dropped by the transport");
            Verdict::NotHandled
        }
    }
}
