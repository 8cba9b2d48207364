//! Key event host entry point.
//!
//! Wires the key event channel to an in-process framework stand-in and
//! replays scripted key transitions through it.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()                -- TOML, defaults when absent
//!  └─ LoopbackMessenger            -- Tokio delivery worker
//!       └─ ConfiguredResponder     -- registered on the key event channel
//!  └─ KeyEventChannelHandler       -- platform modifier reader
//!  └─ run_replay()                 -- stdin or --input file
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use keyevent_core::{KeyEventChannelHandler, KeyEventOptions, LoopbackMessenger};
use keyevent_host::application::replay::run_replay;
use keyevent_host::application::responder::ConfiguredResponder;
use keyevent_host::infrastructure::key_state::platform_modifier_reader;
use keyevent_host::infrastructure::logging;
use keyevent_host::infrastructure::storage::config::load_config;

/// Replays key transitions through the key event channel.
#[derive(Debug, Parser)]
#[command(name = "keyevent-host", version, about)]
struct Args {
    /// Configuration file.  Defaults to the platform config directory.
    #[arg(long, env = "KEYEVENT_HOST_CONFIG")]
    config: Option<PathBuf>,

    /// Replay script.  Reads standard input when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    logging::init(&config.logging.level);

    info!(channel = %config.channel.name, "key event host starting");

    let messenger = Arc::new(LoopbackMessenger::spawn(&tokio::runtime::Handle::current()));
    messenger.set_message_handler(
        config.channel.name.clone(),
        Some(Arc::new(ConfiguredResponder::new(
            config.responder.handled_key_codes.iter().copied(),
        ))),
    );
    let handler = KeyEventChannelHandler::with_options(
        messenger,
        platform_modifier_reader(),
        KeyEventOptions::from(&config.channel),
    );

    let input: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open replay input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    // `Stdout` locks per write; the replay awaits replies between lines.
    let summary = run_replay(&handler, input, &mut std::io::stdout()).await?;

    info!(
        events = summary.events,
        handled = summary.handled,
        pending = handler.pending_events(),
        "key event host stopped"
    );
    Ok(())
}
