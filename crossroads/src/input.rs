//! # Command Pump
//!
//! Reads newline-delimited JSON commands from a reader (stdin in the binary)
//! on a dedicated thread and forwards them to the controller's channel, so
//! the controller never blocks on I/O itself.
//!
//! Malformed lines are logged and skipped. When the reader reaches EOF the
//! sender is dropped, which the controller sees as a closed channel.

use anyhow::{Context, Result};
use runtime::Command;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Spawns the pump thread. The caller keeps the handle only to join it on
/// exit; dropping it detaches the thread.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn start<R>(reader: R, commands: Sender<Command>) -> Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("command-pump".into())
        .spawn(move || pump(reader, &commands))
        .context("Failed to spawn command pump thread")
}

fn pump<R: BufRead>(reader: R, commands: &Sender<Command>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Command input error: {e:?}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                debug!(?command, "Command received.");
                if commands.send(command).is_err() {
                    // Controller is gone; nothing left to feed.
                    break;
                }
            }
            Err(e) => warn!("Ignoring malformed command {line:?}: {e}"),
        }
    }
    info!("Command input closed.");
}
