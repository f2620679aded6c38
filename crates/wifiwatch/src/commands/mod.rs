//! Command dispatch: bridges CLI args -> core streams -> output formatting.

pub mod classify;
pub mod config_cmd;
pub mod replay;
pub mod states;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a config-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Classify(args) => classify::handle(&args, cfg, global),
        Command::States(args) => states::handle(&args, global),
        Command::Replay(args) => replay::handle(&args, cfg, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
