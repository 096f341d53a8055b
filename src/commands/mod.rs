//! Command implementations for prompty.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod check;
mod sample;
mod show;

use crate::cli::Command;
use prompty::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Show(args) => show::cmd_show(args),
        Command::Sample(args) => sample::cmd_sample(args),
        Command::Check(args) => check::cmd_check(args),
    }
}
