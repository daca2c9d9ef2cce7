//! Command-line front end for buildman.
//!
//! The binary is a thin wrapper: argument definitions live in [`cli`], one
//! module per subcommand in [`commands`], and logging set-up in [`logging`].

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat};
