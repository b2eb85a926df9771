//! CLI module for timetrack.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, EditArgs, HostArgs};
pub use display::{Display, SIGN_IN_HINT};
