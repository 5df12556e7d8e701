//! Command-line interface for bug-forge.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands, GenerateArgs};
