//! Canalnav CLI library.
//!
//! Subcommand handlers and output formatting for the `canalnav` binary. The
//! binary only parses arguments and dispatches into this crate.

pub mod commands;
pub mod output;
