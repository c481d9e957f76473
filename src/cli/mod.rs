//! Command-line interface
//!
//! Argument parsing, command handlers, and the terminal port adapter.

pub mod args;
pub mod commands;
pub mod terminal;
