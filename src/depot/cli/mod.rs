//! # CLI Behavior
//!
//! This is **one possible UI client** for depot, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and
//! output formatting.
//!
//! ## Naked Execution (`depot`)
//!
//! Running `depot` with no arguments starts the interactive menu, same as
//! `depot menu`. Leaving the menu saves any changes.
//!
//! ## One-shot Commands
//!
//! Every other subcommand does one thing and exits. Those that touch the
//! warehouse log in first with the global `--user` and `--password`; when
//! the password is left out it is read from the terminal without echo, or
//! from the first line of stdin when stdin is not a terminal. Commands that
//! change products or orders save before exiting.
//!
//! ## Module Structure
//!
//! - `commands`: Dispatch and per-command handlers
//! - `menu`: The interactive menus
//! - `render`: Output formatting (tables, invoice, report chart, messages)
//! - `setup`: Argument parsing via clap

mod commands;
mod menu;
mod render;
pub mod setup;

pub use commands::run;
