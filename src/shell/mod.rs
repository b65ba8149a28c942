// ABOUTME: Interactive shell — command parsing, filesystem handlers, and the REPL loop.
// ABOUTME: Supports exit, ls, cd, rm, and tree against the extracted archive.

pub mod command;
pub mod fs_ops;
pub mod repl;

pub use command::{Command, ParsedLine, parse_line};
pub use repl::{Flow, Shell, ShellOptions};
