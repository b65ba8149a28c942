// ABOUTME: Library root for vshell — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod shell;

pub use error::{Result, ShellError};

/// Install the stderr tracing subscriber. `RUST_LOG` overrides the default `warn` filter.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
