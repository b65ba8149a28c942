// ABOUTME: Session module — the user's logical shell state and the persistent action log.
// ABOUTME: Session paths are resolved lexically against the extraction directory.

pub mod log;
pub mod state;

pub use log::{ActionLog, ActionRecord};
pub use state::{Session, resolve};
