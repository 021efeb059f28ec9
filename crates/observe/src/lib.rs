//! Logging setup shared by the binaries and tests of this workspace.
pub mod config;
pub mod tracing;

pub use config::Config;
