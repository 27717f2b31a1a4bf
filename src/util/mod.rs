//! Shared utilities

pub mod config;
pub mod fs;
pub mod process;

pub use config::{OptionKey, OptionOverrides, Options};
pub use process::{CommandRunner, ProcessBuilder, StreamingRunner};
