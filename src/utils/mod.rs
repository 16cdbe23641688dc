//! Utilities shared by the synthesizer and the CLI.
//!
//! # Modules
//!
//! - [`fs`] - directory creation and atomic writes

pub mod fs;

pub use fs::{atomic_write, atomic_write_multiple, ensure_dir};
