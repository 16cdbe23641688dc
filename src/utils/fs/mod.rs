//! File system utilities for writing rendered templates.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stackforge::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("build/templates"))?;
//! atomic_write(Path::new("build/templates/stackforge-root.yml"), b"Resources: {}\n")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;

pub use atomic::{atomic_write, atomic_write_multiple};
pub use dirs::ensure_dir;
