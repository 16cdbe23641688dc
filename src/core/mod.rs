//! Core types for stackforge
//!
//! This module holds the error system shared by every stage of a synthesis run:
//! - [`StackforgeError`] - Enumerated error types covering configuration problems,
//!   engine invariant violations and I/O failures
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Examples
//!
//! ```rust
//! use stackforge::core::{StackforgeError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(StackforgeError::ManifestNotFound { path: "stackforge.toml".into() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, StackforgeError, user_friendly_error};

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, StackforgeError>;
