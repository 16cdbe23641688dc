//! Integration test suite for stackforge
//!
//! End-to-end tests for synthesis runs and the `stackforge` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **synthesis**: full runs through the library API
//! - **validation**: configuration errors abort before anything is rendered
//! - **cli**: the `synth`, `validate` and `graph` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod synthesis;
mod validation;
