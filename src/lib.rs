//! stackforge - nested infrastructure templates for serverless applications
//!
//! Application classes (controllers, jobs, plain functions and shared
//! infrastructure) are described in `stackforge.toml`. Each class becomes one child
//! template holding its functions, roles, schedules and declared resources; a root
//! template nests every child, owns what they share (the deploy bucket parameter,
//! the application role and the REST API) and wires each class's outputs into the
//! classes that depend on it.
//!
//! # Core Modules
//!
//! - [`template`] - logical IDs, intrinsic references, stack definitions, serializer
//! - [`iam`] - inline and managed policy composition into roles
//! - [`builder`] - child and root stack builders
//! - [`resolver`] - dependency graph and cross-stack wiring
//! - [`synth`] - runs validation, builds, wiring and serialization; writes documents
//!
//! # Supporting Modules
//!
//! - [`manifest`] - class descriptors and manifest loading
//! - [`config`] - project-wide settings
//! - [`core`] - error types
//! - [`cli`] - the `stackforge` binary's commands
//! - [`utils`] - atomic file writes
//!
//! # Manifest Format (stackforge.toml)
//!
//! ```toml
//! [project]
//! name = "shop"
//! env = "dev"
//!
//! [iam]
//! policy = ["logs"]
//!
//! [[classes]]
//! name = "OrdersJob"
//!
//! [[classes.tasks]]
//! name = "process"
//! schedule = "rate(5 minutes)"
//!
//! [[classes]]
//! name = "ShippingJob"
//! depends_on = ["OrdersJob"]
//!
//! [[classes.tasks]]
//! name = "ship"
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use stackforge::manifest::Manifest;
//! use stackforge::synth::{Synthesizer, write_output};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let manifest = Manifest::load(Path::new("stackforge.toml"))?;
//! let output = Synthesizer::new(manifest.config).synthesize(&manifest.classes).await?;
//! write_output(&output, Path::new("build/templates")).await?;
//! # Ok(())
//! # }
//! ```

// Engine
pub mod builder;
pub mod iam;
pub mod resolver;
pub mod synth;
pub mod template;

// Input
pub mod config;
pub mod manifest;

// Supporting modules
pub mod cli;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
