//! Dependency resolution between application classes.
//!
//! - [`dependency_graph`] orders classes and rejects cycles
//! - [`wiring`] connects each consumer parameter to its producer's output

pub mod dependency_graph;
pub mod wiring;

pub use dependency_graph::DependencyGraph;
pub use wiring::{DependencyExport, DependencyExports, StackWiring, WiringPlan, wire};
