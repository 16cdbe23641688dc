//! Template model: identifiers, intrinsic references, stack definitions and serialization.
//!
//! # Modules
//!
//! - [`logical_id`] - run-scoped registry that hands out collision-free logical IDs
//! - [`intrinsic`] - tagged intrinsic references and the [`Value`] property tree
//! - [`resource`] - resource kinds and definitions
//! - [`stack`] - [`StackDefinition`], one template under construction
//! - [`serializer`] - invariant checks and conversion to the final document
//!
//! # Example
//!
//! ```rust
//! use indexmap::IndexMap;
//! use stackforge::template::{serialize, Intrinsic, LogicalIdRegistry, ResourceKind, StackDefinition};
//! use std::sync::Arc;
//!
//! # fn example() -> stackforge::core::Result<()> {
//! let registry = Arc::new(LogicalIdRegistry::new());
//! let mut stack = StackDefinition::child("OrdersJob", registry);
//! let id = stack.add_resource(ResourceKind::Function, "process", IndexMap::new())?;
//! stack.add_output(&id, Intrinsic::reference(id.clone()))?;
//! let document = serialize(&mut stack)?;
//! assert!(document["Resources"].get("ProcessLambdaFunction").is_some());
//! # Ok(())
//! # }
//! ```

pub mod intrinsic;
pub mod logical_id;
pub mod resource;
pub mod serializer;
pub mod stack;

pub use intrinsic::{Intrinsic, PseudoParam, Value};
pub use logical_id::{LogicalIdRegistry, Scope, sanitize};
pub use resource::{ResourceDefinition, ResourceKind};
pub use serializer::{OutputFormat, TEMPLATE_FORMAT_VERSION, serialize};
pub use stack::{Parameter, ParameterBinding, StackDefinition};
