//! Stack builders.
//!
//! [`ChildStackBuilder`] turns one application class into its child template;
//! [`RootStackBuilder`] nests the finished children under the root template.
//!
//! # Modules
//!
//! - `child` - the per-class builder
//! - `common` - parameters every child receives from the root
//! - `function` - function properties and physical names
//! - `events` - schedule rules and invoke permissions
//! - `shared` - verbatim resource declarations
//! - `api_gateway` - the shared REST API
//! - `references` - marker checks on user-declared content
//! - `root` - root template assembly

pub mod api_gateway;
pub mod child;
pub mod common;
pub mod events;
pub mod function;
pub mod references;
pub mod root;
pub mod shared;

pub use child::ChildStackBuilder;
pub use common::CommonParameters;
pub use root::{ChildTemplate, ROOT_TEMPLATE_NAME, RootStackBuilder};
