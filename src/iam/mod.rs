//! Execution-role composition.
//!
//! Declarations are merged from three levels before a role is composed:
//!
//! | Role            | Statements                  | Managed policies            |
//! |-----------------|-----------------------------|-----------------------------|
//! | application     | `[iam]`                     | `[iam]`                     |
//! | class           | `[iam]` + class             | `[iam]` + class             |
//! | task            | `[iam]` + class + task      | `[iam]` + class + task      |
//!
//! A class role is only built when the class declares something of its own, and a task
//! role only when the task does; otherwise functions fall back to the role one level up.

pub mod policy;
pub mod role;

pub use policy::{
    MANAGED_POLICY_ARN_PREFIX, ManagedPolicySet, POLICY_VERSION, PolicyDefinition, PolicyDocument,
    expand_managed_policy,
};
pub use role::{DEFAULT_POLICY_NAME, MAX_POLICY_NAME_LEN, RoleComposer, VPC_POLICY_NAME, vpc_policy_statement};
