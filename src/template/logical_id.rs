//! Logical-ID registry.
//!
//! Every resource, parameter and nested stack in a synthesis run receives its logical ID
//! from one shared [`LogicalIdRegistry`]. The registry sanitizes the desired identifier and
//! guarantees that two different underlying objects never receive the same ID within a
//! template, nor across a child template and the root template that nests it.
//!
//! IDs are partitioned by [`Scope`]. A child scope is checked against itself and the root
//! scope; the root scope is checked against every scope. Local claims, used for parameters,
//! are only checked against their own scope and never block other scopes. Disambiguators
//! are derived from a SHA-256 of the object key rather than from a global counter, so the
//! result only depends on the claims made within the scopes involved, not on how parallel
//! builds interleave.
//!
//! # Examples
//!
//! ```rust
//! use stackforge::template::LogicalIdRegistry;
//!
//! let registry = LogicalIdRegistry::new();
//! assert_eq!(registry.assign("orders_job"), "OrdersJob");
//! // A different object that sanitizes to the same ID gets a suffix
//! let other = registry.assign("orders-job");
//! assert!(other.starts_with("OrdersJob") && other != "OrdersJob");
//! // Asking again for the same object is stable
//! assert_eq!(registry.assign("orders_job"), "OrdersJob");
//! ```

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Length of the hash-based disambiguator appended on collision.
const DISAMBIGUATOR_LEN: usize = 8;

/// The template an identifier belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The root template.
    Root,
    /// The child template generated for an application class.
    Child(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Child(class) => write!(f, "{class}"),
        }
    }
}

#[derive(Debug, Default)]
struct ScopeState {
    /// object key -> final ID
    by_key: HashMap<String, String>,
    /// final ID -> object key
    owners: HashMap<String, String>,
    /// final IDs visible to this scope only
    local: HashSet<String>,
}

/// Run-scoped, thread-safe mapping from desired identifiers to final logical IDs.
#[derive(Debug, Default)]
pub struct LogicalIdRegistry {
    scopes: Mutex<HashMap<Scope, ScopeState>>,
}

impl LogicalIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an ID in the root scope, using the desired string itself as the object key.
    pub fn assign(&self, desired: &str) -> String {
        self.assign_scoped(&Scope::Root, desired, desired)
    }

    /// Assign an ID for the object identified by `key` within `scope`.
    ///
    /// Never fails: invalid characters are removed by sanitization and collisions are
    /// resolved with a deterministic suffix.
    pub fn assign_scoped(&self, scope: &Scope, key: &str, desired: &str) -> String {
        self.claim(scope, key, desired, false)
    }

    /// Like [`assign_scoped`](Self::assign_scoped), but the ID only has to be unique within
    /// `scope` and does not reserve anything in related scopes.
    pub fn assign_local(&self, scope: &Scope, key: &str, desired: &str) -> String {
        self.claim(scope, key, desired, true)
    }

    fn claim(&self, scope: &Scope, key: &str, desired: &str, local: bool) -> String {
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = scopes.get(scope).and_then(|s| s.by_key.get(key)) {
            return existing.clone();
        }

        let base = sanitize(desired);
        let mut candidate = base.clone();
        if is_taken(&scopes, scope, &candidate, key, local) {
            let hash = hex::encode(Sha256::digest(key.as_bytes()));
            candidate = format!("{base}{}", &hash[..DISAMBIGUATOR_LEN]);
            let mut counter = 2;
            while is_taken(&scopes, scope, &candidate, key, local) {
                candidate = format!("{base}{}{counter}", &hash[..DISAMBIGUATOR_LEN]);
                counter += 1;
            }
            debug!("Logical ID '{}' already taken in {}, assigned '{}' to {}", base, scope, candidate, key);
        }

        let state = scopes.entry(scope.clone()).or_default();
        state.by_key.insert(key.to_string(), candidate.clone());
        state.owners.insert(candidate.clone(), key.to_string());
        if local {
            state.local.insert(candidate.clone());
        }
        candidate
    }

    /// The ID previously assigned to `key` in `scope`, if any.
    pub fn lookup(&self, scope: &Scope, key: &str) -> Option<String> {
        let scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        scopes.get(scope).and_then(|s| s.by_key.get(key)).cloned()
    }
}

fn is_taken(scopes: &HashMap<Scope, ScopeState>, scope: &Scope, id: &str, key: &str, local: bool) -> bool {
    scopes.iter().any(|(other_scope, state)| {
        if other_scope == scope {
            return state.owners.get(id).is_some_and(|owner| owner != key);
        }
        let related = matches!((scope, other_scope), (Scope::Root, _) | (_, Scope::Root));
        related && !local && !state.local.contains(id) && state.owners.contains_key(id)
    })
}

/// Turn an arbitrary string into a valid logical ID.
///
/// Splits on every non-alphanumeric character, capitalizes each segment and joins them.
/// An empty result becomes `Resource`; a leading digit gets an `Id` prefix.
#[must_use]
pub fn sanitize(desired: &str) -> String {
    let mut id: String = desired
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if id.is_empty() {
        id = "Resource".to_string();
    } else if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert_str(0, "Id");
    }
    id
}
