//! Error handling for stackforge
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`StackforgeError`]) so callers can tell a caller-input
//!    problem apart from a defect in the engine itself
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration errors**: invalid task names, unknown `depends_on` targets, dependency
//!   cycles, oversized policy names, unreadable manifests. These are deterministic problems
//!   with the caller's input; every offending item is reported at once.
//! - **Internal invariant violations**: a duplicate logical ID or a dangling intrinsic
//!   reference reaching the serializer, or a stack mutated after it was frozen. These are
//!   engine defects and are never tolerated silently.
//! - **I/O and format errors**: reading manifests and writing documents.
//!
//! Nothing here is retried: synthesis is a pure in-memory transformation, so re-running
//! with unchanged input reproduces the same failure.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stackforge::core::{StackforgeError, user_friendly_error};
//!
//! let error = StackforgeError::CircularDependency {
//!     chain: "OrdersJob → ShippingJob → OrdersJob".to_string(),
//! };
//! assert!(error.is_configuration_error());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for stackforge operations.
#[derive(Error, Debug)]
pub enum StackforgeError {
    /// One or more task method names are not valid function identifiers.
    ///
    /// Each entry has the form `Class#method`.
    #[error(
        "Detected invalid function names. Function names must start with a letter and can only contain letters, numbers, and underscores:\n{}",
        format_entries(.invalid)
    )]
    InvalidFunctionNames {
        /// Offending `Class#method` pairs, in declaration order
        invalid: Vec<String>,
    },

    /// One or more `depends_on` entries name a class that is not being synthesized.
    ///
    /// Each entry has the form `Class -> Missing`.
    #[error("Unknown depends_on targets:\n{}", format_entries(.missing))]
    UnknownDependencies {
        /// Offending `Class -> Missing` pairs
        missing: Vec<String>,
    },

    /// The `depends_on` graph contains a cycle.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// The cycle, rendered as `A → B → A`
        chain: String,
    },

    /// Declared inline policy names exceed the role-policy-name ceiling.
    #[error("Policy names exceed {max} characters:\n{}", format_entries(.names))]
    PolicyNamesTooLong {
        /// Offending `Class: name` entries
        names: Vec<String>,
        /// The platform ceiling
        max: usize,
    },

    /// A `!Ref`/`!GetAtt` marker written in a policy statement or declared resource names
    /// nothing the template declares.
    ///
    /// Each entry has the form `Template: marker (in LogicalId)`.
    #[error("Unresolved references in declared content:\n{}", format_entries(.references))]
    UnresolvedReferences {
        /// Offending references, in declaration order
        references: Vec<String>,
    },

    /// Several configuration problems were found in a single validation pass.
    #[error("Synthesis aborted with {} configuration problems:\n{}", .problems.len(), format_problems(.problems))]
    Validation {
        /// Every problem found, in detection order
        problems: Vec<StackforgeError>,
    },

    /// Configuration value is missing or malformed.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// The manifest file could not be found.
    #[error("Manifest file not found: {path}")]
    ManifestNotFound {
        /// Path that was searched
        path: String,
    },

    /// The manifest file exists but could not be parsed.
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Manifest path
        file: String,
        /// Parser message
        reason: String,
    },

    /// A logical ID appears twice in one template at serialization time.
    #[error("Duplicate logical ID '{logical_id}' in template '{template}'")]
    DuplicateLogicalId {
        /// Template name
        template: String,
        /// The duplicated identifier
        logical_id: String,
    },

    /// An intrinsic reference points at an identifier the template does not declare.
    #[error("Dangling reference '{reference}' in template '{template}'")]
    DanglingReference {
        /// Template name
        template: String,
        /// Marker form of the reference
        reference: String,
    },

    /// A stack definition was mutated after serialization began.
    #[error("Template '{template}' is frozen and cannot be modified")]
    TemplateFrozen {
        /// Template name
        template: String,
    },

    /// Wiring asked for an output a child stack does not declare.
    #[error("Stack '{class}' does not declare output '{output}'")]
    MissingOutput {
        /// Class whose stack lacks the output
        class: String,
        /// Output name that was requested
        output: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML rendering error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn format_entries(entries: &[String]) -> String {
    entries.iter().map(|e| format!("    {e}")).collect::<Vec<_>>().join("\n")
}

fn format_problems(problems: &[StackforgeError]) -> String {
    problems.iter().map(|p| format!("  - {p}")).collect::<Vec<_>>().join("\n")
}

impl StackforgeError {
    /// Returns true for deterministic caller-input problems.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFunctionNames { .. }
                | Self::UnknownDependencies { .. }
                | Self::CircularDependency { .. }
                | Self::PolicyNamesTooLong { .. }
                | Self::UnresolvedReferences { .. }
                | Self::Validation { .. }
                | Self::ConfigError { .. }
                | Self::ManifestNotFound { .. }
                | Self::ManifestParseError { .. }
        )
    }

    /// Returns true for violations of the engine's own invariants.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateLogicalId { .. }
                | Self::DanglingReference { .. }
                | Self::TemplateFrozen { .. }
                | Self::MissingOutput { .. }
        )
    }

    /// Fold a list of problems into one error.
    ///
    /// Returns `None` for an empty list and the problem itself when there is only one.
    #[must_use]
    pub fn from_problems(mut problems: Vec<StackforgeError>) -> Option<Self> {
        match problems.len() {
            0 => None,
            1 => problems.pop(),
            _ => Some(Self::Validation {
                problems,
            }),
        }
    }
}

impl Clone for StackforgeError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidFunctionNames {
                invalid,
            } => Self::InvalidFunctionNames {
                invalid: invalid.clone(),
            },
            Self::UnknownDependencies {
                missing,
            } => Self::UnknownDependencies {
                missing: missing.clone(),
            },
            Self::CircularDependency {
                chain,
            } => Self::CircularDependency {
                chain: chain.clone(),
            },
            Self::PolicyNamesTooLong {
                names,
                max,
            } => Self::PolicyNamesTooLong {
                names: names.clone(),
                max: *max,
            },
            Self::UnresolvedReferences {
                references,
            } => Self::UnresolvedReferences {
                references: references.clone(),
            },
            Self::Validation {
                problems,
            } => Self::Validation {
                problems: problems.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ManifestNotFound {
                path,
            } => Self::ManifestNotFound {
                path: path.clone(),
            },
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateLogicalId {
                template,
                logical_id,
            } => Self::DuplicateLogicalId {
                template: template.clone(),
                logical_id: logical_id.clone(),
            },
            Self::DanglingReference {
                template,
                reference,
            } => Self::DanglingReference {
                template: template.clone(),
                reference: reference.clone(),
            },
            Self::TemplateFrozen {
                template,
            } => Self::TemplateFrozen {
                template: template.clone(),
            },
            Self::MissingOutput {
                class,
                output,
            } => Self::MissingOutput {
                class: class.clone(),
                output: output.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::YamlError(e) => Self::Other {
                message: format!("YAML error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show the main message in red, optional details in yellow
/// and an optional suggestion in green.
///
/// ```rust,no_run
/// use stackforge::core::{ErrorContext, StackforgeError};
///
/// let context = ErrorContext::new(StackforgeError::ManifestNotFound {
///     path: "stackforge.toml".to_string(),
/// })
/// .with_suggestion("Pass --manifest-path or run from the project directory");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: StackforgeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: StackforgeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`StackforgeError`] (anywhere in the chain), [`std::io::Error`] and
/// [`toml::de::Error`]; anything else is wrapped with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(stackforge_error) = cause.downcast_ref::<StackforgeError>() {
            return create_error_context(stackforge_error.clone());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(StackforgeError::Other {
                    message: format!("Permission denied: {error:#}"),
                })
                .with_suggestion("Check ownership of the output directory or choose another with --output");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(StackforgeError::Other {
                    message: format!("File not found: {error:#}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(StackforgeError::ManifestParseError {
            file: "stackforge.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your manifest. Verify quotes, brackets, and table headers");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(StackforgeError::Other {
        message,
    })
}

fn create_error_context(error: StackforgeError) -> ErrorContext {
    match &error {
        StackforgeError::InvalidFunctionNames { .. } => ErrorContext::new(error)
            .with_suggestion("Rename the listed methods, e.g. 'bad-name' to 'bad_name'")
            .with_details("Each task becomes a compute function whose handler must be a plain identifier"),
        StackforgeError::UnknownDependencies { .. } => ErrorContext::new(error)
            .with_suggestion("Declare the missing classes in the manifest or remove them from depends_on"),
        StackforgeError::CircularDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Break the cycle by moving the shared resources into a separate shared stack")
            .with_details("Each stack in a cycle would need the other's outputs before it could be created"),
        StackforgeError::PolicyNamesTooLong { .. } => ErrorContext::new(error)
            .with_suggestion("Shorten policy_name or remove it to use the default name"),
        StackforgeError::UnresolvedReferences { .. } => ErrorContext::new(error)
            .with_suggestion("Reference a declared resource ID, a stack parameter such as S3Bucket, or a pseudo parameter")
            .with_details("Markers are resolved within one template; outputs of other classes arrive as parameters"),
        StackforgeError::ManifestNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --manifest-path or run from the directory containing stackforge.toml"),
        StackforgeError::ManifestParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax in your manifest"),
        StackforgeError::Validation { .. } => ErrorContext::new(error)
            .with_suggestion("Fix every listed problem and run again"),
        e if e.is_internal() => ErrorContext::new(error)
            .with_details("This is a defect in stackforge; the generated templates would be invalid")
            .with_suggestion("Please report this issue together with the manifest that triggered it"),
        _ => ErrorContext::new(error),
    }
}
