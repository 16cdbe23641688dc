//! Command-line interface for stackforge.
//!
//! The binary is a thin shell over the library: it finds and loads the manifest,
//! then hands the descriptors to the [`Synthesizer`](crate::synth::Synthesizer).
//!
//! # Commands
//!
//! - `synth` - synthesize and write every template
//! - `validate` - check the manifest without writing anything
//! - `graph` - show the `depends_on` graph and build order
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--manifest-path` - Use a specific `stackforge.toml`
//!
//! # Examples
//!
//! ```bash
//! stackforge synth --output build/templates
//! stackforge synth --only ShippingJob --format json
//! stackforge --verbose validate
//! stackforge graph --format json
//! ```

mod graph;
mod synth;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Forced log filter. When `None`, `RUST_LOG` is used and falls back to `info`.
    pub log_level: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber. Logs go to stderr so JSON printed on
    /// stdout stays machine-readable. Only the first call has any effect.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Synthesize nested infrastructure templates for serverless applications.
#[derive(Parser)]
#[command(
    name = "stackforge",
    about = "Synthesize nested infrastructure templates for serverless applications",
    version,
    long_about = "stackforge reads application class descriptors from stackforge.toml and writes a root template plus one nested child template per class."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the manifest file (stackforge.toml).
    ///
    /// By default the current directory and its parents are searched.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the root template and every child template.
    Synth(synth::SynthCommand),

    /// Validate the manifest without rendering anything.
    Validate(validate::ValidateCommand),

    /// Show the dependency graph between application classes.
    Graph(graph::GraphCommand),
}

impl Cli {
    /// Execute the parsed command line.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("off".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Synth(cmd) => cmd.execute_with_manifest_path(self.manifest_path, self.quiet).await,
            Commands::Validate(cmd) => cmd.execute_with_manifest_path(self.manifest_path, self.quiet).await,
            Commands::Graph(cmd) => cmd.execute_with_manifest_path(self.manifest_path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config() {
        let cli = Cli::parse_from(["stackforge", "--verbose", "validate"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["stackforge", "synth", "--quiet"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("off"));

        let cli = Cli::parse_from(["stackforge", "graph"]);
        assert_eq!(cli.build_config(), CliConfig::new());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["stackforge", "-v", "-q", "synth"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
