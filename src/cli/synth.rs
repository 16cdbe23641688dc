//! The `synth` command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::synth::{Synthesizer, select_classes, write_output};
use crate::template::OutputFormat;

#[derive(Args, Debug)]
pub struct SynthCommand {
    /// Directory the templates are written to.
    #[arg(short, long, default_value = "build/templates")]
    output: PathBuf,

    /// Document format; overrides `[output] format` from the manifest.
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only synthesize these classes (and the classes they depend on).
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Deployment environment; overrides `project.env` and `STACKFORGE_ENV`.
    #[arg(long)]
    env: Option<String>,

    /// Synthesize and list the documents without writing them.
    #[arg(long)]
    dry_run: bool,
}

impl SynthCommand {
    pub async fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>, quiet: bool) -> Result<()> {
        let manifest_path = find_manifest_with_optional(manifest_path)
            .context("No stackforge.toml found. Create one to describe your application classes.")?;
        let Manifest {
            mut config,
            classes,
        } = Manifest::load(&manifest_path)?;
        debug!("Using manifest {}", manifest_path.display());

        if let Some(env) = self.env {
            config.project.env = env;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }

        let classes = select_classes(&classes, &self.only)?;
        let output = Synthesizer::new(config).synthesize(&classes).await?;

        if self.dry_run {
            for template in output.templates() {
                println!("{}", template.file_name);
            }
            return Ok(());
        }

        let written = write_output(&output, &self.output).await?;
        if !quiet {
            println!(
                "{} Synthesized {} templates into {}",
                "✓".green(),
                written.len(),
                self.output.display().to_string().cyan()
            );
        }
        Ok(())
    }
}
