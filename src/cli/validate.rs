//! The `validate` command.
//!
//! Runs every manifest check the synthesizer runs and reports all problems at once, then
//! synthesizes in memory so markers in declared policies and properties are resolved too.
//! Nothing is written.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::synth::Synthesizer;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

impl ValidateCommand {
    pub async fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>, quiet: bool) -> Result<()> {
        let manifest_path = find_manifest_with_optional(manifest_path)
            .context("No stackforge.toml found. Create one to describe your application classes.")?;
        let manifest = Manifest::load(&manifest_path)?;
        let synthesizer = Synthesizer::new(manifest.config);

        let result = match synthesizer.validate(&manifest.classes).and_then(|graph| graph.topological_layers()) {
            Ok(layers) => synthesizer.synthesize(&manifest.classes).await.map(|_| layers),
            Err(e) => Err(e),
        };

        if self.format == "json" {
            let json = match &result {
                Ok(layers) => serde_json::json!({
                    "valid": true,
                    "classes": manifest.classes.len(),
                    "layers": layers,
                }),
                Err(e) => serde_json::json!({
                    "valid": false,
                    "errors": [e.to_string()],
                }),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }

        let layers = result?;
        if self.format == "text" && !quiet {
            println!(
                "{} {} is valid ({} classes, {} build layers)",
                "✓".green(),
                manifest_path.display(),
                manifest.classes.len(),
                layers.len()
            );
        }
        Ok(())
    }
}
