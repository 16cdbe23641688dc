//! The `graph` command: display `depends_on` relations between application classes.
//!
//! # Output Format
//!
//! ## Tree Format (Default)
//! ```text
//! └── ShippingJob
//!     └── OrdersJob
//! └── CleanupJob
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::resolver::DependencyGraph;

#[derive(Args, Debug)]
pub struct GraphCommand {
    /// Output format (tree, json)
    #[arg(short = 'f', long, default_value = "tree", value_parser = ["tree", "json"])]
    format: String,

    /// Only show this class and what it depends on.
    #[arg(short = 'c', long)]
    class: Option<String>,
}

impl GraphCommand {
    pub async fn execute_with_manifest_path(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let manifest_path = find_manifest_with_optional(manifest_path)
            .context("No stackforge.toml found. Create one to describe your application classes.")?;
        let manifest = Manifest::load(&manifest_path)?;
        let graph = DependencyGraph::from_classes(&manifest.classes);

        if let Some(class) = &self.class
            && manifest.class(class).is_none()
        {
            return Err(anyhow::anyhow!("Class '{class}' is not declared in {}", manifest_path.display()));
        }

        match self.format.as_str() {
            "json" => self.print_json(&graph),
            _ => {
                self.print_tree(&graph);
                Ok(())
            }
        }
    }

    fn selected_roots(&self, graph: &DependencyGraph) -> Vec<String> {
        match &self.class {
            Some(class) => vec![class.clone()],
            None => {
                // Every class sits on a cycle; show each one so the cycle is visible.
                let roots = graph.roots();
                if roots.is_empty() {
                    graph.nodes()
                } else {
                    roots
                }
            }
        }
    }

    fn print_tree(&self, graph: &DependencyGraph) {
        if graph.is_empty() {
            println!("No application classes found.");
            return;
        }
        for root in self.selected_roots(graph) {
            print!("{}", graph.to_tree_string(&root));
        }
        if let Ok(order) = graph.topological_order() {
            println!();
            println!("{} {}", "Build order:".bold(), order.join(", "));
        }
    }

    fn print_json(&self, graph: &DependencyGraph) -> Result<()> {
        let classes: serde_json::Map<String, serde_json::Value> = graph
            .nodes()
            .into_iter()
            .filter(|name| self.class.as_ref().is_none_or(|c| c == name || graph.get_transitive_deps(c).contains(name)))
            .map(|name| {
                let deps = graph.get_direct_deps(&name);
                (name, serde_json::json!(deps))
            })
            .collect();

        let layers = graph.topological_layers().ok();
        let json = serde_json::json!({
            "classes": classes,
            "layers": layers,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        Ok(())
    }
}
