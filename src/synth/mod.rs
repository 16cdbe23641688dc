//! Synthesis runs.
//!
//! A [`Synthesizer`] turns a set of application classes into rendered template documents:
//!
//! 1. **Validate** every class and collect every problem before failing
//! 2. **Order** classes into dependency layers (cycles are rejected here)
//! 3. **Build** child stacks, one blocking worker per class, layer by layer
//! 4. **Wire** dependency parameters to producer outputs
//! 5. **Assemble** the root template around the children
//! 6. **Serialize** every stack
//!
//! Nothing is written to disk during a run; [`output::write_output`] writes the finished
//! documents afterwards, so a failing run leaves the output directory untouched.
//!
//! # Determinism
//!
//! Root-level logical IDs are claimed before any child build starts, and each child
//! scope is only ever touched by the worker building it. Identical input therefore
//! yields identical documents regardless of how workers interleave.

pub mod output;

use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::builder::common::validate_extra_parameters;
use crate::builder::{ChildStackBuilder, ChildTemplate, ROOT_TEMPLATE_NAME, RootStackBuilder};
use crate::config::SynthConfig;
use crate::core::{Result, StackforgeError};
use crate::manifest::{
    ApplicationClass, validate_dependency_targets, validate_function_names, validate_policy_names,
    validate_structure,
};
use crate::resolver::{DependencyExport, DependencyExports, DependencyGraph, wire};
use crate::template::{LogicalIdRegistry, OutputFormat, StackDefinition, serialize};

pub use output::write_output;

/// One serialized template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    /// Class name, or the root template name.
    pub name: String,
    /// File name including the format extension.
    pub file_name: String,
    pub document: serde_json::Value,
}

impl RenderedTemplate {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        format.render(&self.document)
    }
}

/// Every document produced by a run.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub format: OutputFormat,
    pub root: RenderedTemplate,
    /// Child templates in declaration order.
    pub children: Vec<RenderedTemplate>,
}

impl SynthesisOutput {
    /// The root template followed by every child.
    pub fn templates(&self) -> impl Iterator<Item = &RenderedTemplate> {
        std::iter::once(&self.root).chain(self.children.iter())
    }

    pub fn child(&self, class: &str) -> Option<&RenderedTemplate> {
        self.children.iter().find(|t| t.name == class)
    }

    /// Render every document as `(file name, text)`, root first.
    pub fn render_all(&self) -> Result<Vec<(String, String)>> {
        self.templates().map(|t| t.render(self.format).map(|text| (t.file_name.clone(), text))).collect()
    }
}

/// Runs synthesis for one configuration.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: Arc<SynthConfig>,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Check the configuration and `classes`, and build their dependency graph.
    ///
    /// Every problem is collected first; a single problem is returned as-is and several
    /// are folded into [`StackforgeError::Validation`]. Cycle detection only runs once
    /// every `depends_on` target is known.
    pub fn validate(&self, classes: &[ApplicationClass]) -> Result<DependencyGraph> {
        let mut problems = validate_extra_parameters(&self.config);
        problems.extend(validate_structure(classes));
        if let Err(e) = validate_function_names(classes) {
            problems.push(e);
        }
        if let Err(e) = validate_policy_names(classes) {
            problems.push(e);
        }

        let graph = DependencyGraph::from_classes(classes);
        match validate_dependency_targets(classes) {
            Ok(()) => {
                if let Err(e) = graph.detect_cycles() {
                    problems.push(e);
                }
            }
            Err(e) => problems.push(e),
        }

        if let Some(error) = StackforgeError::from_problems(problems) {
            return Err(error);
        }

        debug!("Validated {} classes with {} dependency edges", graph.node_count(), graph.edge_count());
        Ok(graph)
    }

    /// Synthesize the root template and one child template per class.
    pub async fn synthesize(&self, classes: &[ApplicationClass]) -> Result<SynthesisOutput> {
        let graph = self.validate(classes)?;
        let layers = graph.topological_layers()?;
        info!("Synthesizing {} classes in {} layers", classes.len(), layers.len());

        let registry = Arc::new(LogicalIdRegistry::new());
        let root = RootStackBuilder::new(&self.config, Arc::clone(&registry), classes);

        let by_name: HashMap<&str, &ApplicationClass> = classes.iter().map(|c| (c.name.as_str(), c)).collect();
        let mut built: HashMap<String, StackDefinition> = HashMap::new();
        let mut exports = DependencyExports::new();

        for (depth, layer) in layers.iter().enumerate() {
            debug!("Building layer {}: {}", depth, layer.join(", "));

            let mut tasks = Vec::new();
            for name in layer {
                let Some(class) = by_name.get(name.as_str()) else {
                    continue;
                };
                let class = (*class).clone();
                let config = Arc::clone(&self.config);
                let registry = Arc::clone(&registry);
                let dependencies: DependencyExports = class
                    .depends_on
                    .iter()
                    .filter_map(|dep| exports.get(dep).map(|export| (dep.clone(), export.clone())))
                    .collect();

                tasks.push(tokio::task::spawn_blocking(move || {
                    ChildStackBuilder::new(&class, &config, registry, &dependencies)
                        .build()
                        .map(|stack| (class.name, stack))
                }));
            }

            let results = try_join_all(tasks).await.map_err(|e| StackforgeError::Other {
                message: format!("Child stack build task failed: {e}"),
            })?;

            for result in results {
                let (name, stack) = result?;
                let stack_id = root.stack_id(&name).ok_or_else(|| StackforgeError::Other {
                    message: format!("No nested stack ID was claimed for '{name}'"),
                })?;
                exports.insert(name.clone(), DependencyExport::new(&name, stack_id, stack.output_names()));
                built.insert(name, stack);
            }
        }

        let format = self.config.output.format;
        let children: Vec<ChildTemplate> = classes
            .iter()
            .filter_map(|class| {
                built.remove(&class.name).map(|stack| ChildTemplate {
                    class: class.name.clone(),
                    template_file: class.template_file(format),
                    stack,
                })
            })
            .collect();

        let plan = wire(children.iter().map(|c| &c.stack), &exports)?;
        let mut root_stack = root.assemble(&children, &plan)?;

        let root = RenderedTemplate {
            name: ROOT_TEMPLATE_NAME.to_string(),
            file_name: format!("{ROOT_TEMPLATE_NAME}.{}", format.extension()),
            document: serialize(&mut root_stack)?,
        };
        let mut rendered = Vec::with_capacity(children.len());
        for mut child in children {
            let document = serialize(&mut child.stack)?;
            rendered.push(RenderedTemplate {
                name: child.class,
                file_name: child.template_file,
                document,
            });
        }

        info!("Synthesized {} child templates", rendered.len());
        Ok(SynthesisOutput {
            format,
            root,
            children: rendered,
        })
    }
}

/// Restrict `all` to the classes named in `only` plus everything they depend on.
///
/// An empty `only` selects every class. Declaration order is kept.
pub fn select_classes(all: &[ApplicationClass], only: &[String]) -> Result<Vec<ApplicationClass>> {
    if only.is_empty() {
        return Ok(all.to_vec());
    }

    let known: HashSet<&str> = all.iter().map(|c| c.name.as_str()).collect();
    let unknown: Vec<&str> = only.iter().map(String::as_str).filter(|name| !known.contains(name)).collect();
    if !unknown.is_empty() {
        return Err(StackforgeError::ConfigError {
            message: format!("Unknown classes selected: {}", unknown.join(", ")),
        });
    }

    let graph = DependencyGraph::from_classes(all);
    let mut selected: HashSet<String> = only.iter().cloned().collect();
    for name in only {
        selected.extend(graph.get_transitive_deps(name));
    }

    Ok(all.iter().filter(|c| selected.contains(&c.name)).cloned().collect())
}
