//! Class dependency graph.
//!
//! Nodes are application classes; an edge `A -> B` means class `A` consumes outputs of
//! class `B` (`A.depends_on` contains `B`). The graph provides cycle detection, a build
//! order in which every dependency comes before its dependents, and the transitive
//! closure used to pull dependencies into a partial synthesis.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{Result, StackforgeError};
use crate::manifest::ApplicationClass;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Dependency graph between application classes.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build the graph for a set of descriptors.
    ///
    /// Nodes are added in descriptor order before any edge, so every ordering this graph
    /// produces breaks ties by declaration order.
    pub fn from_classes(classes: &[ApplicationClass]) -> Self {
        let mut graph = Self::new();
        for class in classes {
            graph.add_class(&class.name);
        }
        for class in classes {
            for dep in &class.depends_on {
                graph.add_dependency(&class.name, dep);
            }
        }
        graph
    }

    /// Add a node if it doesn't already exist and return its index.
    pub fn add_class(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// `from` depends on `to`, meaning `to` must be built before `from`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.add_class(from);
        let to_idx = self.add_class(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles using DFS with colors.
    ///
    /// Returns [`StackforgeError::CircularDependency`] naming the cycle, e.g.
    /// `OrdersJob → ShippingJob → OrdersJob`.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let chain = cycle.iter().map(|idx| self.graph[*idx].as_str()).collect::<Vec<_>>().join(" → ");
                return Err(StackforgeError::CircularDependency {
                    chain,
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.sorted_neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let cycle_start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[cycle_start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Classes in an order where all dependencies come before their dependents.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.detect_cycles()?;

        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect()),
            Err(cycle) => Err(StackforgeError::CircularDependency {
                chain: self.graph[cycle.node_id()].clone(),
            }),
        }
    }

    /// Group classes into build layers.
    ///
    /// A class's layer is one more than the deepest layer among its dependencies, so every
    /// class in layer `n` depends only on classes in layers `< n`. Within a layer, classes
    /// keep declaration order.
    pub fn topological_layers(&self) -> Result<Vec<Vec<String>>> {
        let order = self.topological_order()?;

        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        for name in &order {
            let idx = self.node_map[name];
            let layer = self.graph.neighbors(idx).filter_map(|dep| depth.get(&dep)).map(|d| d + 1).max().unwrap_or(0);
            depth.insert(idx, layer);
        }

        let layer_count = depth.values().max().map_or(0, |max| max + 1);
        let mut layers: Vec<Vec<String>> = vec![Vec::new(); layer_count];
        for idx in self.graph.node_indices() {
            if let Some(&layer) = depth.get(&idx) {
                layers[layer].push(self.graph[idx].clone());
            }
        }
        Ok(layers)
    }

    /// All classes `name` depends on, directly or indirectly.
    pub fn get_transitive_deps(&self, name: &str) -> HashSet<String> {
        let mut deps = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&node_idx) = self.node_map.get(name) {
            queue.push_back(node_idx);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Direct dependencies of `name`, in declaration order.
    pub fn get_direct_deps(&self, name: &str) -> Vec<String> {
        match self.node_map.get(name) {
            Some(&node_idx) => self.sorted_neighbors(node_idx).into_iter().map(|idx| self.graph[idx].clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Classes nothing else depends on.
    pub fn roots(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|idx| self.graph.neighbors_directed(*idx, petgraph::Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> Vec<String> {
        self.graph.node_indices().map(|idx| self.graph[idx].clone()).collect()
    }

    /// Render the dependencies of `root` as a tree.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();
        self.build_tree_string(root, &mut result, "", true, &mut visited);
        result
    }

    fn build_tree_string(
        &self,
        node: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let deps = self.get_direct_deps(node);
        for (i, dep) in deps.iter().enumerate() {
            let is_last_child = i == deps.len() - 1;
            self.build_tree_string(dep, result, &child_prefix, is_last_child, visited);
        }
        visited.remove(node);
    }

    /// petgraph yields neighbors newest-edge first; sort by node index for declaration order.
    fn sorted_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
