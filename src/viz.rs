// src/viz.rs

//! GraphViz rendering of a scenario (`-v`).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use tracing::{info, warn};

use crate::dag::{Registry, TaskId};
use crate::errors::Result;

pub const DOT_FILE: &str = "taskdag.dot";
pub const PNG_FILE: &str = "taskdag.png";

/// One node of the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VizNode {
    pub name: String,
    pub is_final: bool,
    pub frozen: bool,
}

impl fmt::Display for VizNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Edge weight: "the target depends on the source".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependsOn;

impl fmt::Display for DependsOn {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

/// Graph of the scenario tasks plus the frozen tasks they depend on.
///
/// Edges point from a dependency to the task that needs it. Dependencies
/// that are neither in the scenario nor frozen are left out.
pub fn build_graph(
    registry: &Registry,
    scenario: &[TaskId],
    final_tasks: &[TaskId],
    frozen: &HashSet<TaskId>,
) -> DiGraph<VizNode, DependsOn> {
    let finals: HashSet<TaskId> = final_tasks.iter().copied().collect();
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<TaskId, NodeIndex> = HashMap::new();

    let mut node_for = |graph: &mut DiGraph<VizNode, DependsOn>, id: TaskId| {
        *nodes.entry(id).or_insert_with(|| {
            graph.add_node(VizNode {
                name: registry.name_of(id).to_string(),
                is_final: finals.contains(&id),
                frozen: frozen.contains(&id),
            })
        })
    };

    let members: HashSet<TaskId> = scenario.iter().copied().collect();
    for &id in scenario {
        let target = node_for(&mut graph, id);
        for &dep in registry.get(id).dependencies() {
            if members.contains(&dep) || frozen.contains(&dep) {
                let source = node_for(&mut graph, dep);
                graph.add_edge(source, target, DependsOn);
            }
        }
    }

    graph
}

/// Render `graph` in DOT format.
pub fn render_dot(graph: &DiGraph<VizNode, DependsOn>) -> String {
    let edge_attrs =
        |_: &DiGraph<VizNode, DependsOn>, _: EdgeReference<'_, DependsOn>| String::new();
    let node_attrs = |_: &DiGraph<VizNode, DependsOn>, (_, node): (NodeIndex, &VizNode)| {
        let shape = if node.is_final { "box" } else { "ellipse" };
        if node.frozen {
            format!("shape = {shape} color = blue")
        } else {
            format!("shape = {shape}")
        }
    };
    let dot = Dot::with_attr_getters(
        graph,
        &[Config::EdgeNoLabel],
        &edge_attrs,
        &node_attrs,
    );
    format!("{dot}")
}

/// Write `<output>/taskdag.dot` and try to render `<output>/taskdag.png`.
///
/// A missing or failing `dot` binary is only a warning; the `.dot` file is
/// still written. Returns the path of the `.dot` file.
pub fn write_and_render(
    registry: &Registry,
    scenario: &[TaskId],
    final_tasks: &[TaskId],
    frozen: &HashSet<TaskId>,
) -> Result<PathBuf> {
    let output_root = registry.output_root();
    let graph = build_graph(registry, scenario, final_tasks, frozen);

    let dot_path = output_root.join(DOT_FILE);
    fs::write(&dot_path, render_dot(&graph))
        .with_context(|| format!("writing graph to {:?}", dot_path))?;
    info!(path = ?dot_path, nodes = graph.node_count(), "wrote task graph");

    render_png(&dot_path, &output_root.join(PNG_FILE));
    Ok(dot_path)
}

fn render_png(dot_path: &Path, png_path: &Path) {
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg("-o")
        .arg(png_path)
        .arg(dot_path)
        .status();

    match status {
        Ok(status) if status.success() => {
            info!(path = ?png_path, "rendered task graph");
        }
        Ok(status) => {
            warn!(code = ?status.code(), "`dot` failed to render the task graph");
        }
        Err(e) => {
            warn!(error = %e, "could not run `dot`; is GraphViz installed?");
        }
    }
}
