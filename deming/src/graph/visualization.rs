//! Graph visualization: Graphviz DOT and a plain-text listing of the compiled topology.
//!
//! Conditional edges are drawn from their path map (dashed, labeled with the routing key).
//! Output is sorted so it is stable across runs.

use std::fmt::Write;

use super::{CompiledStateGraph, NextEntry};
use super::{END, START};

/// (from, to, Some(routing key) for conditional edges), sorted by source node.
fn edges<S>(graph: &CompiledStateGraph<S>) -> Vec<(String, String, Option<String>)>
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    let mut out = vec![(START.to_string(), graph.first_node_id.clone(), None)];
    for id in graph.node_ids() {
        match graph.next_map.get(&id) {
            Some(NextEntry::Unconditional(to)) => out.push((id.clone(), to.clone(), None)),
            Some(NextEntry::Conditional(router)) => {
                for (key, to) in router.targets() {
                    out.push((id.clone(), to, Some(key)));
                }
            }
            None => {}
        }
    }
    out
}

/// Graphviz DOT representation of the graph.
pub fn generate_dot<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];",
        START
    );
    let _ = writeln!(
        dot,
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];",
        END
    );
    for id in graph.node_ids() {
        let _ = writeln!(dot, "  \"{}\";", id);
    }
    dot.push('\n');
    for (from, to, key) in edges(graph) {
        match key {
            Some(key) => {
                let _ = writeln!(
                    dot,
                    "  \"{}\" -> \"{}\" [style=dashed, label=\"{}\"];",
                    from, to, key
                );
            }
            None => {
                let _ = writeln!(dot, "  \"{}\" -> \"{}\";", from, to);
            }
        }
    }
    dot.push_str("}\n");
    dot
}

/// Plain-text listing: node count, then one line per edge.
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    let mut text = String::new();
    let _ = writeln!(text, "Graph Structure:");
    let _ = writeln!(text, "Nodes: {}", graph.nodes.len());
    let _ = writeln!(text, "\nEdges:");
    for (from, to, key) in edges(graph) {
        match key {
            Some(key) => {
                let _ = writeln!(text, "  {} -> {} (if {})", from, to, key);
            }
            None => {
                let _ = writeln!(text, "  {} -> {}", from, to);
            }
        }
    }
    text
}
