//! Workflow graph <-> linear tool chain.
//!
//! A chain follows at most one outgoing edge per node. When a node has
//! several outgoing edges the last one wins and the others are dropped, so
//! branching graphs do not survive [`compile`]. [`expand`] links each entry
//! to the first entry with a matching tool, so repeated tool types do not
//! survive it either.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ActionError;
use crate::registry::ToolType;

/// Canvas position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
}

/// Workflow node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node id
    pub id: String,
    /// Tool type name; untyped nodes are ignored
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Canvas position
    #[serde(default)]
    pub position: Position,
    /// Editor payload
    #[serde(default)]
    pub data: Value,
}

impl Node {
    /// Tool type of this node; `Ok(None)` when untyped
    pub fn tool(&self) -> Result<Option<ToolType>, ActionError> {
        match self.kind.as_deref() {
            None | Some("") => Ok(None),
            Some(kind) => kind.parse().map(Some),
        }
    }
}

/// Directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge id
    pub id: String,
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Editor edge type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Nodes and edges as drawn in the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// One link of a tool chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolChainEntry {
    /// Tool at this position
    pub tool: ToolType,
    /// Tool that runs next, if any
    pub next_tool: Option<ToolType>,
}

/// Ordered tool chain
pub type ToolChain = Vec<ToolChainEntry>;

/// Compile a graph into a tool chain.
///
/// Every typed node appears exactly once. Walks start at nodes without
/// incoming edges, in node order; nodes no walk reaches (isolated, or only
/// reachable through a dropped branch or a cycle) become singleton entries.
///
/// # Errors
///
/// `UnknownTool` when a node carries a type outside the supported set.
pub fn compile(graph: &WorkflowGraph) -> Result<ToolChain, ActionError> {
    let mut tools: HashMap<&str, ToolType> = HashMap::new();
    for node in &graph.nodes {
        if let Some(tool) = node.tool()? {
            tools.insert(node.id.as_str(), tool);
        }
    }

    // last write wins
    let mut next: HashMap<&str, &str> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for edge in &graph.edges {
        next.insert(edge.source.as_str(), edge.target.as_str());
        has_incoming.insert(edge.target.as_str());
    }

    let mut chain = Vec::with_capacity(tools.len());
    let mut visited: HashSet<&str> = HashSet::new();

    for head in graph
        .nodes
        .iter()
        .filter(|node| !has_incoming.contains(node.id.as_str()))
    {
        let mut current = head.id.as_str();
        loop {
            if visited.contains(current) {
                break;
            }
            let Some(&tool) = tools.get(current) else {
                break;
            };
            visited.insert(current);

            let successor = next
                .get(current)
                .and_then(|id| tools.get(id).map(|tool| (*id, *tool)));
            match successor {
                Some((id, next_tool)) => {
                    chain.push(ToolChainEntry {
                        tool,
                        next_tool: Some(next_tool),
                    });
                    current = id;
                }
                None => {
                    chain.push(ToolChainEntry {
                        tool,
                        next_tool: None,
                    });
                    break;
                }
            }
        }
    }

    for node in &graph.nodes {
        if visited.contains(node.id.as_str()) {
            continue;
        }
        if let Some(&tool) = tools.get(node.id.as_str()) {
            chain.push(ToolChainEntry {
                tool,
                next_tool: None,
            });
        }
    }

    Ok(chain)
}

/// Rebuild a graph from a chain with one node per entry, laid out left to
/// right. An entry's edge points at the first entry whose tool matches its
/// `next_tool`.
pub fn expand(chain: &[ToolChainEntry]) -> WorkflowGraph {
    let nodes: Vec<Node> = chain
        .iter()
        .enumerate()
        .map(|(index, entry)| Node {
            id: format!("{}-{}", entry.tool, index + 1),
            kind: Some(entry.tool.to_string()),
            position: Position {
                x: 100.0 + index as f64 * 200.0,
                y: 100.0,
            },
            data: json!({ "label": entry.tool.as_str() }),
        })
        .collect();

    let edges = chain
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let next_tool = entry.next_tool?;
            let target = chain.iter().position(|e| e.tool == next_tool)?;
            let source = &nodes[index].id;
            let target = &nodes[target].id;
            Some(Edge {
                id: format!("edge-{}-{}", source, target),
                source: source.clone(),
                target: target.clone(),
                kind: Some("custom".to_string()),
            })
        })
        .collect();

    WorkflowGraph { nodes, edges }
}
