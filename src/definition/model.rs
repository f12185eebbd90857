use crate::error::DefinitionError;
use crate::graph::{Connection, Graph, Input, Node, NodeId, Output, Socket, Value};
use crate::transform::NodeGroupTemplate;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps the string ids of a definition to the ids of the nodes built from it.
pub type NodeIndex = AHashMap<String, NodeId>;

/// The canonical import format of a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDefinition {
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default, alias = "edges")]
    pub connections: Vec<ConnectionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub inputs: Vec<PortDefinition>,
    #[serde(default)]
    pub outputs: Vec<PortDefinition>,
    #[serde(default)]
    pub controls: BTreeMap<String, Value>,
}

/// An input or output port. The socket defaults to the wildcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDefinition {
    pub id: String,
    #[serde(default = "default_socket")]
    pub socket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_socket() -> String {
    Socket::ANY.to_string()
}

impl PortDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            socket: default_socket(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDefinition {
    pub source: String,
    #[serde(alias = "sourceOutput")]
    pub source_output: String,
    pub target: String,
    #[serde(alias = "targetInput")]
    pub target_input: String,
}

impl ConnectionDefinition {
    pub fn new(
        source: impl Into<String>,
        source_output: impl Into<String>,
        target: impl Into<String>,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_output: source_output.into(),
            target: target.into(),
            target_input: target_input.into(),
        }
    }
}

/// A named template graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub identifier: String,
    pub graph: GraphDefinition,
}

impl GraphDefinition {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        serde_json::from_str(json).map_err(|e| DefinitionError::JsonParseError(e.to_string()))
    }

    /// Checks ids and port sets without building anything.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut seen = AHashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(DefinitionError::ValidationError(format!(
                    "node labelled '{}' has an empty id",
                    node.label
                )));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(DefinitionError::DuplicateNodeId(node.id.clone()));
            }
            for (direction, ports) in [("input", &node.inputs), ("output", &node.outputs)] {
                let mut ids = AHashSet::new();
                if let Some(port) = ports.iter().find(|p| !ids.insert(p.id.as_str())) {
                    return Err(DefinitionError::ValidationError(format!(
                        "node '{}' declares {} '{}' twice",
                        node.id, direction, port.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds a live graph. Node ids are freshly allocated; the returned index maps
    /// the definition's string ids onto them.
    pub fn build(&self) -> Result<(Graph, NodeIndex), DefinitionError> {
        self.validate()?;
        let mut graph = Graph::new();
        let mut index = NodeIndex::with_capacity(self.nodes.len());

        for definition in &self.nodes {
            let mut node = Node::new(definition.label.clone());
            for port in &definition.inputs {
                let input = Input {
                    socket: Socket::new(port.socket.clone()),
                    label: port.label.clone(),
                };
                node.add_input(&port.id, input)?;
            }
            for port in &definition.outputs {
                let output = Output {
                    socket: Socket::new(port.socket.clone()),
                    label: port.label.clone(),
                };
                node.add_output(&port.id, output)?;
            }
            for (identifier, value) in &definition.controls {
                node.add_control(identifier, value.clone());
            }
            index.insert(definition.id.clone(), graph.add_node(node)?);
        }

        for connection in &self.connections {
            let lookup = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| DefinitionError::NodeNotFound {
                        missing_node_id: id.to_string(),
                        source_node_id: connection.source.clone(),
                    })
            };
            let source = lookup(&connection.source)?;
            let target = lookup(&connection.target)?;
            graph.add_connection(Connection::new(
                source,
                connection.source_output.clone(),
                target,
                connection.target_input.clone(),
            ))?;
        }
        Ok((graph, index))
    }
}

impl TemplateDefinition {
    /// Parses a JSON array of templates.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, DefinitionError> {
        serde_json::from_str(json).map_err(|e| DefinitionError::JsonParseError(e.to_string()))
    }

    pub fn into_template(self) -> Result<NodeGroupTemplate, DefinitionError> {
        let (graph, _) = self.graph.build()?;
        Ok(NodeGroupTemplate::from_graph(self.identifier, graph)?)
    }
}
