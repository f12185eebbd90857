//! The in-memory flow graph: nodes with typed ports and scalar controls, and
//! single-writer connections between them.

pub mod connection;
pub mod identifier;
pub mod node;
pub mod query;
pub mod value;

pub use connection::*;
pub use node::*;
pub use value::*;

use crate::error::GraphError;
use std::collections::BTreeMap;
use std::fmt;

/// A mutable store of nodes and connections.
///
/// Every connection's endpoints resolve to live nodes and ports of the same graph,
/// and an input port is driven by at most one connection. Iteration is in id order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeMap<ConnectionId, Connection>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node whose id is known to be fresh.
    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Removes a node together with every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(Node, Vec<Connection>), GraphError> {
        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        let attached: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves_node(id))
            .map(|c| c.id)
            .collect();
        let removed = attached
            .into_iter()
            .filter_map(|cid| self.connections.remove(&cid))
            .collect();
        Ok((node, removed))
    }

    pub fn add_connection(&mut self, connection: Connection) -> Result<ConnectionId, GraphError> {
        if self.connections.contains_key(&connection.id) {
            return Err(GraphError::DuplicateConnection(connection.id));
        }
        let source = self.node(connection.source)?;
        let output = source
            .output(&connection.source_output)
            .ok_or_else(|| GraphError::PortNotFound {
                node: connection.source,
                direction: "output",
                port: connection.source_output.clone(),
            })?;
        let target = self.node(connection.target)?;
        let input = target
            .input(&connection.target_input)
            .ok_or_else(|| GraphError::PortNotFound {
                node: connection.target,
                direction: "input",
                port: connection.target_input.clone(),
            })?;
        if !output.socket.is_compatible(&input.socket) {
            return Err(GraphError::IncompatibleSockets {
                source_socket: output.socket.name().to_string(),
                target_socket: input.socket.name().to_string(),
            });
        }
        if let Some(existing) = self.incoming(connection.target, &connection.target_input) {
            return Err(GraphError::InputOccupied {
                node: connection.target,
                input: connection.target_input.clone(),
                existing: existing.id,
            });
        }
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<Connection, GraphError> {
        self.connections
            .remove(&id)
            .ok_or(GraphError::ConnectionNotFound(id))
    }

    /// Removes everything, returning the connections that were dropped.
    pub fn clear(&mut self) -> Vec<Connection> {
        self.nodes.clear();
        std::mem::take(&mut self.connections).into_values().collect()
    }

    /// Consumes the graph, yielding its nodes and connections in id order.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Connection>) {
        (
            self.nodes.into_values().collect(),
            self.connections.into_values().collect(),
        )
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection(&self, id: ConnectionId) -> Result<&Connection, GraphError> {
        self.connections
            .get(&id)
            .ok_or(GraphError::ConnectionNotFound(id))
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The connection driving `input` of `node`, if any.
    pub fn incoming(&self, node: NodeId, input: &str) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.target == node && c.target_input == input)
    }

    /// All connections leaving `output` of `node`.
    pub fn outgoing<'a>(
        &'a self,
        node: NodeId,
        output: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .values()
            .filter(move |c| c.source == node && c.source_output == output)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, "")
    }
}

impl Graph {
    /// Renders the graph as a tree, descending into group nodes.
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let count = self.nodes.len();
        for (index, node) in self.nodes.values().enumerate() {
            let is_last = index + 1 == count && self.connections.is_empty();
            let branch = if is_last { "└── " } else { "├── " };
            write!(f, "{}{}{} [{}]", prefix, branch, node.id(), node.label())?;
            for (identifier, control) in node.controls() {
                write!(f, " {}={}", identifier, control.value())?;
            }
            writeln!(f)?;
            if let Some(group) = node.as_group() {
                let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                group.editor().graph().fmt_indented(f, &child_prefix)?;
            }
        }
        let count = self.connections.len();
        for (index, connection) in self.connections.values().enumerate() {
            let branch = if index + 1 == count { "└── " } else { "├── " };
            writeln!(f, "{}{}{}", prefix, branch, connection)?;
        }
        Ok(())
    }
}
