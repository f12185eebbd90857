use crate::graph::{ConnectionId, NodeId, Value};
use thiserror::Error;

/// Errors raised by the graph store when a mutation or lookup is invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("Node {0} already exists in this graph")]
    DuplicateNode(NodeId),

    #[error("Connection {0} already exists in this graph")]
    DuplicateConnection(ConnectionId),

    #[error("Node {node} has no {direction} port '{port}'")]
    PortNotFound {
        node: NodeId,
        direction: &'static str,
        port: String,
    },

    #[error("Input '{input}' of node {node} is already driven by connection {existing}")]
    InputOccupied {
        node: NodeId,
        input: String,
        existing: ConnectionId,
    },

    #[error("Cannot connect socket '{source_socket}' to socket '{target_socket}'")]
    IncompatibleSockets {
        source_socket: String,
        target_socket: String,
    },

    #[error("Boundary node {node} rejected the operation: {message}")]
    BoundaryViolation { node: NodeId, message: String },
}

/// Errors raised by group editors and group nodes while keeping their boundary in sync.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupError {
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Inner connection for boundary input '{0}' doesn't exist")]
    MissingInnerConnection(String),

    #[error("Node {0} is not a group node")]
    NotAGroup(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors that can occur while evaluating a graph.
#[derive(Error, Debug, Clone)]
pub enum EvaluationError {
    #[error("Input '{input}' of node {node} has no value")]
    InputNotFound { node: NodeId, input: String },

    #[error("Values of the inputs node {0} are not yet set")]
    InputsNotSet(NodeId),

    #[error("No processor registered for node label '{0}'")]
    UnknownProcessor(String),

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Cycle detected while evaluating node {0}")]
    Cycle(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Group(#[from] Box<GroupError>),
}

/// Errors that can occur when converting a definition into a live graph.
#[derive(Error, Debug, Clone)]
pub enum DefinitionError {
    #[error("Failed to parse definition JSON: {0}")]
    JsonParseError(String),

    #[error(
        "Node '{missing_node_id}' not found, which is required by a connection from node '{source_node_id}'"
    )]
    NodeNotFound {
        missing_node_id: String,
        source_node_id: String,
    },

    #[error("Node id '{0}' is defined more than once")]
    DuplicateNodeId(String),

    #[error("Invalid definition: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Group(#[from] GroupError),
}
