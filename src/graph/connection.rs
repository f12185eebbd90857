use super::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A specific input port inside a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputPosition {
    pub node: NodeId,
    pub input: String,
}

/// A specific output port inside a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputPosition {
    pub node: NodeId,
    pub output: String,
}

impl InputPosition {
    pub fn new(node: NodeId, input: impl Into<String>) -> Self {
        Self {
            node,
            input: input.into(),
        }
    }
}

impl OutputPosition {
    pub fn new(node: NodeId, output: impl Into<String>) -> Self {
        Self {
            node,
            output: output.into(),
        }
    }
}

/// A directed edge from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: NodeId,
    pub source_output: String,
    pub target: NodeId,
    pub target_input: String,
}

impl Connection {
    /// Creates a connection with a fresh id.
    pub fn new(
        source: NodeId,
        source_output: impl Into<String>,
        target: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId::next(),
            source,
            source_output: source_output.into(),
            target,
            target_input: target_input.into(),
        }
    }

    pub fn output_position(&self) -> OutputPosition {
        OutputPosition::new(self.source, self.source_output.clone())
    }

    pub fn input_position(&self) -> InputPosition {
        InputPosition::new(self.target, self.target_input.clone())
    }

    pub fn involves_node(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source, self.source_output, self.target, self.target_input
        )
    }
}
