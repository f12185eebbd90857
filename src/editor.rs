//! The parent editor: a graph whose connection mutations are published to pipes.

use crate::error::{GraphError, GroupError};
use crate::graph::{Connection, ConnectionId, Graph, Node, NodeId};
use crate::group::GroupDispatcher;
use std::collections::VecDeque;

/// A connection mutation that has already been applied to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    ConnectionCreated(Connection),
    ConnectionRemoved(Connection),
}

impl GraphEvent {
    pub fn connection(&self) -> &Connection {
        match self {
            GraphEvent::ConnectionCreated(c) | GraphEvent::ConnectionRemoved(c) => c,
        }
    }
}

/// Observes graph events. A pipe may mutate the graph it is handed; connections it
/// removes on the way are returned so they can be published in turn.
pub trait Pipe {
    fn handle(&mut self, graph: &mut Graph, event: &GraphEvent) -> Result<Vec<GraphEvent>, GroupError>;
}

/// A graph plus the pipes observing it.
///
/// Every mutation returns only after all events it caused, including follow-ups
/// emitted by pipes, have been handled.
#[derive(Default)]
pub struct Editor {
    graph: Graph,
    pipes: Vec<Box<dyn Pipe>>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty editor with group dispatching enabled.
    pub fn with_node_groups() -> Self {
        Self::new().with_pipe(GroupDispatcher)
    }

    /// Wraps an existing graph. No events are published for its current content.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            pipes: Vec::new(),
        }
    }

    pub fn with_pipe(mut self, pipe: impl Pipe + 'static) -> Self {
        self.use_pipe(pipe);
        self
    }

    pub fn use_pipe(&mut self, pipe: impl Pipe + 'static) {
        self.pipes.push(Box::new(pipe));
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Direct access to the graph. Mutations made through it are not published.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.graph.node(id)
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GroupError> {
        Ok(self.graph.add_node(node)?)
    }

    /// Removes a node. Its connections are removed and published first, while the
    /// node is still in the graph, so a group node can release its boundary links.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GroupError> {
        self.graph.node(id)?;
        loop {
            let attached = self.graph.connections().find(|c| c.involves_node(id)).map(|c| c.id);
            match attached {
                Some(attached) => {
                    self.remove_connection(attached)?;
                }
                None => break,
            }
        }
        let (node, _) = self.graph.remove_node(id)?;
        Ok(node)
    }

    pub fn add_connection(&mut self, connection: Connection) -> Result<ConnectionId, GroupError> {
        let id = self.graph.add_connection(connection.clone())?;
        self.publish([GraphEvent::ConnectionCreated(connection)])?;
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<Connection, GroupError> {
        let connection = self.graph.remove_connection(id)?;
        self.publish([GraphEvent::ConnectionRemoved(connection.clone())])?;
        Ok(connection)
    }

    pub fn clear(&mut self) -> Result<(), GroupError> {
        let removed = self.graph.clear();
        self.publish(removed.into_iter().map(GraphEvent::ConnectionRemoved))
    }

    fn publish(&mut self, events: impl IntoIterator<Item = GraphEvent>) -> Result<(), GroupError> {
        let mut queue: VecDeque<GraphEvent> = events.into_iter().collect();
        while let Some(event) = queue.pop_front() {
            for pipe in self.pipes.iter_mut() {
                queue.extend(pipe.handle(&mut self.graph, &event)?);
            }
        }
        Ok(())
    }
}
