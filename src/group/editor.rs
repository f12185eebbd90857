use super::dispatch;
use crate::editor::GraphEvent;
use crate::error::{GraphError, GroupError};
use crate::graph::identifier::unique_identifier;
use crate::graph::query::{unconnected_inputs, unconnected_outputs};
use crate::graph::{
    Connection, ConnectionId, Graph, Input, InputPosition, Node, NodeId, NodeKind, Output,
    OutputPosition, ValueMap,
};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A graph whose floating ports are mirrored as boundary ports.
///
/// The editor owns two pseudo-nodes: an inputs node whose outputs stand for values
/// injected from outside the group, and an outputs node whose inputs stand for
/// values exported to the outside. After every structural change the boundary is
/// recomputed from the graph's connectivity, see [`GroupEditor::resync`].
#[derive(Debug, Clone)]
pub struct GroupEditor {
    graph: Graph,
    inputs_node: NodeId,
    outputs_node: NodeId,
    input_map: BTreeMap<String, InputPosition>,
    output_map: BTreeMap<String, OutputPosition>,
    /// Boundary inputs currently driven from outside the group.
    outer_links: BTreeSet<String>,
    /// Boundary inputs that were ever driven from outside. Their identifiers are
    /// never handed to a different inner input.
    registered: BTreeSet<String>,
}

impl Default for GroupEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupEditor {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let inputs_node = graph.insert_node(Node::inputs_node());
        let outputs_node = graph.insert_node(Node::outputs_node());
        Self {
            graph,
            inputs_node,
            outputs_node,
            input_map: BTreeMap::new(),
            output_map: BTreeMap::new(),
            outer_links: BTreeSet::new(),
            registered: BTreeSet::new(),
        }
    }

    /// Builds an editor around existing nodes and connections, syncing the boundary once.
    pub fn from_parts(nodes: Vec<Node>, connections: Vec<Connection>) -> Result<Self, GroupError> {
        let mut editor = Self::new();
        for node in nodes {
            editor.graph.add_node(node)?;
        }
        for connection in connections {
            editor.insert_connection(connection)?;
        }
        editor.resync()?;
        Ok(editor)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn inputs_node_id(&self) -> NodeId {
        self.inputs_node
    }

    pub fn outputs_node_id(&self) -> NodeId {
        self.outputs_node
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GroupError> {
        let id = self.graph.add_node(node)?;
        self.resync()?;
        Ok(id)
    }

    /// Removes a node and its connections. The boundary nodes cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GroupError> {
        if id == self.inputs_node || id == self.outputs_node {
            return Err(GraphError::BoundaryViolation {
                node: id,
                message: "boundary nodes belong to their group editor".to_string(),
            }
            .into());
        }
        self.graph.node(id)?;
        // Nested groups must see their links go while they are still here.
        loop {
            let attached = self.graph.connections().find(|c| c.involves_node(id)).map(|c| c.id);
            match attached {
                Some(attached) => {
                    self.remove_connection(attached, false)?;
                }
                None => break,
            }
        }
        let (node, _) = self.graph.remove_node(id)?;
        self.resync()?;
        Ok(node)
    }

    pub fn add_connection(
        &mut self,
        connection: Connection,
        sync_boundary: bool,
    ) -> Result<ConnectionId, GroupError> {
        let id = self.insert_connection(connection)?;
        if sync_boundary {
            self.resync()?;
        }
        Ok(id)
    }

    pub fn remove_connection(
        &mut self,
        id: ConnectionId,
        sync_boundary: bool,
    ) -> Result<Connection, GroupError> {
        let connection = self.graph.remove_connection(id)?;
        self.notify([GraphEvent::ConnectionRemoved(connection.clone())])?;
        if sync_boundary {
            self.resync()?;
        }
        Ok(connection)
    }

    /// Drops every node except the boundary nodes and forgets all boundary state.
    pub fn clear(&mut self) -> Result<(), GroupError> {
        let (mut inputs, _) = self.graph.remove_node(self.inputs_node)?;
        let (mut outputs, _) = self.graph.remove_node(self.outputs_node)?;
        self.graph.clear();
        inputs.set_outputs(BTreeMap::new());
        if let NodeKind::GroupInput { values } = inputs.kind_mut() {
            *values = None;
        }
        outputs.set_inputs(BTreeMap::new());
        self.graph.insert_node(inputs);
        self.graph.insert_node(outputs);
        self.input_map.clear();
        self.output_map.clear();
        self.outer_links.clear();
        self.registered.clear();
        self.resync()
    }

    /// Called when a connection from outside attaches to boundary input `identifier`.
    pub fn outer_input_connected(&mut self, identifier: &str) -> Result<(), GroupError> {
        let position = self.exposed_input(identifier)?;
        let link = Connection::new(
            self.inputs_node,
            identifier,
            position.node,
            position.input,
        );
        self.insert_connection(link)?;
        self.outer_links.insert(identifier.to_string());
        self.registered.insert(identifier.to_string());
        debug!("Boundary input '{}' is now driven from outside", identifier);
        self.resync()
    }

    /// Called when the outside connection of boundary input `identifier` goes away.
    pub fn outer_input_disconnected(&mut self, identifier: &str) -> Result<(), GroupError> {
        let position = self.exposed_input(identifier)?;
        let inner = self
            .graph
            .connections()
            .find(|c| {
                c.source == self.inputs_node
                    && c.source_output == identifier
                    && c.target == position.node
                    && c.target_input == position.input
            })
            .map(|c| c.id)
            .ok_or_else(|| GroupError::MissingInnerConnection(identifier.to_string()))?;
        self.remove_connection(inner, false)?;
        self.outer_links.remove(identifier);
        self.registered.insert(identifier.to_string());
        debug!("Boundary input '{}' is no longer driven from outside", identifier);
        self.resync()
    }

    /// The externally visible inputs, derived from the inputs node's outputs.
    pub fn outer_inputs(&self) -> BTreeMap<String, Input> {
        self.graph
            .node(self.inputs_node)
            .map(|node| {
                node.outputs()
                    .iter()
                    .map(|(identifier, output)| (identifier.clone(), Input::from(output)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The externally visible outputs, derived from the outputs node's inputs.
    pub fn outer_outputs(&self) -> BTreeMap<String, Output> {
        self.graph
            .node(self.outputs_node)
            .map(|node| {
                node.inputs()
                    .iter()
                    .map(|(identifier, input)| (identifier.clone(), Output::from(input)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn input_position(&self, identifier: &str) -> Option<&InputPosition> {
        self.input_map.get(identifier)
    }

    pub fn output_position(&self, identifier: &str) -> Option<&OutputPosition> {
        self.output_map.get(identifier)
    }

    /// The boundary identifier currently mapped to an inner input.
    pub fn input_identifier(&self, position: &InputPosition) -> Option<String> {
        self.input_map
            .iter()
            .find(|(_, p)| *p == position)
            .map(|(identifier, _)| identifier.clone())
    }

    /// The boundary identifier currently mapped to an inner output.
    pub fn output_identifier(&self, position: &OutputPosition) -> Option<String> {
        self.output_map
            .iter()
            .find(|(_, p)| *p == position)
            .map(|(identifier, _)| identifier.clone())
    }

    pub fn is_externally_driven(&self, identifier: &str) -> bool {
        self.outer_links.contains(identifier)
    }

    pub fn is_externally_registered(&self, identifier: &str) -> bool {
        self.registered.contains(identifier)
    }

    /// Injects the values the inputs node emits on the next evaluation.
    pub fn set_input_values(&mut self, input_values: ValueMap) -> Result<(), GroupError> {
        if let NodeKind::GroupInput { values } = self.graph.node_mut(self.inputs_node)?.kind_mut() {
            *values = Some(input_values);
        }
        Ok(())
    }

    /// Recomputes the boundary from the graph's connectivity.
    ///
    /// 1. Connections leaving the inputs node or entering the outputs node are dropped.
    /// 2. Every input without a connection gets an inputs-node output. An input keeps
    ///    its identifier for as long as it stays unconnected.
    /// 3. Inputs driven from outside get their link from the inputs node back.
    /// 4. Every output without a connection gets an outputs-node input and is wired to it.
    ///
    /// Resyncing is idempotent.
    pub fn resync(&mut self) -> Result<(), GroupError> {
        let generated: Vec<Connection> = self
            .graph
            .connections()
            .filter(|c| c.source == self.inputs_node || c.target == self.outputs_node)
            .cloned()
            .collect();
        for connection in &generated {
            self.graph.remove_connection(connection.id)?;
        }

        let boundary = [self.inputs_node, self.outputs_node];
        let floating = unconnected_inputs(&self.graph, &boundary);
        let graph = &self.graph;
        let registered = &self.registered;
        self.input_map.retain(|identifier, position| {
            floating.contains(position)
                || (registered.contains(identifier)
                    && graph
                        .node(position.node)
                        .is_ok_and(|node| node.has_input(&position.input)))
        });
        let mut boundary_outputs = BTreeMap::new();
        for position in floating {
            let identifier = match self.input_identifier(&position) {
                Some(identifier) => identifier,
                None => {
                    let identifier = unique_identifier(&position.input, |candidate| {
                        self.input_map.contains_key(candidate)
                    });
                    self.input_map.insert(identifier.clone(), position.clone());
                    identifier
                }
            };
            let input = self.inner_input(&position)?;
            boundary_outputs.insert(identifier, Output::from(input));
        }
        self.graph
            .node_mut(self.inputs_node)?
            .set_outputs(boundary_outputs);

        let inputs_node = self.graph.node(self.inputs_node)?;
        let stale: Vec<String> = self
            .outer_links
            .iter()
            .filter(|identifier| !inputs_node.has_output(identifier))
            .cloned()
            .collect();
        for identifier in stale {
            debug!(
                "Boundary input '{}' vanished, dropping its outside link",
                identifier
            );
            self.outer_links.remove(&identifier);
        }
        let mut restored = Vec::new();
        for identifier in &self.outer_links {
            if let Some(position) = self.input_map.get(identifier) {
                let link = Connection::new(
                    self.inputs_node,
                    identifier.clone(),
                    position.node,
                    position.input.clone(),
                );
                self.graph.add_connection(link.clone())?;
                restored.push(link);
            }
        }

        let floating = unconnected_outputs(&self.graph, &boundary);
        self.output_map
            .retain(|_, position| floating.contains(position));
        let mut boundary_inputs = BTreeMap::new();
        let mut exports = Vec::new();
        for position in floating {
            let identifier = match self.output_identifier(&position) {
                Some(identifier) => identifier,
                None => {
                    let identifier = unique_identifier(&position.output, |candidate| {
                        self.output_map.contains_key(candidate)
                    });
                    self.output_map.insert(identifier.clone(), position.clone());
                    identifier
                }
            };
            let output = self.inner_output(&position)?;
            boundary_inputs.insert(identifier.clone(), Input::from(output));
            exports.push(Connection::new(
                position.node,
                position.output,
                self.outputs_node,
                identifier,
            ));
        }
        self.graph
            .node_mut(self.outputs_node)?
            .set_inputs(boundary_inputs);
        for export in exports {
            self.graph.add_connection(export)?;
        }

        // Nested groups fed by a link that was not restored must learn about it.
        let lost = generated.into_iter().filter(|old| {
            old.source == self.inputs_node
                && !restored.iter().any(|new| {
                    new.source_output == old.source_output
                        && new.target == old.target
                        && new.target_input == old.target_input
                })
        });
        let lost: Vec<GraphEvent> = lost.map(GraphEvent::ConnectionRemoved).collect();
        self.notify(lost)?;

        debug!(
            "Resynced group boundary: {} inputs, {} outputs",
            self.input_map.len(),
            self.output_map.len()
        );
        Ok(())
    }

    fn exposed_input(&self, identifier: &str) -> Result<InputPosition, GroupError> {
        let inputs_node = self.graph.node(self.inputs_node)?;
        match self.input_map.get(identifier) {
            Some(position) if inputs_node.has_output(identifier) => Ok(position.clone()),
            _ => Err(GroupError::InvalidIdentifier(identifier.to_string())),
        }
    }

    fn inner_input(&self, position: &InputPosition) -> Result<&Input, GraphError> {
        self.graph
            .node(position.node)?
            .input(&position.input)
            .ok_or_else(|| GraphError::PortNotFound {
                node: position.node,
                direction: "input",
                port: position.input.clone(),
            })
    }

    fn inner_output(&self, position: &OutputPosition) -> Result<&Output, GraphError> {
        self.graph
            .node(position.node)?
            .output(&position.output)
            .ok_or_else(|| GraphError::PortNotFound {
                node: position.node,
                direction: "output",
                port: position.output.clone(),
            })
    }

    fn insert_connection(&mut self, connection: Connection) -> Result<ConnectionId, GroupError> {
        let id = self.graph.add_connection(connection.clone())?;
        self.notify([GraphEvent::ConnectionCreated(connection)])?;
        Ok(id)
    }

    /// Forwards connection events to group nodes nested in this editor.
    fn notify(&mut self, events: impl IntoIterator<Item = GraphEvent>) -> Result<(), GroupError> {
        let mut queue: VecDeque<GraphEvent> = events.into_iter().collect();
        while let Some(event) = queue.pop_front() {
            queue.extend(dispatch::propagate(&mut self.graph, &event)?);
        }
        Ok(())
    }
}
