use super::GroupEditor;
use crate::error::{EvaluationError, GroupError};
use crate::evaluator::Evaluation;
use crate::graph::{Connection, ConnectionId, Graph, Node, NodeId, NodeKind, ValueMap};

/// A node that owns a nested [`GroupEditor`] and exposes its boundary as its own ports.
///
/// The ports of the parent-graph node are a derived view of the editor's boundary.
/// They are regenerated by [`GroupNode::update_io`], never patched by hand.
/// Operations that touch the parent graph take it as an explicit argument.
#[derive(Debug, Clone)]
pub struct GroupNode {
    editor: GroupEditor,
}

impl GroupNode {
    pub const DEFAULT_LABEL: &'static str = "NodeGroup";

    pub fn new(editor: GroupEditor) -> Self {
        Self { editor }
    }

    pub fn editor(&self) -> &GroupEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut GroupEditor {
        &mut self.editor
    }

    pub fn into_editor(self) -> GroupEditor {
        self.editor
    }

    /// Wraps the group into a parent-graph node whose ports mirror the boundary.
    pub fn into_node(self, label: impl Into<String>) -> Node {
        let inputs = self.editor.outer_inputs();
        let outputs = self.editor.outer_outputs();
        let mut node = Node::with_kind(label, NodeKind::Group(Box::new(self)));
        node.set_inputs(inputs);
        node.set_outputs(outputs);
        node
    }

    /// Regenerates the ports of group node `id` and prunes parent connections that
    /// point at ports which no longer exist. Returns the pruned connections.
    pub fn update_io(graph: &mut Graph, id: NodeId) -> Result<Vec<Connection>, GroupError> {
        let node = graph.node_mut(id)?;
        let group = node.as_group().ok_or(GroupError::NotAGroup(id))?;
        let inputs = group.editor.outer_inputs();
        let outputs = group.editor.outer_outputs();
        node.set_inputs(inputs);
        node.set_outputs(outputs);

        let node = graph.node(id)?;
        let stale: Vec<ConnectionId> = graph
            .connections()
            .filter(|c| {
                (c.target == id && !node.has_input(&c.target_input))
                    || (c.source == id && !node.has_output(&c.source_output))
            })
            .map(|c| c.id)
            .collect();
        let mut pruned = Vec::with_capacity(stale.len());
        for connection_id in stale {
            pruned.push(graph.remove_connection(connection_id)?);
        }
        Ok(pruned)
    }

    /// An outside connection attached to one of the group's inputs.
    pub fn input_connection_created(
        graph: &mut Graph,
        connection: &Connection,
    ) -> Result<Vec<Connection>, GroupError> {
        Self::group_mut(graph, connection.target)?
            .editor
            .outer_input_connected(&connection.target_input)?;
        Self::update_io(graph, connection.target)
    }

    /// An outside connection detached from one of the group's inputs.
    pub fn input_connection_removed(
        graph: &mut Graph,
        connection: &Connection,
    ) -> Result<Vec<Connection>, GroupError> {
        Self::group_mut(graph, connection.target)?
            .editor
            .outer_input_disconnected(&connection.target_input)?;
        Self::update_io(graph, connection.target)
    }

    /// Evaluates the nested graph with `inputs` injected at its inputs node.
    ///
    /// `inputs` must carry a value for every driven boundary input; a missing key
    /// surfaces as the engine's error.
    pub fn evaluate<E: Evaluation>(
        &mut self,
        inputs: ValueMap,
        engine: &mut E,
    ) -> Result<ValueMap, EvaluationError> {
        self.editor.set_input_values(inputs).map_err(Box::new)?;
        engine.reset();
        let outputs_node = self.editor.outputs_node_id();
        engine.fetch_inputs(self.editor.graph_mut(), outputs_node)
    }

    fn group_mut(graph: &mut Graph, id: NodeId) -> Result<&mut GroupNode, GroupError> {
        graph
            .node_mut(id)?
            .as_group_mut()
            .ok_or(GroupError::NotAGroup(id))
    }
}
