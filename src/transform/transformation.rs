use crate::graph::identifier::unique_identifier;
use crate::graph::{Connection, ConnectionId, InputPosition, NodeId, OutputPosition};
use ahash::AHashMap;

/// A connection from outside the match into a matched input. It becomes a group input.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInputPromotion {
    /// The node that will feed the group from outside.
    pub outside_node: NodeId,
    pub outside_output: String,
    /// The matched input the connection used to drive.
    pub inner: InputPosition,
    /// Proposed boundary identifier. The group editor's own disambiguation has the final say.
    pub group_input: String,
}

/// A connection from a matched output to outside the match. It becomes a group output.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutputPromotion {
    /// The node that will be fed by the group.
    pub outside_node: NodeId,
    pub outside_input: String,
    /// The matched output the connection used to leave from.
    pub inner: OutputPosition,
    pub group_output: String,
}

/// Everything needed to replace one match by a group node.
#[derive(Debug, Clone, Default)]
pub struct Transformation {
    /// Matched nodes of the target graph, in discovery order.
    pub nodes: Vec<NodeId>,
    /// Connections between matched nodes.
    pub connections: Vec<ConnectionId>,
    pub group_input_connections: Vec<GroupInputPromotion>,
    pub group_output_connections: Vec<GroupOutputPromotion>,
    // target node -> template node, and back
    pairs: AHashMap<NodeId, NodeId>,
    template_pairs: AHashMap<NodeId, NodeId>,
}

impl Transformation {
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.pairs.contains_key(&id)
    }

    /// The template node `target` was paired with.
    pub fn paired_template(&self, target: NodeId) -> Option<NodeId> {
        self.pairs.get(&target).copied()
    }

    pub(crate) fn paired_target(&self, template: NodeId) -> Option<NodeId> {
        self.template_pairs.get(&template).copied()
    }

    pub(crate) fn record_pair(&mut self, target: NodeId, template: NodeId) {
        self.nodes.push(target);
        self.pairs.insert(target, template);
        self.template_pairs.insert(template, target);
    }

    pub(crate) fn promote_input(&mut self, connection: &Connection) {
        let group_input = unique_identifier(&connection.target_input, |candidate| {
            self.group_input_connections
                .iter()
                .any(|p| p.group_input == candidate)
        });
        self.group_input_connections.push(GroupInputPromotion {
            outside_node: connection.source,
            outside_output: connection.source_output.clone(),
            inner: connection.input_position(),
            group_input,
        });
    }

    /// Several outside connections leaving the same matched output share one group output.
    pub(crate) fn promote_output(&mut self, connection: &Connection) {
        let inner = connection.output_position();
        let existing = self
            .group_output_connections
            .iter()
            .find(|p| p.inner == inner)
            .map(|p| p.group_output.clone());
        let group_output = existing.unwrap_or_else(|| {
            unique_identifier(&connection.source_output, |candidate| {
                self.group_output_connections
                    .iter()
                    .any(|p| p.group_output == candidate)
            })
        });
        self.group_output_connections.push(GroupOutputPromotion {
            outside_node: connection.target,
            outside_input: connection.target_input.clone(),
            inner,
            group_output,
        });
    }
}
