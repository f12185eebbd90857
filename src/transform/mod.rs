//! Pattern-based rewriting: every occurrence of a template subgraph is replaced by a group node.
//!
//! Matching walks backwards from the template's exit points. Connections that enter
//! or leave a match are promoted to group inputs and outputs, and they are
//! re-wired through the parent [`Editor`] so the group dispatcher connects the
//! new group's boundary.

mod matcher;
mod transformation;

pub use transformation::{GroupInputPromotion, GroupOutputPromotion, Transformation};

use crate::editor::Editor;
use crate::error::GroupError;
use crate::graph::query::find_positions;
use crate::graph::{Connection, Graph, NodeId, OutputPosition};
use crate::group::{GroupEditor, GroupNode};
use itertools::Itertools;
use log::{debug, info, warn};
use matcher::StructuralMatcher;

/// A named subgraph to look for. Its identifier becomes the label of every group it creates.
#[derive(Debug, Clone)]
pub struct NodeGroupTemplate {
    identifier: String,
    editor: GroupEditor,
}

impl NodeGroupTemplate {
    pub fn new(identifier: impl Into<String>, editor: GroupEditor) -> Self {
        Self {
            identifier: identifier.into(),
            editor,
        }
    }

    /// Builds a template from a plain graph. Inputs left unconnected in it become
    /// template inputs and match anything.
    pub fn from_graph(identifier: impl Into<String>, graph: Graph) -> Result<Self, GroupError> {
        let (nodes, connections) = graph.into_parts();
        Ok(Self::new(identifier, GroupEditor::from_parts(nodes, connections)?))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn editor(&self) -> &GroupEditor {
        &self.editor
    }

    /// Outputs of inner nodes that feed no other inner node.
    pub fn exit_points(&self) -> Vec<OutputPosition> {
        let graph = self.editor.graph();
        graph
            .nodes()
            .filter(|node| !node.is_boundary())
            .flat_map(|node| {
                node.outputs().keys().filter_map(move |output| {
                    let feeds_inner = graph
                        .outgoing(node.id(), output)
                        .any(|c| graph.node(c.target).is_ok_and(|target| !target.is_boundary()));
                    (!feeds_inner).then(|| OutputPosition::new(node.id(), output.clone()))
                })
            })
            .collect()
    }
}

/// Group nodes created by [`NodeGroupTransformer::transform_all`], per template.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub groups: Vec<(String, Vec<NodeId>)>,
}

impl TransformReport {
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, created)| created.len()).sum()
    }

    pub fn created_for(&self, identifier: &str) -> &[NodeId] {
        self.groups
            .iter()
            .find(|(template, _)| template == identifier)
            .map(|(_, created)| created.as_slice())
            .unwrap_or_default()
    }
}

/// Rewrites the graph of an editor in place.
pub struct NodeGroupTransformer<'a> {
    editor: &'a mut Editor,
}

impl<'a> NodeGroupTransformer<'a> {
    pub fn new(editor: &'a mut Editor) -> Self {
        Self { editor }
    }

    /// Applies every template in order. A template finding nothing is not an error.
    pub fn transform_all(&mut self, templates: &[NodeGroupTemplate]) -> Result<TransformReport, GroupError> {
        let mut report = TransformReport::default();
        for template in templates {
            let created = self.transform_one(template)?;
            report.groups.push((template.identifier().to_string(), created));
        }
        Ok(report)
    }

    /// Replaces every match of `template`, returning the ids of the created group nodes.
    pub fn transform_one(&mut self, template: &NodeGroupTemplate) -> Result<Vec<NodeId>, GroupError> {
        let mut created = Vec::new();
        for exit in template.exit_points() {
            let exit_node = template.editor().graph().node(exit.node)?;
            let seeds = find_positions(self.editor.graph(), exit_node.label(), &exit.output);
            debug!(
                "Template '{}': {} seed(s) for exit point {}.{}",
                template.identifier(),
                seeds.len(),
                exit.node,
                exit.output
            );
            for seed in seeds {
                // An earlier match may already have moved this node into a group.
                if !self.editor.graph().contains_node(seed.node) {
                    continue;
                }
                let found = StructuralMatcher::new(self.editor.graph(), template.editor())
                    .match_from(&seed, &exit);
                if let Some(transformation) = found {
                    // A failed extraction must not leave the graph half rewritten.
                    let snapshot = self.editor.graph().clone();
                    match self.apply(template, transformation) {
                        Ok(group) => created.push(group),
                        Err(e) => {
                            warn!(
                                "Template '{}': extraction at {} failed, graph restored: {}",
                                template.identifier(),
                                seed.node,
                                e
                            );
                            *self.editor.graph_mut() = snapshot;
                            return Err(e);
                        }
                    }
                }
            }
        }
        Ok(created)
    }

    /// Moves the matched nodes into a new group and re-wires the promotions to it.
    fn apply(&mut self, template: &NodeGroupTemplate, transformation: Transformation) -> Result<NodeId, GroupError> {
        let mut connections: Vec<Connection> = Vec::with_capacity(transformation.connections.len());
        for id in &transformation.connections {
            connections.push(self.editor.remove_connection(*id)?);
        }
        let mut nodes = Vec::with_capacity(transformation.nodes.len());
        for id in &transformation.nodes {
            nodes.push(self.editor.remove_node(*id)?);
        }

        let group_editor = GroupEditor::from_parts(nodes, connections)?;
        let group_id = self
            .editor
            .add_node(GroupNode::new(group_editor).into_node(template.identifier()))?;

        for promotion in &transformation.group_input_connections {
            let identifier = self
                .group_editor(group_id)?
                .input_identifier(&promotion.inner)
                .ok_or_else(|| GroupError::InvalidIdentifier(promotion.group_input.clone()))?;
            self.editor.add_connection(Connection::new(
                promotion.outside_node,
                promotion.outside_output.clone(),
                group_id,
                identifier,
            ))?;
        }
        for promotion in &transformation.group_output_connections {
            let identifier = self
                .group_editor(group_id)?
                .output_identifier(&promotion.inner)
                .ok_or_else(|| GroupError::InvalidIdentifier(promotion.group_output.clone()))?;
            self.editor.add_connection(Connection::new(
                group_id,
                identifier,
                promotion.outside_node,
                promotion.outside_input.clone(),
            ))?;
        }

        info!(
            "Grouped [{}] into '{}' node {} (inputs: [{}], outputs: [{}])",
            transformation.nodes.iter().join(", "),
            template.identifier(),
            group_id,
            transformation
                .group_input_connections
                .iter()
                .map(|p| &p.group_input)
                .join(", "),
            transformation
                .group_output_connections
                .iter()
                .map(|p| &p.group_output)
                .unique()
                .join(", ")
        );
        Ok(group_id)
    }

    fn group_editor(&self, id: NodeId) -> Result<&GroupEditor, GroupError> {
        self.editor
            .node(id)?
            .as_group()
            .map(GroupNode::editor)
            .ok_or(GroupError::NotAGroup(id))
    }
}
