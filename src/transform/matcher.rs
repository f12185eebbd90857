use super::Transformation;
use crate::graph::query::controls_match;
use crate::graph::{Connection, Graph, NodeId, OutputPosition};
use crate::group::GroupEditor;
use log::trace;
use thiserror::Error;

/// Why a match attempt was abandoned. Never leaves the transformer.
#[derive(Error, Debug, Clone)]
pub(crate) enum MatchError {
    #[error("Structural mismatch at node {node}: {reason}")]
    StructuralMismatch { node: NodeId, reason: String },
}

fn mismatch(node: NodeId, reason: impl Into<String>) -> MatchError {
    MatchError::StructuralMismatch {
        node,
        reason: reason.into(),
    }
}

/// Walks a target graph backwards from a seed, pairing it with a template.
pub(crate) struct StructuralMatcher<'a> {
    target: &'a Graph,
    template: &'a GroupEditor,
}

impl<'a> StructuralMatcher<'a> {
    pub(crate) fn new(target: &'a Graph, template: &'a GroupEditor) -> Self {
        Self { target, template }
    }

    /// Tries to match the template upstream of `exit`, starting at `seed`.
    pub(crate) fn match_from(&self, seed: &OutputPosition, exit: &OutputPosition) -> Option<Transformation> {
        let mut transformation = Transformation::default();
        let outcome = self
            .traverse(seed.node, exit.node, &mut transformation)
            .and_then(|()| self.extend(&mut transformation))
            .and_then(|()| self.close(&mut transformation));
        match outcome {
            Ok(()) => Some(transformation),
            Err(e) => {
                trace!("Match seeded at {}.{} abandoned: {}", seed.node, seed.output, e);
                None
            }
        }
    }

    fn traverse(
        &self,
        source_id: NodeId,
        pattern_id: NodeId,
        transformation: &mut Transformation,
    ) -> Result<(), MatchError> {
        if let Some(paired) = transformation.paired_template(source_id) {
            return if paired == pattern_id {
                Ok(())
            } else {
                Err(mismatch(source_id, "node is already paired with another template node"))
            };
        }
        if transformation.paired_target(pattern_id).is_some() {
            return Err(mismatch(source_id, "template node is already paired with another node"));
        }
        transformation.record_pair(source_id, pattern_id);

        let source = self
            .target
            .node(source_id)
            .map_err(|e| mismatch(source_id, e.to_string()))?;
        let pattern = self
            .template
            .graph()
            .node(pattern_id)
            .map_err(|e| mismatch(source_id, e.to_string()))?;

        if source.label() != pattern.label() {
            return Err(mismatch(
                source_id,
                format!("label '{}' differs from '{}'", source.label(), pattern.label()),
            ));
        }
        if !controls_match(source, pattern) {
            return Err(mismatch(source_id, "control values differ"));
        }
        if !source.inputs().keys().eq(pattern.inputs().keys()) {
            return Err(mismatch(source_id, "input sets differ"));
        }

        for input in pattern.inputs().keys() {
            let source_connection = self.target.incoming(source_id, input);
            let pattern_connection = self.template.graph().incoming(pattern_id, input);
            match (source_connection, pattern_connection) {
                (None, None) => {}
                (None, Some(_)) => {
                    return Err(mismatch(
                        source_id,
                        format!("input '{}' is required to be connected", input),
                    ));
                }
                (Some(connection), None) => transformation.promote_input(connection),
                (Some(connection), Some(pattern_connection))
                    if pattern_connection.source == self.template.inputs_node_id() =>
                {
                    transformation.promote_input(connection)
                }
                (Some(connection), Some(pattern_connection)) => {
                    if connection.source_output != pattern_connection.source_output {
                        return Err(mismatch(
                            source_id,
                            format!(
                                "input '{}' is fed from output '{}' instead of '{}'",
                                input, connection.source_output, pattern_connection.source_output
                            ),
                        ));
                    }
                    transformation.connections.push(connection.id);
                    self.traverse(connection.source, pattern_connection.source, transformation)?;
                }
            }
        }
        Ok(())
    }

    /// Pairs the template nodes the backward walk could not reach, such as the
    /// nodes behind other exit points, by following template connections forward
    /// from nodes that are already paired.
    fn extend(&self, transformation: &mut Transformation) -> Result<(), MatchError> {
        let template = self.template.graph();
        let mut index = 0;
        while index < transformation.nodes.len() {
            let source_id = transformation.nodes[index];
            index += 1;
            let Some(pattern_id) = transformation.paired_template(source_id) else {
                continue;
            };
            for pattern_connection in template.connections().filter(|c| c.source == pattern_id) {
                let reaches_inner = template
                    .node(pattern_connection.target)
                    .is_ok_and(|node| !node.is_boundary());
                if !reaches_inner || transformation.paired_target(pattern_connection.target).is_some() {
                    continue;
                }
                self.follow(source_id, pattern_connection, transformation)?;
            }
        }
        Ok(())
    }

    /// Pairs the target of `pattern_connection` with the first matching consumer of
    /// the same output of `source_id`.
    fn follow(
        &self,
        source_id: NodeId,
        pattern_connection: &Connection,
        transformation: &mut Transformation,
    ) -> Result<(), MatchError> {
        let candidates: Vec<NodeId> = self
            .target
            .outgoing(source_id, &pattern_connection.source_output)
            .filter(|c| {
                c.target_input == pattern_connection.target_input
                    && !transformation.contains_node(c.target)
            })
            .map(|c| c.target)
            .collect();
        for candidate in candidates {
            let mut attempt = transformation.clone();
            if self
                .traverse(candidate, pattern_connection.target, &mut attempt)
                .is_ok()
            {
                *transformation = attempt;
                return Ok(());
            }
        }
        Err(mismatch(
            source_id,
            format!(
                "no consumer of output '{}' matches the template",
                pattern_connection.source_output
            ),
        ))
    }

    /// Validates the promotions of a complete walk and adds the outgoing ones.
    fn close(&self, transformation: &mut Transformation) -> Result<(), MatchError> {
        if let Some(promotion) = transformation
            .group_input_connections
            .iter()
            .find(|p| transformation.contains_node(p.outside_node))
        {
            return Err(mismatch(
                promotion.inner.node,
                "an external input is fed from inside the match",
            ));
        }

        let leaving: Vec<_> = self
            .target
            .connections()
            .filter(|c| transformation.contains_node(c.source) && !transformation.contains_node(c.target))
            .cloned()
            .collect();
        for connection in &leaving {
            let feeds_match = self
                .target
                .outgoing(connection.source, &connection.source_output)
                .any(|c| transformation.contains_node(c.target));
            if feeds_match {
                return Err(mismatch(
                    connection.source,
                    format!(
                        "output '{}' feeds both the match and the outside",
                        connection.source_output
                    ),
                ));
            }
            transformation.promote_output(connection);
        }
        Ok(())
    }
}
