use super::GroupNode;
use crate::editor::{GraphEvent, Pipe};
use crate::error::GroupError;
use crate::graph::{Graph, NodeRole};
use log::debug;

/// Forwards connection events targeting group nodes to those nodes.
///
/// This is the only place where generic graph mutation meets group behaviour.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupDispatcher;

impl Pipe for GroupDispatcher {
    fn handle(&mut self, graph: &mut Graph, event: &GraphEvent) -> Result<Vec<GraphEvent>, GroupError> {
        propagate(graph, event)
    }
}

/// Applies `event` to its target group, if any, and returns the follow-up events
/// for connections pruned as a consequence.
pub(crate) fn propagate(graph: &mut Graph, event: &GraphEvent) -> Result<Vec<GraphEvent>, GroupError> {
    let pruned = match event {
        GraphEvent::ConnectionCreated(connection) => {
            let targets_group = graph
                .node(connection.target)
                .is_ok_and(|node| node.role() == NodeRole::Group);
            if !targets_group {
                return Ok(Vec::new());
            }
            debug!("Group {} gained outside connection {}", connection.target, connection);
            GroupNode::input_connection_created(graph, connection)?
        }
        GraphEvent::ConnectionRemoved(connection) => {
            // A port that is already gone was pruned by the group itself.
            let exposed = graph.node(connection.target).is_ok_and(|node| {
                node.role() == NodeRole::Group && node.has_input(&connection.target_input)
            });
            if !exposed {
                return Ok(Vec::new());
            }
            debug!("Group {} lost outside connection {}", connection.target, connection);
            GroupNode::input_connection_removed(graph, connection)?
        }
    };
    Ok(pruned.into_iter().map(GraphEvent::ConnectionRemoved).collect())
}
