//! Read-only structural queries over a graph.

use super::{Graph, InputPosition, Node, NodeId, OutputPosition};

/// Input ports with no incoming connection, in node then identifier order.
pub fn unconnected_inputs(graph: &Graph, exclude: &[NodeId]) -> Vec<InputPosition> {
    graph
        .nodes()
        .filter(|node| !exclude.contains(&node.id()))
        .flat_map(|node| {
            node.inputs()
                .keys()
                .filter(|input| graph.incoming(node.id(), input).is_none())
                .map(|input| InputPosition::new(node.id(), input.clone()))
        })
        .collect()
}

/// Output ports with no outgoing connection, in node then identifier order.
pub fn unconnected_outputs(graph: &Graph, exclude: &[NodeId]) -> Vec<OutputPosition> {
    graph
        .nodes()
        .filter(|node| !exclude.contains(&node.id()))
        .flat_map(|node| {
            node.outputs()
                .keys()
                .filter(|output| graph.outgoing(node.id(), output).next().is_none())
                .map(|output| OutputPosition::new(node.id(), output.clone()))
        })
        .collect()
}

/// Positions of every node labelled `label` that exposes `output`.
pub fn find_positions(graph: &Graph, label: &str, output: &str) -> Vec<OutputPosition> {
    graph
        .nodes()
        .filter(|node| node.label() == label && node.has_output(output))
        .map(|node| OutputPosition::new(node.id(), output))
        .collect()
}

/// Compares the controls of two nodes identifier by identifier.
///
/// A control present on one side only is a mismatch; values compare with `==`.
pub fn controls_match(a: &Node, b: &Node) -> bool {
    a.controls().len() == b.controls().len()
        && a.controls().iter().all(|(identifier, control)| {
            b.control(identifier)
                .is_some_and(|other| control.value() == other.value())
        })
}
