//! Unit tests for the graph store, identifiers and values.
mod common;
use common::*;
use flowgroup::graph::identifier::{increment_string_number, unique_identifier};
use flowgroup::graph::query::{controls_match, find_positions, unconnected_inputs, unconnected_outputs};
use flowgroup::prelude::*;

#[test]
fn test_increment_string_number() {
    assert_eq!(increment_string_number("a"), "a2");
    assert_eq!(increment_string_number("a2"), "a3");
    assert_eq!(increment_string_number("in9"), "in10");
    assert_eq!(increment_string_number("42"), "43");
    assert_eq!(increment_string_number(""), " 2");
    assert_eq!(
        increment_string_number("x18446744073709551615"),
        "x18446744073709551615 2"
    );
}

#[test]
fn test_unique_identifier_skips_taken_names() {
    let taken = ["x", "x2", "x3"];
    assert_eq!(unique_identifier("x", |c| taken.contains(&c)), "x4");
    assert_eq!(unique_identifier("y", |c| taken.contains(&c)), "y");
}

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(1.5)), "1.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Text("hi".to_string())), "\"hi\"");
    assert_eq!(format!("{}", Value::Null), "null");
}

#[test]
fn test_value_deserializes_untagged() {
    let values: Vec<Value> = serde_json::from_str(r#"[1.5, true, "a", null]"#).unwrap();
    assert_eq!(
        values,
        vec![
            Value::Number(1.5),
            Value::Bool(true),
            Value::Text("a".to_string()),
            Value::Null
        ]
    );
}

#[test]
fn test_socket_compatibility() {
    let number = Socket::new("number");
    let text = Socket::new("text");
    assert!(number.is_compatible(&number));
    assert!(!number.is_compatible(&text));
    assert!(number.is_compatible(&Socket::any()));
    assert!(Socket::any().is_compatible(&text));
}

#[test]
fn test_connection_rejects_missing_ports_and_second_writer() {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(1.0)).unwrap();
    let c = graph.add_node(constant(2.0)).unwrap();
    let b = graph.add_node(binary("Add")).unwrap();

    let missing = graph.add_connection(Connection::new(a, "nope", b, "x"));
    assert!(matches!(missing, Err(GraphError::PortNotFound { direction: "output", .. })));

    let first = graph.add_connection(Connection::new(a, "out", b, "x")).unwrap();
    let second = graph.add_connection(Connection::new(c, "out", b, "x"));
    assert_eq!(
        second,
        Err(GraphError::InputOccupied {
            node: b,
            input: "x".to_string(),
            existing: first
        })
    );
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn test_connection_rejects_incompatible_sockets() {
    let mut graph = Graph::new();
    let a = graph
        .add_node(Node::new("Source").with_output("out", Socket::new("number")))
        .unwrap();
    let b = graph
        .add_node(Node::new("Sink").with_input("in", Socket::new("text")))
        .unwrap();
    let result = graph.add_connection(Connection::new(a, "out", b, "in"));
    assert!(matches!(result, Err(GraphError::IncompatibleSockets { .. })));
}

#[test]
fn test_remove_node_returns_attached_connections() {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(1.0)).unwrap();
    let b = graph.add_node(unary("Negate")).unwrap();
    let c = graph.add_node(unary("Negate")).unwrap();
    graph.add_connection(Connection::new(a, "out", b, "in")).unwrap();
    graph.add_connection(Connection::new(b, "out", c, "in")).unwrap();

    let (node, removed) = graph.remove_node(b).unwrap();
    assert_eq!(node.id(), b);
    assert_eq!(removed.len(), 2);
    assert_eq!(graph.connection_count(), 0);
    assert_eq!(graph.node(b).unwrap_err(), GraphError::NodeNotFound(b));
}

#[test]
fn test_structural_queries() {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(5.0)).unwrap();
    let b = graph.add_node(binary("Add")).unwrap();
    graph.add_connection(Connection::new(a, "out", b, "x")).unwrap();

    assert_eq!(unconnected_inputs(&graph, &[]), vec![InputPosition::new(b, "y")]);
    assert_eq!(unconnected_outputs(&graph, &[]), vec![OutputPosition::new(b, "out")]);
    assert!(unconnected_inputs(&graph, &[b]).is_empty());
    assert_eq!(find_positions(&graph, "Add", "out"), vec![OutputPosition::new(b, "out")]);
    assert!(find_positions(&graph, "Add", "missing").is_empty());
}

#[test]
fn test_controls_match_is_exact() {
    assert!(controls_match(&constant(5.0), &constant(5.0)));
    assert!(!controls_match(&constant(5.0), &constant(6.0)));
    assert!(!controls_match(&constant(5.0), &constant("5")));
    assert!(!controls_match(&constant(f64::NAN), &constant(f64::NAN)));
    assert!(!controls_match(&constant(5.0), &unary("Negate")));
    assert!(controls_match(&unary("Negate"), &binary("Add")));
}

#[test]
fn test_boundary_nodes_reject_wrong_port_direction() {
    let editor = GroupEditor::new();
    let mut inputs = editor.graph().node(editor.inputs_node_id()).unwrap().clone();
    let result = inputs.add_input("x", Input::new(Socket::any()));
    assert!(matches!(result, Err(GraphError::BoundaryViolation { .. })));

    let mut outputs = editor.graph().node(editor.outputs_node_id()).unwrap().clone();
    let result = outputs.add_output("x", Output::new(Socket::any()));
    assert!(matches!(result, Err(GraphError::BoundaryViolation { .. })));
}

#[test]
fn test_graph_display_lists_nodes_and_connections() {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(5.0)).unwrap();
    let b = graph.add_node(unary("Negate")).unwrap();
    graph.add_connection(Connection::new(a, "out", b, "in")).unwrap();

    let rendered = graph.to_string();
    assert!(rendered.contains(&format!("{} [Const] value=5", a)));
    assert!(rendered.contains(&format!("{} [Negate]", b)));
    assert!(rendered.contains(&format!("{}.out -> {}.in", a, b)));
}

#[test]
fn test_large_integral_numbers_display_exactly() {
    assert_eq!(format!("{}", Value::Number(-3.0)), "-3");
    assert_eq!(format!("{}", Value::Number(1e20)), "100000000000000000000");
    assert_eq!(format!("{}", Value::Number(-1e20)), "-100000000000000000000");
}
