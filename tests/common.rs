//! Common test utilities for building graphs and templates.
use flowgroup::prelude::*;

/// `Const` node with a `value` control and an `out` output.
#[allow(dead_code)]
pub fn constant(value: impl Into<Value>) -> Node {
    Node::new("Const")
        .with_control("value", value)
        .with_output("out", Socket::any())
}

/// Binary node with inputs `x`, `y` and output `out`.
#[allow(dead_code)]
pub fn binary(label: &str) -> Node {
    Node::new(label)
        .with_input("x", Socket::any())
        .with_input("y", Socket::any())
        .with_output("out", Socket::any())
}

/// Unary node with input `in` and output `out`.
#[allow(dead_code)]
pub fn unary(label: &str) -> Node {
    Node::new(label)
        .with_input("in", Socket::any())
        .with_output("out", Socket::any())
}

/// Handles of the Const/Add scenario graph.
#[allow(dead_code)]
pub struct Scenario {
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
}

/// `A(Const 5).out -> B(Add).x` and `C(Const 2).out -> B.y`, inside an editor with
/// group dispatching enabled.
#[allow(dead_code)]
pub fn create_scenario(editor: &mut Editor) -> Scenario {
    let a = editor.add_node(constant(5.0)).unwrap();
    let c = editor.add_node(constant(2.0)).unwrap();
    let b = editor.add_node(binary("Add")).unwrap();
    editor.add_connection(Connection::new(a, "out", b, "x")).unwrap();
    editor.add_connection(Connection::new(c, "out", b, "y")).unwrap();
    Scenario { a, b, c }
}

/// Template `Const(value).out -> Add.x` with `Add.y` open and `Add.out` as exit point.
#[allow(dead_code)]
pub fn create_add_constant_template(identifier: &str, value: f64) -> NodeGroupTemplate {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(value)).unwrap();
    let b = graph.add_node(binary("Add")).unwrap();
    graph.add_connection(Connection::new(a, "out", b, "x")).unwrap();
    NodeGroupTemplate::from_graph(identifier, graph).unwrap()
}

/// A group editor holding a single `Passthrough` node with input `in0` and output `in0`.
#[allow(dead_code)]
pub fn create_passthrough_group() -> (GroupEditor, NodeId) {
    let mut editor = GroupEditor::new();
    let passthrough = editor
        .add_node(
            Node::new("Passthrough")
                .with_input("in0", Socket::any())
                .with_output("in0", Socket::any()),
        )
        .unwrap();
    (editor, passthrough)
}

/// Identifiers of a port map, in order.
#[allow(dead_code)]
pub fn keys<V>(map: &std::collections::BTreeMap<String, V>) -> Vec<String> {
    map.keys().cloned().collect()
}
