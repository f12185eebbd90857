//! Tests for the dataflow engine and its built-in processors.
mod common;
use common::*;
use flowgroup::prelude::*;

fn evaluate(graph: &mut Graph, node: NodeId) -> std::result::Result<ValueMap, EvaluationError> {
    DataflowEngine::new().fetch_outputs(graph, node)
}

fn chain(graph: &mut Graph, label: &str, x: impl Into<Value>, y: impl Into<Value>) -> NodeId {
    let a = graph.add_node(constant(x)).unwrap();
    let b = graph.add_node(constant(y)).unwrap();
    let op = graph.add_node(binary(label)).unwrap();
    graph.add_connection(Connection::new(a, "out", op, "x")).unwrap();
    graph.add_connection(Connection::new(b, "out", op, "y")).unwrap();
    op
}

#[test]
fn test_binary_builtins() {
    let cases = [
        ("Add", 6.0, 3.0, 9.0),
        ("Subtract", 6.0, 3.0, 3.0),
        ("Multiply", 6.0, 3.0, 18.0),
        ("Divide", 6.0, 3.0, 2.0),
    ];
    for (label, x, y, expected) in cases {
        let mut graph = Graph::new();
        let op = chain(&mut graph, label, x, y);
        let outputs = evaluate(&mut graph, op).unwrap();
        assert_eq!(outputs.get("out"), Some(&Value::Number(expected)), "{}", label);
    }
}

#[test]
fn test_logical_builtins() {
    let mut graph = Graph::new();
    let and = chain(&mut graph, "And", true, false);
    let or = chain(&mut graph, "Or", true, false);
    let not = graph.add_node(unary("Not")).unwrap();
    graph.add_connection(Connection::new(and, "out", not, "in")).unwrap();

    assert_eq!(evaluate(&mut graph, and).unwrap().get("out"), Some(&Value::Bool(false)));
    assert_eq!(evaluate(&mut graph, or).unwrap().get("out"), Some(&Value::Bool(true)));
    assert_eq!(evaluate(&mut graph, not).unwrap().get("out"), Some(&Value::Bool(true)));
}

#[test]
fn test_unary_builtins() {
    let mut graph = Graph::new();
    let source = graph.add_node(constant(-4.0)).unwrap();
    let negate = graph.add_node(unary("Negate")).unwrap();
    let abs = graph.add_node(unary("Abs")).unwrap();
    graph.add_connection(Connection::new(source, "out", negate, "in")).unwrap();
    graph.add_connection(Connection::new(source, "out", abs, "in")).unwrap();

    assert_eq!(evaluate(&mut graph, negate).unwrap().get("out"), Some(&Value::Number(4.0)));
    assert_eq!(evaluate(&mut graph, abs).unwrap().get("out"), Some(&Value::Number(4.0)));
}

#[test]
fn test_type_mismatch() {
    let mut graph = Graph::new();
    let op = chain(&mut graph, "Add", 1.0, true);
    let result = evaluate(&mut graph, op);
    assert!(matches!(
        result,
        Err(EvaluationError::TypeMismatch { found: Value::Bool(true), .. })
    ));
}

#[test]
fn test_missing_input_is_reported() {
    let mut graph = Graph::new();
    let a = graph.add_node(constant(1.0)).unwrap();
    let op = graph.add_node(binary("Add")).unwrap();
    graph.add_connection(Connection::new(a, "out", op, "x")).unwrap();

    match evaluate(&mut graph, op) {
        Err(EvaluationError::InputNotFound { node, input }) => {
            assert_eq!(node, op);
            assert_eq!(input, "y");
        }
        other => panic!("expected InputNotFound, got {:?}", other),
    }
}

#[test]
fn test_unknown_processor() {
    let mut graph = Graph::new();
    let node = graph.add_node(Node::new("Mystery").with_output("out", Socket::any())).unwrap();
    let result = evaluate(&mut graph, node);
    assert!(matches!(result, Err(EvaluationError::UnknownProcessor(label)) if label == "Mystery"));
}

#[test]
fn test_cycle_is_detected() {
    let mut graph = Graph::new();
    let first = graph.add_node(unary("Negate")).unwrap();
    let second = graph.add_node(unary("Negate")).unwrap();
    graph.add_connection(Connection::new(first, "out", second, "in")).unwrap();
    graph.add_connection(Connection::new(second, "out", first, "in")).unwrap();

    assert!(matches!(evaluate(&mut graph, first), Err(EvaluationError::Cycle(_))));
}

#[test]
fn test_label_alias_and_custom_processor() {
    struct Double;
    impl NodeProcessor for Double {
        fn label(&self) -> &str {
            "Double"
        }
        fn process(&self, node: &Node, inputs: &ValueMap) -> std::result::Result<ValueMap, EvaluationError> {
            let value = inputs.get("in").and_then(Value::as_number).unwrap_or(0.0);
            Ok(node
                .outputs()
                .keys()
                .map(|k| (k.clone(), Value::Number(value * 2.0)))
                .collect())
        }
    }

    let mut graph = Graph::new();
    let plus = chain(&mut graph, "Plus", 2.0, 3.0);
    let double = graph.add_node(unary("Double")).unwrap();
    graph.add_connection(Connection::new(plus, "out", double, "in")).unwrap();

    let mut engine = DataflowEngine::builder()
        .with_label_alias("Plus", "Add")
        .with_processor(Box::new(Double))
        .build();
    let outputs = engine.fetch_outputs(&mut graph, double).unwrap();
    assert_eq!(outputs.get("out"), Some(&Value::Number(10.0)));
}

#[test]
fn test_reset_clears_cached_outputs() {
    let mut graph = Graph::new();
    let source = graph.add_node(constant(1.0)).unwrap();
    let mut engine = DataflowEngine::new();
    assert_eq!(
        engine.fetch_outputs(&mut graph, source).unwrap().get("out"),
        Some(&Value::Number(1.0))
    );

    graph.node_mut(source).unwrap().control_mut("value").unwrap().set_value(2.0);
    assert_eq!(
        engine.fetch_outputs(&mut graph, source).unwrap().get("out"),
        Some(&Value::Number(1.0))
    );
    engine.reset();
    assert_eq!(
        engine.fetch_outputs(&mut graph, source).unwrap().get("out"),
        Some(&Value::Number(2.0))
    );
}

#[test]
fn test_passthrough_group_in_parent_graph() {
    let mut editor = Editor::with_node_groups();
    let (inner, _) = create_passthrough_group();
    let group = editor.add_node(GroupNode::new(inner).into_node("Group")).unwrap();
    let source = editor.add_node(constant(7.0)).unwrap();
    editor
        .add_connection(Connection::new(source, "out", group, "in0"))
        .unwrap();

    let outputs = DataflowEngine::new()
        .fetch_outputs(editor.graph_mut(), group)
        .unwrap();
    assert_eq!(outputs.get("in0"), Some(&Value::Number(7.0)));
}

#[test]
fn test_undriven_group_input_is_reported() {
    let mut editor = Editor::with_node_groups();
    let (inner, passthrough) = create_passthrough_group();
    let group = editor.add_node(GroupNode::new(inner).into_node("Group")).unwrap();

    // Nothing drives the boundary input, so the passthrough sees no value.
    let result = DataflowEngine::new().fetch_outputs(editor.graph_mut(), group);
    match result {
        Err(EvaluationError::InputNotFound { node, input }) => {
            assert_eq!(node, passthrough);
            assert_eq!(input, "in0");
        }
        other => panic!("expected InputNotFound, got {:?}", other),
    }
}
