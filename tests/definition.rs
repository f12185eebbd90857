//! Tests for importing graphs and templates from definitions.
use flowgroup::definition::{
    ConnectionDefinition, GraphDefinition, IntoGraph, NodeDefinition, PortDefinition,
    TemplateDefinition,
};
use flowgroup::prelude::*;

const SCENARIO_JSON: &str = r#"{
    "nodes": [
        { "id": "a", "label": "Const", "outputs": [{ "id": "out" }], "controls": { "value": 5 } },
        { "id": "c", "label": "Const", "outputs": [{ "id": "out" }], "controls": { "value": 2 } },
        { "id": "b", "label": "Add",
          "inputs": [{ "id": "x", "socket": "number" }, { "id": "y", "label": "Addend" }],
          "outputs": [{ "id": "out", "socket": "number" }] }
    ],
    "connections": [
        { "source": "a", "sourceOutput": "out", "target": "b", "targetInput": "x" },
        { "source": "c", "source_output": "out", "target": "b", "target_input": "y" }
    ]
}"#;

const TEMPLATES_JSON: &str = r#"[
    {
        "identifier": "AddFive",
        "graph": {
            "nodes": [
                { "id": "a", "label": "Const", "outputs": [{ "id": "out" }], "controls": { "value": 5 } },
                { "id": "b", "label": "Add", "inputs": [{ "id": "x" }, { "id": "y" }], "outputs": [{ "id": "out" }] }
            ],
            "edges": [{ "source": "a", "sourceOutput": "out", "target": "b", "targetInput": "x" }]
        }
    }
]"#;

#[test]
fn test_build_graph_from_json() {
    let definition = GraphDefinition::from_json(SCENARIO_JSON).unwrap();
    let (graph, index) = definition.build().unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.connection_count(), 2);
    let a = graph.node(index["a"]).unwrap();
    assert_eq!(a.control("value").map(|c| c.value()), Some(&Value::Number(5.0)));
    let b = graph.node(index["b"]).unwrap();
    assert_eq!(b.input("x").unwrap().socket, Socket::new("number"));
    assert_eq!(b.input("y").unwrap().socket, Socket::any());
    assert_eq!(b.input("y").unwrap().label.as_deref(), Some("Addend"));
    assert_eq!(graph.incoming(index["b"], "y").map(|c| c.source), Some(index["c"]));
}

#[test]
fn test_unknown_connection_endpoint() {
    let definition = GraphDefinition {
        nodes: vec![],
        connections: vec![ConnectionDefinition::new("ghost", "out", "b", "x")],
    };
    match definition.build() {
        Err(DefinitionError::NodeNotFound {
            missing_node_id,
            source_node_id,
        }) => {
            assert_eq!(missing_node_id, "ghost");
            assert_eq!(source_node_id, "ghost");
        }
        other => panic!("expected NodeNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let node = NodeDefinition {
        id: "n".to_string(),
        label: "Const".to_string(),
        inputs: vec![],
        outputs: vec![PortDefinition::new("out")],
        controls: Default::default(),
    };
    let definition = GraphDefinition {
        nodes: vec![node.clone(), node.clone()],
        connections: vec![],
    };
    assert!(matches!(
        definition.validate(),
        Err(DefinitionError::DuplicateNodeId(id)) if id == "n"
    ));

    let mut doubled = node;
    doubled.outputs.push(PortDefinition::new("out"));
    let definition = GraphDefinition {
        nodes: vec![doubled],
        connections: vec![],
    };
    assert!(matches!(definition.validate(), Err(DefinitionError::ValidationError(_))));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        GraphDefinition::from_json("{ nodes: "),
        Err(DefinitionError::JsonParseError(_))
    ));
}

#[test]
fn test_incompatible_sockets_surface_as_graph_error() {
    let json = r#"{
        "nodes": [
            { "id": "s", "label": "Source", "outputs": [{ "id": "out", "socket": "text" }] },
            { "id": "t", "label": "Sink", "inputs": [{ "id": "in", "socket": "number" }] }
        ],
        "connections": [{ "source": "s", "sourceOutput": "out", "target": "t", "targetInput": "in" }]
    }"#;
    let result = GraphDefinition::from_json(json).unwrap().build();
    assert!(matches!(
        result,
        Err(DefinitionError::Graph(GraphError::IncompatibleSockets { .. }))
    ));
}

#[test]
fn test_templates_from_json_rewrite_graph() {
    let (graph, index) = GraphDefinition::from_json(SCENARIO_JSON)
        .unwrap()
        .build()
        .unwrap();
    let templates: Vec<NodeGroupTemplate> = TemplateDefinition::list_from_json(TEMPLATES_JSON)
        .unwrap()
        .into_iter()
        .map(|t| t.into_template().unwrap())
        .collect();

    let mut editor = Editor::from_graph(graph).with_pipe(GroupDispatcher);
    let report = NodeGroupTransformer::new(&mut editor)
        .transform_all(&templates)
        .unwrap();

    assert_eq!(report.total(), 1);
    let group = report.created_for("AddFive")[0];
    assert_eq!(editor.graph().incoming(group, "y").map(|c| c.source), Some(index["c"]));
}

struct Chain {
    values: Vec<f64>,
}

impl IntoGraph for Chain {
    fn into_graph(self) -> std::result::Result<GraphDefinition, DefinitionError> {
        let mut definition = GraphDefinition::default();
        for (i, value) in self.values.into_iter().enumerate() {
            let mut controls = std::collections::BTreeMap::new();
            controls.insert("value".to_string(), Value::Number(value));
            definition.nodes.push(NodeDefinition {
                id: format!("c{}", i),
                label: "Const".to_string(),
                inputs: vec![],
                outputs: vec![PortDefinition::new("out")],
                controls,
            });
        }
        definition.nodes.push(NodeDefinition {
            id: "sum".to_string(),
            label: "Add".to_string(),
            inputs: vec![PortDefinition::new("x"), PortDefinition::new("y")],
            outputs: vec![PortDefinition::new("out")],
            controls: Default::default(),
        });
        definition.connections.push(ConnectionDefinition::new("c0", "out", "sum", "x"));
        definition.connections.push(ConnectionDefinition::new("c1", "out", "sum", "y"));
        Ok(definition)
    }
}

#[test]
fn test_custom_format_through_into_graph() {
    let (mut graph, index) = Chain {
        values: vec![1.5, 2.5],
    }
    .into_graph()
    .unwrap()
    .build()
    .unwrap();

    let outputs = DataflowEngine::new()
        .fetch_outputs(&mut graph, index["sum"])
        .unwrap();
    assert_eq!(outputs.get("out"), Some(&Value::Number(4.0)));
}
