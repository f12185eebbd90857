use clap::{Parser, ValueEnum};
use flowgroup::definition::{
    ConnectionDefinition, NodeDefinition, NodeIndex, PortDefinition, TemplateDefinition,
};
use flowgroup::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the node-editor export format and are only used here for conversion.

#[derive(Deserialize)]
struct RawEditorExport {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    data: RawNodeData,
}

#[derive(Deserialize)]
struct RawNodeData {
    label: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    controls: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawEdge {
    source: String,
    #[serde(alias = "sourceHandle")]
    source_handle: String,
    target: String,
    #[serde(alias = "targetHandle")]
    target_handle: String,
}

// --- Converter Implementation ---

impl IntoGraph for RawEditorExport {
    fn into_graph(self) -> std::result::Result<GraphDefinition, DefinitionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| NodeDefinition {
                id: raw.id,
                label: raw.data.label,
                inputs: raw.data.inputs.into_iter().map(PortDefinition::new).collect(),
                outputs: raw.data.outputs.into_iter().map(PortDefinition::new).collect(),
                controls: raw.data.controls,
            })
            .collect();
        let connections = self
            .edges
            .into_iter()
            .map(|raw| {
                ConnectionDefinition::new(raw.source, raw.source_handle, raw.target, raw.target_handle)
            })
            .collect();
        Ok(GraphDefinition { nodes, connections })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// The canonical graph definition format
    Definition,
    /// A node-editor export with `nodes[].data` and `edges[]`
    Editor,
}

/// Collapses template matches of a flow graph into node groups
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the graph JSON file
    graph_path: String,
    /// Path to a JSON array of template definitions
    templates_path: Option<String>,

    /// Format of the graph file
    #[arg(short, long, value_enum, default_value = "definition")]
    format: InputFormat,

    /// Evaluate the node with this id after rewriting
    #[arg(short, long)]
    evaluate: Option<String>,

    /// Evaluate nodes labelled LABEL like a built-in, given as LABEL=BUILTIN
    #[arg(long = "alias", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,
}

fn parse_alias(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(label, builtin)| (label.to_string(), builtin.to_string()))
        .ok_or_else(|| format!("expected LABEL=BUILTIN, got '{}'", raw))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Loading ---
    let graph_json = fs::read_to_string(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read graph file '{}': {}", cli.graph_path, e))
    });
    let definition = match cli.format {
        InputFormat::Definition => GraphDefinition::from_json(&graph_json),
        InputFormat::Editor => serde_json::from_str::<RawEditorExport>(&graph_json)
            .map_err(|e| DefinitionError::JsonParseError(e.to_string()))
            .and_then(IntoGraph::into_graph),
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to load graph: {}", e)));
    let (graph, index) = definition
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build graph: {}", e)));

    let templates = match &cli.templates_path {
        Some(path) => load_templates(path),
        None => {
            println!("No templates file provided. The graph is left as is.");
            Vec::new()
        }
    };

    println!(
        "Loaded graph with {} nodes and {} connections, {} template(s)",
        graph.node_count(),
        graph.connection_count(),
        templates.len()
    );

    // --- 2. Rewriting ---
    let mut editor = Editor::from_graph(graph).with_pipe(GroupDispatcher);
    let transform_start = Instant::now();
    let report = NodeGroupTransformer::new(&mut editor)
        .transform_all(&templates)
        .unwrap_or_else(|e| exit_with_error(&format!("Transformation failed: {}", e)));
    let transform_duration = transform_start.elapsed();

    println!("\n--- Groups Created ---");
    for (identifier, created) in &report.groups {
        println!("  {:<24} {}", identifier, created.len());
    }
    println!("\n--- Resulting Graph ---");
    print!("{}", editor.graph());

    // --- 3. Evaluation ---
    if let Some(id) = &cli.evaluate {
        evaluate(&mut editor, &index, id, &cli.aliases);
    }

    println!("\n--- Performance Summary ---");
    println!("Transformation:       {:?}", transform_duration);
    println!("Total Execution:      {:?}", total_start.elapsed());
}

fn load_templates(path: &str) -> Vec<NodeGroupTemplate> {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read templates file '{}': {}", path, e))
    });
    TemplateDefinition::list_from_json(&json)
        .and_then(|definitions| {
            definitions
                .into_iter()
                .map(TemplateDefinition::into_template)
                .collect()
        })
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load templates: {}", e)))
}

fn evaluate(editor: &mut Editor, index: &NodeIndex, id: &str, aliases: &[(String, String)]) {
    let node = *index
        .get(id)
        .unwrap_or_else(|| exit_with_error(&format!("Unknown node id '{}'", id)));
    if !editor.graph().contains_node(node) {
        exit_with_error(&format!(
            "Node '{}' was moved into a group and can no longer be evaluated directly",
            id
        ));
    }
    let mut builder = DataflowEngine::builder();
    for (label, builtin) in aliases {
        builder = builder.with_label_alias(label, builtin);
    }
    let mut engine = builder.build();
    let outputs = engine
        .fetch_outputs(editor.graph_mut(), node)
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));

    println!("\n--- Outputs of '{}' ---", id);
    let mut outputs: Vec<_> = outputs.into_iter().collect();
    outputs.sort_by(|a, b| a.0.cmp(&b.0));
    for (identifier, value) in outputs {
        println!("  {} = {}", identifier, value);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
