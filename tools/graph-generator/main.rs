use clap::Parser;
use flowgroup::definition::{
    ConnectionDefinition, GraphDefinition, NodeDefinition, PortDefinition, TemplateDefinition,
};
use flowgroup::graph::Value;
use rand::{Rng, rngs::ThreadRng};
use std::collections::BTreeMap;
use std::fs;

/// A CLI tool to generate Const/Add graphs with a repeated motif for the flowgroup CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated graph JSON file to
    #[arg(short, long, default_value = "generated_graph.json")]
    output: String,

    /// The path to write the matching template JSON file to
    #[arg(short, long, default_value = "generated_templates.json")]
    templates: String,

    /// The number of motif instances to plant in the graph
    #[arg(long, default_value_t = 10)]
    motifs: usize,

    /// The number of random filler nodes to add around the motifs
    #[arg(long, default_value_t = 20)]
    noise: usize,

    /// The control value of the motif's constant
    #[arg(long, default_value_t = 5.0)]
    constant: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    println!(
        "Generating graph with {} motif(s) and {} filler node(s)...",
        cli.motifs, cli.noise
    );

    let graph = generate_graph(&mut rng, cli.motifs, cli.noise, cli.constant);
    let template = TemplateDefinition {
        identifier: "AddConstant".to_string(),
        graph: motif_template(cli.constant),
    };

    fs::write(&cli.output, serde_json::to_string_pretty(&graph)?)?;
    fs::write(&cli.templates, serde_json::to_string_pretty(&[template])?)?;

    println!(
        "Successfully generated '{}' ({} nodes, {} connections) and '{}'",
        cli.output,
        graph.nodes.len(),
        graph.connections.len(),
        cli.templates
    );
    Ok(())
}

fn constant(id: String, value: f64) -> NodeDefinition {
    let mut controls = BTreeMap::new();
    controls.insert("value".to_string(), Value::Number(value));
    NodeDefinition {
        id,
        label: "Const".to_string(),
        inputs: vec![],
        outputs: vec![PortDefinition::new("out")],
        controls,
    }
}

fn binary(id: String, label: &str) -> NodeDefinition {
    NodeDefinition {
        id,
        label: label.to_string(),
        inputs: vec![PortDefinition::new("x"), PortDefinition::new("y")],
        outputs: vec![PortDefinition::new("out")],
        controls: BTreeMap::new(),
    }
}

/// Const(constant) -> Add.x, with Add.y left open.
fn motif_template(value: f64) -> GraphDefinition {
    GraphDefinition {
        nodes: vec![constant("c".to_string(), value), binary("add".to_string(), "Add")],
        connections: vec![ConnectionDefinition::new("c", "out", "add", "x")],
    }
}

/// Plants `motifs` copies of the template motif, each fed by a random constant, and
/// chains their results through randomly chosen filler operations.
fn generate_graph(rng: &mut ThreadRng, motifs: usize, noise: usize, value: f64) -> GraphDefinition {
    let mut graph = GraphDefinition::default();
    let mut results = Vec::new();

    for i in 0..motifs {
        let (c, feed, add) = (format!("m{}_c", i), format!("m{}_feed", i), format!("m{}_add", i));
        graph.nodes.push(constant(c.clone(), value));
        graph.nodes.push(constant(feed.clone(), rng.random_range(-100.0..100.0)));
        graph.nodes.push(binary(add.clone(), "Add"));
        graph.connections.push(ConnectionDefinition::new(&c, "out", &add, "x"));
        graph.connections.push(ConnectionDefinition::new(&feed, "out", &add, "y"));
        results.push(add);
    }

    let operations = ["Add", "Subtract", "Multiply"];
    for i in 0..noise {
        let id = format!("f{}", i);
        if results.len() < 2 || rng.random_bool(0.3) {
            // A constant that never equals the motif's, so it cannot seed a false match.
            let filler = value + rng.random_range(1.0..50.0);
            graph.nodes.push(constant(id.clone(), filler));
        } else {
            let label = operations[rng.random_range(0..operations.len())];
            let x = results.swap_remove(rng.random_range(0..results.len()));
            let y = results.swap_remove(rng.random_range(0..results.len()));
            graph.nodes.push(binary(id.clone(), label));
            graph.connections.push(ConnectionDefinition::new(x, "out", &id, "x"));
            graph.connections.push(ConnectionDefinition::new(y, "out", &id, "y"));
        }
        results.push(id);
    }
    graph
}
