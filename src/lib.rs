//! # flowgroup - Node Groups for Flow Graphs
//!
//! **flowgroup** lets a node-based flow graph contain *groups*: opaque nodes that
//! encapsulate a nested graph and expose its floating ports as their own. It also
//! finds every occurrence of a template subgraph and collapses it into such a group.
//!
//! ## Core Workflow
//!
//! 1.  **Build a graph**: Create nodes and connections directly, or import them from a
//!     [`GraphDefinition`](definition::GraphDefinition) (implement
//!     [`IntoGraph`](definition::IntoGraph) for your own format).
//! 2.  **Edit through an [`Editor`](editor::Editor)**: connection mutations are published to
//!     pipes. [`Editor::with_node_groups`](editor::Editor::with_node_groups) installs the
//!     dispatcher that keeps group boundaries in sync.
//! 3.  **Rewrite**: run a [`NodeGroupTransformer`](transform::NodeGroupTransformer) with a list
//!     of [`NodeGroupTemplate`](transform::NodeGroupTemplate)s.
//! 4.  **Evaluate**: pull values through a [`DataflowEngine`](evaluator::DataflowEngine); group
//!     nodes evaluate their nested graph.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgroup::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut editor = Editor::with_node_groups();
//!     let a = editor.add_node(Node::new("Const").with_control("value", 5.0).with_output("out", Socket::any()))?;
//!     let c = editor.add_node(Node::new("Const").with_control("value", 2.0).with_output("out", Socket::any()))?;
//!     let b = editor.add_node(
//!         Node::new("Add")
//!             .with_input("x", Socket::any())
//!             .with_input("y", Socket::any())
//!             .with_output("out", Socket::any()),
//!     )?;
//!     editor.add_connection(Connection::new(a, "out", b, "x"))?;
//!     editor.add_connection(Connection::new(c, "out", b, "y"))?;
//!
//!     // Template: Const(5) feeding Add.x, Add.y left open.
//!     let mut pattern = Graph::new();
//!     let ta = pattern.add_node(Node::new("Const").with_control("value", 5.0).with_output("out", Socket::any()))?;
//!     let tb = pattern.add_node(
//!         Node::new("Add")
//!             .with_input("x", Socket::any())
//!             .with_input("y", Socket::any())
//!             .with_output("out", Socket::any()),
//!     )?;
//!     pattern.add_connection(Connection::new(ta, "out", tb, "x"))?;
//!     let template = NodeGroupTemplate::from_graph("AddFive", pattern)?;
//!
//!     let report = NodeGroupTransformer::new(&mut editor).transform_all(&[template])?;
//!     println!("created {} group(s)\n{}", report.total(), editor.graph());
//!
//!     let group = report.created_for("AddFive")[0];
//!     let mut engine = DataflowEngine::new();
//!     let outputs = engine.fetch_outputs(editor.graph_mut(), group)?;
//!     println!("{:?}", outputs);
//!     Ok(())
//! }
//! ```

pub mod definition;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod group;
pub mod prelude;
pub mod transform;
