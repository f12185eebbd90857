use super::model::GraphDefinition;
use crate::error::DefinitionError;

/// A trait for custom graph formats that can be converted into a `GraphDefinition`.
///
/// Implement it on the structs your own format deserializes into, then call
/// [`GraphDefinition::build`] on the result.
///
/// # Example
///
/// ```rust,no_run
/// use flowgroup::definition::{ConnectionDefinition, GraphDefinition, IntoGraph, NodeDefinition, PortDefinition};
/// use flowgroup::error::DefinitionError;
///
/// struct Wire { from: String, to: String }
/// struct MyChain { constants: Vec<String>, wires: Vec<Wire> }
///
/// impl IntoGraph for MyChain {
///     fn into_graph(self) -> Result<GraphDefinition, DefinitionError> {
///         let nodes = self
///             .constants
///             .into_iter()
///             .map(|id| NodeDefinition {
///                 id,
///                 label: "Const".to_string(),
///                 inputs: vec![],
///                 outputs: vec![PortDefinition::new("out")],
///                 controls: Default::default(),
///             })
///             .collect();
///         let connections = self
///             .wires
///             .into_iter()
///             .map(|w| ConnectionDefinition::new(w.from, "out", w.to, "in"))
///             .collect();
///         Ok(GraphDefinition { nodes, connections })
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph definition.
    fn into_graph(self) -> Result<GraphDefinition, DefinitionError>;
}

impl IntoGraph for GraphDefinition {
    fn into_graph(self) -> Result<GraphDefinition, DefinitionError> {
        Ok(self)
    }
}
