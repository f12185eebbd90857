//! Pull-based dataflow evaluation of flow graphs.

use crate::error::EvaluationError;
use crate::graph::{Connection, Graph, NodeId, NodeKind, ValueMap};
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

mod processors;

pub use processors::NodeProcessor;
use processors::{create_processor_by_label, register_default_processors};

/// The evaluation contract group nodes rely on.
pub trait Evaluation {
    /// Invalidates every cached result.
    fn reset(&mut self);

    /// Computes the values arriving at each connected input of `node`.
    fn fetch_inputs(&mut self, graph: &mut Graph, node: NodeId) -> Result<ValueMap, EvaluationError>;
}

type Registry = AHashMap<String, Box<dyn NodeProcessor>>;

/// Evaluates nodes on demand, caching each node's outputs until [`Evaluation::reset`].
///
/// Plain nodes are computed by the processor registered for their label. Group
/// nodes evaluate their nested graph through a child engine sharing the registry.
pub struct DataflowEngine {
    registry: Arc<Registry>,
    cache: AHashMap<NodeId, ValueMap>,
    visiting: AHashSet<NodeId>,
}

pub struct EngineBuilder {
    registry: Registry,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        let mut registry: Registry = AHashMap::new();
        register_default_processors(&mut registry);
        Self { registry }
    }

    /// Evaluates nodes labelled `user_label` with the built-in processor `builtin_label`.
    pub fn with_label_alias(mut self, user_label: &str, builtin_label: &str) -> Self {
        if let Some(processor) = create_processor_by_label(builtin_label) {
            self.registry.insert(user_label.to_string(), processor);
        }
        self
    }

    pub fn with_processor(mut self, processor: Box<dyn NodeProcessor>) -> Self {
        self.registry
            .insert(processor.label().to_string(), processor);
        self
    }

    pub fn build(self) -> DataflowEngine {
        DataflowEngine {
            registry: Arc::new(self.registry),
            cache: AHashMap::new(),
            visiting: AHashSet::new(),
        }
    }
}

impl Default for DataflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DataflowEngine {
    /// An engine with the built-in processors only.
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Computes the outputs of `node`.
    pub fn fetch_outputs(&mut self, graph: &mut Graph, node: NodeId) -> Result<ValueMap, EvaluationError> {
        if let Some(cached) = self.cache.get(&node) {
            return Ok(cached.clone());
        }
        if !self.visiting.insert(node) {
            return Err(EvaluationError::Cycle(node));
        }
        let result = self.compute(graph, node);
        self.visiting.remove(&node);
        let outputs = result?;
        self.cache.insert(node, outputs.clone());
        Ok(outputs)
    }

    fn compute(&mut self, graph: &mut Graph, id: NodeId) -> Result<ValueMap, EvaluationError> {
        let inputs = self.fetch_inputs(graph, id)?;
        let mut child = self.child();
        let node = graph.node_mut(id)?;
        if let Some(group) = node.as_group_mut() {
            return group.evaluate(inputs, &mut child);
        }
        match node.kind() {
            NodeKind::GroupInput { values } => values.clone().ok_or(EvaluationError::InputsNotSet(id)),
            NodeKind::GroupOutput => Ok(ValueMap::new()),
            _ => {
                let processor = self
                    .registry
                    .get(node.label())
                    .ok_or_else(|| EvaluationError::UnknownProcessor(node.label().to_string()))?;
                processor.process(node, &inputs)
            }
        }
    }

    fn child(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            cache: AHashMap::new(),
            visiting: AHashSet::new(),
        }
    }
}

impl Evaluation for DataflowEngine {
    fn reset(&mut self) {
        self.cache.clear();
        self.visiting.clear();
    }

    fn fetch_inputs(&mut self, graph: &mut Graph, node: NodeId) -> Result<ValueMap, EvaluationError> {
        let incoming: Vec<Connection> = graph
            .connections()
            .filter(|c| c.target == node)
            .cloned()
            .collect();
        let mut inputs = ValueMap::new();
        for connection in incoming {
            let outputs = self.fetch_outputs(graph, connection.source)?;
            let value = outputs.get(&connection.source_output).cloned().ok_or_else(|| {
                EvaluationError::InputNotFound {
                    node,
                    input: connection.target_input.clone(),
                }
            })?;
            inputs.insert(connection.target_input, value);
        }
        Ok(inputs)
    }
}
