//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowgroup
//! crate. Import it to get access to the core functionality without having to import
//! each type individually.

// Graph model
pub use crate::graph::{
    Connection, ConnectionId, Control, Graph, Input, InputPosition, Node, NodeId, NodeKind,
    NodeRole, Output, OutputPosition, Socket, Value, ValueMap,
};

// Editing and groups
pub use crate::editor::{Editor, GraphEvent, Pipe};
pub use crate::group::{GroupDispatcher, GroupEditor, GroupNode};

// Rewriting
pub use crate::transform::{NodeGroupTemplate, NodeGroupTransformer, TransformReport};

// Evaluation
pub use crate::evaluator::{DataflowEngine, EngineBuilder, Evaluation, NodeProcessor};

// Import
pub use crate::definition::{GraphDefinition, IntoGraph, TemplateDefinition};

// Error types
pub use crate::error::{DefinitionError, EvaluationError, GraphError, GroupError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
