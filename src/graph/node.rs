use super::Value;
use crate::error::GraphError;
use crate::group::GroupNode;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Values keyed by port identifier, as exchanged during evaluation.
pub type ValueMap = AHashMap<String, Value>;

/// Process-wide unique node identifier. Ids increase monotonically, so ordering
/// by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Opaque type tag attached to a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Socket {
    name: String,
}

impl Socket {
    pub const ANY: &'static str = "any";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// A wildcard socket that is compatible with every other socket.
    pub fn any() -> Self {
        Self::new(Self::ANY)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_compatible(&self, other: &Socket) -> bool {
        self.name == other.name || self.name == Self::ANY || other.name == Self::ANY
    }
}

/// Descriptor of an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub socket: Socket,
    pub label: Option<String>,
}

/// Descriptor of an output port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub socket: Socket,
    pub label: Option<String>,
}

impl Input {
    pub fn new(socket: Socket) -> Self {
        Self {
            socket,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Output {
    pub fn new(socket: Socket) -> Self {
        Self {
            socket,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// Boundary ports mirror the port they stand in for.
impl From<&Input> for Output {
    fn from(input: &Input) -> Self {
        Output {
            socket: input.socket.clone(),
            label: input.label.clone(),
        }
    }
}

impl From<&Output> for Input {
    fn from(output: &Output) -> Self {
        Input {
            socket: output.socket.clone(),
            label: output.label.clone(),
        }
    }
}

/// A control holding a comparable scalar value.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    value: Value,
}

impl Control {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }
}

/// Discriminant of a node's capability, used by dispatchers instead of
/// inspecting the node's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Plain,
    GroupInput,
    GroupOutput,
    Group,
}

/// What a node is, beyond its ports and controls.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Plain,
    /// Values flowing into a group. `values` is set right before the group is evaluated.
    GroupInput { values: Option<ValueMap> },
    /// Values flowing out of a group. Has inputs only.
    GroupOutput,
    /// An opaque node owning a nested group editor.
    Group(Box<GroupNode>),
}

impl NodeKind {
    pub fn role(&self) -> NodeRole {
        match self {
            NodeKind::Plain => NodeRole::Plain,
            NodeKind::GroupInput { .. } => NodeRole::GroupInput,
            NodeKind::GroupOutput => NodeRole::GroupOutput,
            NodeKind::Group(_) => NodeRole::Group,
        }
    }
}

/// A node of a flow graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    inputs: BTreeMap<String, Input>,
    outputs: BTreeMap<String, Output>,
    controls: BTreeMap<String, Control>,
    kind: NodeKind,
}

impl Node {
    pub const INPUTS_LABEL: &'static str = "Inputs";
    pub const OUTPUTS_LABEL: &'static str = "Outputs";

    /// Creates a plain node with a fresh id and no ports.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_kind(label, NodeKind::Plain)
    }

    pub(crate) fn with_kind(label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            label: label.into(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            controls: BTreeMap::new(),
            kind,
        }
    }

    pub(crate) fn inputs_node() -> Self {
        Self::with_kind(Self::INPUTS_LABEL, NodeKind::GroupInput { values: None })
    }

    pub(crate) fn outputs_node() -> Self {
        Self::with_kind(Self::OUTPUTS_LABEL, NodeKind::GroupOutput)
    }

    pub fn with_input(mut self, identifier: &str, socket: Socket) -> Self {
        self.inputs
            .insert(identifier.to_string(), Input::new(socket));
        self
    }

    pub fn with_output(mut self, identifier: &str, socket: Socket) -> Self {
        self.outputs
            .insert(identifier.to_string(), Output::new(socket));
        self
    }

    pub fn with_control(mut self, identifier: &str, value: impl Into<Value>) -> Self {
        self.controls
            .insert(identifier.to_string(), Control::new(value));
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn role(&self) -> NodeRole {
        self.kind.role()
    }

    /// Returns `true` for the inputs/outputs pseudo-nodes of a group editor.
    pub fn is_boundary(&self) -> bool {
        matches!(self.role(), NodeRole::GroupInput | NodeRole::GroupOutput)
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupNode> {
        match &mut self.kind {
            NodeKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &BTreeMap<String, Input> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    pub fn controls(&self) -> &BTreeMap<String, Control> {
        &self.controls
    }

    pub fn input(&self, identifier: &str) -> Option<&Input> {
        self.inputs.get(identifier)
    }

    pub fn output(&self, identifier: &str) -> Option<&Output> {
        self.outputs.get(identifier)
    }

    pub fn control(&self, identifier: &str) -> Option<&Control> {
        self.controls.get(identifier)
    }

    pub fn control_mut(&mut self, identifier: &str) -> Option<&mut Control> {
        self.controls.get_mut(identifier)
    }

    pub fn has_input(&self, identifier: &str) -> bool {
        self.inputs.contains_key(identifier)
    }

    pub fn has_output(&self, identifier: &str) -> bool {
        self.outputs.contains_key(identifier)
    }

    /// Adds an input port. An inputs node can never gain a real input.
    pub fn add_input(&mut self, identifier: &str, input: Input) -> Result<(), GraphError> {
        if self.role() == NodeRole::GroupInput {
            return Err(GraphError::BoundaryViolation {
                node: self.id,
                message: "an inputs node can't have inputs".to_string(),
            });
        }
        self.inputs.insert(identifier.to_string(), input);
        Ok(())
    }

    /// Adds an output port. An outputs node can never gain a real output.
    pub fn add_output(&mut self, identifier: &str, output: Output) -> Result<(), GraphError> {
        if self.role() == NodeRole::GroupOutput {
            return Err(GraphError::BoundaryViolation {
                node: self.id,
                message: "an outputs node can't have outputs".to_string(),
            });
        }
        self.outputs.insert(identifier.to_string(), output);
        Ok(())
    }

    pub fn add_control(&mut self, identifier: &str, value: impl Into<Value>) {
        self.controls
            .insert(identifier.to_string(), Control::new(value));
    }

    pub fn remove_input(&mut self, identifier: &str) -> Option<Input> {
        self.inputs.remove(identifier)
    }

    pub fn remove_output(&mut self, identifier: &str) -> Option<Output> {
        self.outputs.remove(identifier)
    }

    /// Replaces the whole input set. Used for derived port sets (boundary and group nodes).
    pub(crate) fn set_inputs(&mut self, inputs: BTreeMap<String, Input>) {
        self.inputs = inputs;
    }

    pub(crate) fn set_outputs(&mut self, outputs: BTreeMap<String, Output>) {
        self.outputs = outputs;
    }
}
