use crate::error::EvaluationError;
use crate::graph::{Node, Value, ValueMap};
use ahash::AHashMap;

/// Computes the outputs of plain nodes carrying a given label.
pub trait NodeProcessor: Send + Sync {
    fn label(&self) -> &str;
    fn process(&self, node: &Node, inputs: &ValueMap) -> Result<ValueMap, EvaluationError>;
}

/// The value arriving at the node's `index`-th input, in identifier order.
fn operand<'a>(
    node: &Node,
    inputs: &'a ValueMap,
    index: usize,
) -> Result<&'a Value, EvaluationError> {
    let identifier = node
        .inputs()
        .keys()
        .nth(index)
        .ok_or_else(|| EvaluationError::InputNotFound {
            node: node.id(),
            input: format!("#{}", index),
        })?;
    inputs
        .get(identifier)
        .ok_or_else(|| EvaluationError::InputNotFound {
            node: node.id(),
            input: identifier.clone(),
        })
}

/// Writes `value` to every output of the node.
fn broadcast(node: &Node, value: Value) -> ValueMap {
    node.outputs()
        .keys()
        .map(|identifier| (identifier.clone(), value.clone()))
        .collect()
}

fn number(operation: &str, value: &Value) -> Result<f64, EvaluationError> {
    value.as_number().ok_or_else(|| EvaluationError::TypeMismatch {
        operation: operation.to_string(),
        expected: "Number".to_string(),
        found: value.clone(),
    })
}

fn boolean(operation: &str, value: &Value) -> Result<bool, EvaluationError> {
    value.as_bool().ok_or_else(|| EvaluationError::TypeMismatch {
        operation: operation.to_string(),
        expected: "Bool".to_string(),
        found: value.clone(),
    })
}

/// Emits the node's `value` control on every output.
struct ConstProcessor;

impl NodeProcessor for ConstProcessor {
    fn label(&self) -> &str {
        "Const"
    }

    fn process(&self, node: &Node, _inputs: &ValueMap) -> Result<ValueMap, EvaluationError> {
        let value = node
            .control("value")
            .map(|control| control.value().clone())
            .unwrap_or(Value::Null);
        Ok(broadcast(node, value))
    }
}

/// Master macro to define the built-in processors, their registration, and their creation.
macro_rules! define_node_processors {
    ( $( ($struct_name:ident, $label:literal, Unary, $op:expr) ),* $(,)? ; $( ($bi_struct_name:ident, $bi_label:literal, Binary, $bi_op:expr) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl NodeProcessor for $struct_name {
                fn label(&self) -> &str { $label }
                fn process(&self, node: &Node, inputs: &ValueMap) -> Result<ValueMap, EvaluationError> {
                    let op: fn(&Value) -> Result<Value, EvaluationError> = $op;
                    let value = op(operand(node, inputs, 0)?)?;
                    Ok(broadcast(node, value))
                }
            }
        )*
        $(
            struct $bi_struct_name;
            impl NodeProcessor for $bi_struct_name {
                fn label(&self) -> &str { $bi_label }
                fn process(&self, node: &Node, inputs: &ValueMap) -> Result<ValueMap, EvaluationError> {
                    let op: fn(&Value, &Value) -> Result<Value, EvaluationError> = $bi_op;
                    let value = op(operand(node, inputs, 0)?, operand(node, inputs, 1)?)?;
                    Ok(broadcast(node, value))
                }
            }
        )*

        pub(super) fn register_default_processors(registry: &mut AHashMap<String, Box<dyn NodeProcessor>>) {
            registry.insert("Const".to_string(), Box::new(ConstProcessor));
            $( registry.insert($label.to_string(), Box::new($struct_name)); )*
            $( registry.insert($bi_label.to_string(), Box::new($bi_struct_name)); )*
        }

        pub(super) fn create_processor_by_label(label: &str) -> Option<Box<dyn NodeProcessor>> {
            match label {
                "Const" => Some(Box::new(ConstProcessor)),
                $( $label => Some(Box::new($struct_name)), )*
                $( $bi_label => Some(Box::new($bi_struct_name)), )*
                _ => None,
            }
        }
    };
}

define_node_processors! {
    // Unary
    (PassthroughProcessor, "Passthrough", Unary, |v| Ok(v.clone())),
    (NegateProcessor, "Negate", Unary, |v| Ok(Value::Number(-number("Negate", v)?))),
    (AbsProcessor, "Abs", Unary, |v| Ok(Value::Number(number("Abs", v)?.abs()))),
    (NotProcessor, "Not", Unary, |v| Ok(Value::Bool(!boolean("Not", v)?))),

    ;

    // Binary
    (AddProcessor, "Add", Binary, |a, b| Ok(Value::Number(number("Add", a)? + number("Add", b)?))),
    (SubtractProcessor, "Subtract", Binary, |a, b| Ok(Value::Number(number("Subtract", a)? - number("Subtract", b)?))),
    (MultiplyProcessor, "Multiply", Binary, |a, b| Ok(Value::Number(number("Multiply", a)? * number("Multiply", b)?))),
    (DivideProcessor, "Divide", Binary, |a, b| Ok(Value::Number(number("Divide", a)? / number("Divide", b)?))),
    (AndProcessor, "And", Binary, |a, b| Ok(Value::Bool(boolean("And", a)? && boolean("And", b)?))),
    (OrProcessor, "Or", Binary, |a, b| Ok(Value::Bool(boolean("Or", a)? || boolean("Or", b)?))),
}
