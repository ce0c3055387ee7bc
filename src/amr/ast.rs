//! Immutable AMR parse tree.

use serde::{Deserialize, Serialize};

/// A bracketed instance: `(short / concept :role tail ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub short: String,
    pub concept: String,
    /// Relations in source order.
    pub relations: Vec<(String, TreeTail)>,
}

/// The right-hand side of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeTail {
    /// Bare token: either a short-name reference or a constant.
    Symbol(String),
    /// Quoted constant, already unquoted.
    Quoted(String),
    /// Nested instance.
    Instance(Box<Instance>),
}

impl Instance {
    pub fn new(short: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            concept: concept.into(),
            relations: Vec::new(),
        }
    }

    /// Number of instances in this subtree, including `self`.
    pub fn instance_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(instance) = stack.pop() {
            count += 1;
            stack.extend(instance.relations.iter().filter_map(|(_, tail)| match tail {
                TreeTail::Instance(inner) => Some(inner.as_ref()),
                _ => None,
            }));
        }
        count
    }
}
