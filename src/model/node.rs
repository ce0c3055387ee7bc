//! Node in the AMR graph.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Span;
use crate::{Error, Result};

/// Arena index of a node inside its [`super::AmrGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frames that look like predicates but denote static relations.
pub const STATIC_FRAMES: &[&str] = &["have-rel-role-91", "have-org-role-91"];

/// Concepts that coordinate their operands.
pub const CONJUNCTION_FRAMES: &[&str] = &["and"];

/// Node classification, derived from the concept at construction.
///
/// The only later transition is `Verb → Modality`, made by the modality
/// recognition rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Concept,
    Verb,
    Static,
    Conjunction,
    Modality,
}

impl NodeKind {
    /// Classify a concept value.
    pub fn classify(concept: &str) -> Self {
        if CONJUNCTION_FRAMES.contains(&concept) {
            NodeKind::Conjunction
        } else if STATIC_FRAMES.contains(&concept) {
            NodeKind::Static
        } else if is_frame_like(concept) {
            NodeKind::Verb
        } else {
            NodeKind::Concept
        }
    }
}

/// `word-digits`: some `-` after the first character, followed by a digit.
fn is_frame_like(concept: &str) -> bool {
    let bytes = concept.as_bytes();
    bytes
        .windows(2)
        .enumerate()
        .any(|(i, w)| i >= 1 && w[0] == b'-' && w[1].is_ascii_digit())
}

/// A relation target: another node or a constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tail {
    Node(NodeId),
    Literal(String),
}

impl Tail {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Tail::Node(id) => Some(*id),
            Tail::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Tail::Literal(s) => Some(s),
            Tail::Node(_) => None,
        }
    }
}

impl From<NodeId> for Tail {
    fn from(id: NodeId) -> Self {
        Tail::Node(id)
    }
}

/// Tails under one relation label. Almost always one or two.
pub type TailList = SmallVec<[Tail; 2]>;

/// A node in the AMR graph.
#[derive(Debug, Clone, PartialEq)]
pub struct AmrNode {
    id: NodeId,
    /// Short-name from the serialization (`d` in `(d / dog)`).
    pub short: String,
    pub concept: String,
    kind: NodeKind,
    /// Label → tails, in insertion order.
    relations: IndexMap<String, TailList>,
    /// One flag per sentence token. Length is fixed at construction.
    scope: Vec<bool>,
}

impl AmrNode {
    pub fn new(id: NodeId, short: impl Into<String>, concept: impl Into<String>, token_count: usize) -> Self {
        let concept = concept.into();
        Self {
            id,
            short: short.into(),
            kind: NodeKind::classify(&concept),
            concept,
            relations: IndexMap::new(),
            scope: vec![false; token_count],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_verb(&self) -> bool {
        self.kind == NodeKind::Verb
    }

    /// Demote a predicate to a modality. Returns whether the kind changed.
    pub fn mark_modality(&mut self) -> bool {
        if self.kind == NodeKind::Verb {
            self.kind = NodeKind::Modality;
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Relations
    // ========================================================================

    pub fn relations(&self) -> &IndexMap<String, TailList> {
        &self.relations
    }

    /// All tails, label order then child order.
    pub fn children(&self) -> impl Iterator<Item = &Tail> {
        self.relations.values().flat_map(|tails| tails.iter())
    }

    /// Node-valued tails only.
    pub fn child_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children().filter_map(Tail::as_node)
    }

    pub fn add_relation(&mut self, label: impl Into<String>, tail: Tail) {
        self.relations.entry(label.into()).or_default().push(tail);
    }

    /// Remove the first `tail` under `label`.
    pub fn remove_relation(&mut self, label: &str, tail: &Tail) -> Result<()> {
        let tails = self.relations.get_mut(label).ok_or_else(|| {
            Error::NotFound(format!("relation {label} on node {}", self.short))
        })?;
        let idx = tails.iter().position(|t| t == tail).ok_or_else(|| {
            Error::NotFound(format!("{tail:?} under {label} on node {}", self.short))
        })?;
        tails.remove(idx);
        Ok(())
    }

    /// Drop every label for which `keep` returns false.
    pub fn retain_relations(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.relations.retain(|label, _| keep(label));
    }

    // ========================================================================
    // Scope
    // ========================================================================

    pub fn scope(&self) -> &[bool] {
        &self.scope
    }

    /// Mark one token as aligned. Out-of-range indices are ignored.
    pub fn update_scope(&mut self, token: usize) {
        if let Some(flag) = self.scope.get_mut(token) {
            *flag = true;
        }
    }

    pub(crate) fn merge_scope(&mut self, other: &[bool]) {
        for (mine, theirs) in self.scope.iter_mut().zip(other) {
            *mine |= *theirs;
        }
    }

    /// Rightmost aligned token.
    pub fn head_idx(&self) -> Option<usize> {
        self.scope.iter().rposition(|&aligned| aligned)
    }

    /// Rightmost aligned run, tolerating a single unaligned gap.
    pub fn span(&self) -> Option<Span> {
        let mut end = None;
        let mut start = 0;
        let mut gap_used = false;
        for i in (0..self.scope.len()).rev() {
            if self.scope[i] {
                end.get_or_insert(i + 1);
                start = i;
            } else if end.is_some() {
                if gap_used {
                    break;
                }
                gap_used = true;
            }
        }
        end.map(|end| Span::new(start, end))
    }
}

impl fmt::Display for AmrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span() {
            Some(span) => write!(f, "({},{},{}-{})", self.short, self.concept, span.start, span.end),
            None => write!(f, "({},{})", self.short, self.concept),
        }
    }
}
