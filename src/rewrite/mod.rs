//! Graph rewrite engine: structural normalization before event extraction.
//!
//! A fixed pipeline, each stage mutating the graph in place:
//!
//! 1. [`split_and_node`]: distribute coordinated arguments over their head
//! 2. [`recognize_modalities`]: stop modal predicates from owning events
//! 3. [`add_reverse_of_argn_of`]: materialize `:ARGn` for every `:ARGn-of`
//! 4. [`filter_relations`]: keep only allow-listed labels
//!
//! Stage 3 introduces cycles. Everything downstream traverses with a
//! visited set.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::PipelineConfig;
use crate::model::{AmrGraph, NodeId, NodeKind, Tail};
use crate::Result;

/// Labels surviving [`filter_relations`] by default.
pub const DEFAULT_ALLOWED_RELATIONS: &[&str] = &[
    ":ARG0", ":ARG1", ":ARG2", ":ARG3", ":ARG4",
    ":op1", ":op2", ":op3", ":op4",
    ":location", ":destination", ":path",
    ":instrument", ":manner", ":topic", ":medium",
    ":mod", ":poss",
];

/// What [`recognize_modalities`] does with a predicate that governs another
/// predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityPolicy {
    /// Drop the verb→verb edge. Both predicates keep producing events.
    #[default]
    RemoveEdge,
    /// Keep the edge, demote the governing predicate to `Modality` so it
    /// no longer produces an event.
    Relabel,
}

/// Run all four stages in order.
pub fn rewrite(graph: &mut AmrGraph, config: &PipelineConfig) -> Result<()> {
    split_and_node(graph)?;
    recognize_modalities(graph, config.modality)?;
    add_reverse_of_argn_of(graph)?;
    filter_relations(graph, config.allowed_relations.as_slice());
    Ok(())
}

// ============================================================================
// Stages
// ============================================================================

/// Replace every `(h, r, and)` by `(h, r, op)` for each operand of the
/// conjunction. Nested conjunctions are flattened in the same pass.
pub fn split_and_node(graph: &mut AmrGraph) -> Result<()> {
    for rel in graph.relations() {
        let Some(conj) = rel.tail.as_node() else { continue };
        if graph.kind_of(conj) != Some(NodeKind::Conjunction) {
            continue;
        }
        let operands = conjunction_operands(graph, conj);
        trace!(head = %rel.head, label = %rel.label, operands = operands.len(), "splitting conjunction");
        for operand in operands {
            graph.add_relation(rel.head, &rel.label, operand)?;
        }
        graph.remove_relation(rel.head, &rel.label, &rel.tail)?;
    }
    Ok(())
}

/// Non-conjunction tails under `conj`, descending through nested
/// conjunctions, in child order.
fn conjunction_operands(graph: &AmrGraph, conj: NodeId) -> Vec<Tail> {
    let mut visited = HashSet::new();
    let mut operands = Vec::new();
    let mut stack = vec![Tail::Node(conj)];
    while let Some(tail) = stack.pop() {
        let nested = match tail.as_node() {
            Some(id) if graph.kind_of(id) == Some(NodeKind::Conjunction) => id,
            _ => {
                operands.push(tail);
                continue;
            }
        };
        if !visited.insert(nested) {
            continue;
        }
        if let Some(node) = graph.node(nested) {
            let children: Vec<Tail> = node.children().cloned().collect();
            stack.extend(children.into_iter().rev());
        }
    }
    operands
}

/// Handle predicates whose argument is another predicate.
pub fn recognize_modalities(graph: &mut AmrGraph, policy: ModalityPolicy) -> Result<()> {
    for rel in graph.relations() {
        let Some(tail) = rel.tail.as_node() else { continue };
        if graph.kind_of(rel.head) != Some(NodeKind::Verb) || graph.kind_of(tail) != Some(NodeKind::Verb) {
            continue;
        }
        match policy {
            ModalityPolicy::RemoveEdge => graph.remove_relation(rel.head, &rel.label, &rel.tail)?,
            ModalityPolicy::Relabel => {
                if let Some(head) = graph.node_mut(rel.head) {
                    head.mark_modality();
                }
            }
        }
    }
    Ok(())
}

/// For `(h, :ARGn-of, t)` with `t` a node, add `(t, :ARGn, h)`. The
/// original edge stays.
pub fn add_reverse_of_argn_of(graph: &mut AmrGraph) -> Result<()> {
    for rel in graph.relations() {
        let Some(tail) = rel.tail.as_node() else { continue };
        if let Some(forward) = inverse_arg_label(&rel.label) {
            graph.add_relation(tail, forward, Tail::Node(rel.head))?;
        }
    }
    Ok(())
}

/// `:ARG<digits>-of` → `:ARG<digits>`.
fn inverse_arg_label(label: &str) -> Option<&str> {
    let forward = label.strip_suffix("-of")?;
    let digits = forward.strip_prefix(":ARG")?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(forward)
}

/// Drop every label not in `allowed`, on every node.
pub fn filter_relations<S: AsRef<str>>(graph: &mut AmrGraph, allowed: &[S]) {
    let allowed: HashSet<&str> = allowed.iter().map(AsRef::as_ref).collect();
    let ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id()).collect();
    for id in ids {
        if let Some(node) = graph.node_mut(id) {
            node.retain_relations(|label| allowed.contains(label));
        }
    }
}
