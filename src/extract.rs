//! Event extraction: predicate nodes of a rewritten graph → [`Event`]s.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::model::{AmrGraph, AmrNode, Event, Role, Tail};
use crate::rewrite;
use crate::Result;

/// Rewrite `graph` in place, then extract its events with sentence id 0.
pub fn convert_amr_to_events(graph: &mut AmrGraph, config: &PipelineConfig) -> Result<Vec<Event>> {
    rewrite::rewrite(graph, config)?;
    Ok(extract_events(graph, 0))
}

/// One event per `Verb` node, in node order; roles in relation order.
///
/// Positions are sentence-relative. A node-valued role carries the tail's
/// concept, span and tokens; its head position is the span end.
pub fn extract_events(graph: &AmrGraph, sent_id: usize) -> Vec<Event> {
    let events: Vec<Event> = graph
        .event_nodes()
        .map(|node| {
            let mut event = Event::new(node.concept.clone(), node.head_idx(), sent_id);
            for (label, tails) in node.relations() {
                for tail in tails {
                    if let Some(role) = make_role(graph, label, tail) {
                        event.roles.push(role);
                    }
                }
            }
            event
        })
        .collect();
    debug!(sent_id, events = events.len(), "extracted events");
    events
}

fn make_role(graph: &AmrGraph, label: &str, tail: &Tail) -> Option<Role> {
    match tail {
        Tail::Literal(literal) => Some(Role::literal(label, literal.as_str())),
        Tail::Node(id) => graph.node(*id).map(|node| node_role(graph, label, node)),
    }
}

fn node_role(graph: &AmrGraph, label: &str, node: &AmrNode) -> Role {
    let span = node.span();
    Role {
        role: label.to_string(),
        value: graph.find_tokens_by_span(span).map(<[String]>::to_vec),
        concept: node.concept.clone(),
        ent_id: None,
        span,
        head_pos: span.map(|s| s.end),
    }
}
