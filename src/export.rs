//! AMR export: serialize a graph back to bracketed text.
//!
//! Output re-parses into the same structure:
//!
//! ```text
//! AmrGraph → to_amr_text() → "(t / testify-01 :ARG0 (d / dealer) ...)"
//!   → AmrGraph::parse() → same concepts, labels, child order and sharing
//! ```
//!
//! Each reachable node is written in full at its first occurrence in
//! depth-first order; later occurrences (re-entrancies, cycles introduced by
//! rewriting) print its short-name. A node whose short-name was already
//! written for another node is renamed (`b` → `b2`) so references stay
//! unambiguous. Nodes unreachable from the root are not written.

use std::io::Write;

use hashbrown::{HashMap, HashSet};

use crate::model::*;
use crate::Result;

const INDENT: &str = "    ";

enum Step<'a> {
    Node(NodeId, usize),
    Edge(&'a str, &'a Tail, usize),
    Close,
}

/// Serialize `graph` from its root.
pub fn to_amr_text(graph: &AmrGraph) -> String {
    let mut out = String::new();
    // Output name of every written node, and the set of names in use.
    let mut names: HashMap<NodeId, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut stack = vec![Step::Node(graph.root(), 0)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Node(id, depth) => {
                let Some(node) = graph.node(id) else { continue };
                if let Some(name) = names.get(&id) {
                    out.push_str(name);
                    continue;
                }
                let name = if taken.contains(node.short.as_str()) {
                    fresh_name(graph, &taken, &node.short)
                } else {
                    node.short.clone()
                };
                out.push('(');
                out.push_str(&name);
                taken.insert(name.clone());
                names.insert(id, name);
                out.push_str(" / ");
                out.push_str(&format_token(&node.concept, false));
                stack.push(Step::Close);
                let edges: Vec<(&str, &Tail)> = node
                    .relations()
                    .iter()
                    .flat_map(|(label, tails)| tails.iter().map(move |t| (label.as_str(), t)))
                    .collect();
                stack.extend(edges.into_iter().rev().map(|(label, tail)| Step::Edge(label, tail, depth + 1)));
            }
            Step::Edge(label, tail, depth) => {
                out.push('\n');
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                out.push_str(label);
                out.push(' ');
                match tail {
                    Tail::Node(child) => stack.push(Step::Node(*child, depth)),
                    Tail::Literal(literal) => {
                        let shadows = graph.contains_short(literal) || taken.contains(literal.as_str());
                        out.push_str(&format_token(literal, shadows));
                    }
                }
            }
            Step::Close => out.push(')'),
        }
    }
    out
}

/// `short` plus the smallest suffix from 2 up that names no node and is not
/// already written.
fn fresh_name(graph: &AmrGraph, taken: &HashSet<String>, short: &str) -> String {
    (2..)
        .map(|k| format!("{short}{k}"))
        .find(|candidate| !graph.contains_short(candidate) && !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| short.to_string())
}

/// Write `graph` with a `# ::snt` header carrying its tokens, if any.
pub fn export_amr(graph: &AmrGraph, writer: &mut dyn Write) -> Result<()> {
    if !graph.tokens().is_empty() {
        writeln!(writer, "# ::snt {}", graph.tokens().join(" "))?;
    }
    writeln!(writer, "{}", to_amr_text(graph))?;
    Ok(())
}

/// Bare when it lexes back as one symbol, quoted otherwise. `force` quotes
/// literals that would resolve to a node.
fn format_token(text: &str, force: bool) -> String {
    let bare = !force
        && !text.is_empty()
        && !text.starts_with(':')
        && !text
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '(' | ')' | '/' | '"' | '\\'));
    if bare {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            // Keeps every literal on one line, out of reach of comment stripping.
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
