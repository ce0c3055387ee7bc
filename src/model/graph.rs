//! The AMR graph: a flat node arena plus a short-name index.
//!
//! Nodes are addressed by [`NodeId`]; relations store `Tail::Node(id)`
//! rather than references, so the rewrite stages can freely introduce
//! cycles. Every traversal here keeps an explicit visited set.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Alignment, AmrNode, NodeId, NodeKind, Span, Tail};
use crate::amr::{self, ast::{Instance, TreeTail}};
use crate::{Error, Result};

/// A `(head, label, tail)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub head: NodeId,
    pub label: String,
    pub tail: Tail,
}

/// An AMR graph aligned against one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct AmrGraph {
    nodes: Vec<AmrNode>,
    /// First node created for each short-name.
    short_index: HashMap<String, NodeId>,
    root: NodeId,
    tokens: Vec<String>,
}

impl AmrGraph {
    /// A graph holding only its root node.
    pub fn with_root(short: &str, concept: &str, tokens: Vec<String>) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            short_index: HashMap::new(),
            root: NodeId(0),
            tokens,
        };
        graph.root = graph.add_node(short, concept);
        graph
    }

    /// Parse AMR text, optionally aligned against `tokens`.
    ///
    /// `#` comment lines are ignored; when `tokens` is `None` they are taken
    /// from a `# ::snt` line if present. Alignments are only applied when
    /// tokens are known.
    pub fn parse(text: &str, alignments: Option<&[Alignment]>, tokens: Option<Vec<String>>) -> Result<Self> {
        let (comments, body) = amr::strip_comments(text);
        let tokens = tokens.or_else(|| amr::sentence_tokens(&comments));
        let tree = amr::parse(&body)?;

        let has_tokens = tokens.is_some();
        let mut graph = Self::from_tree(&tree, tokens.unwrap_or_default());
        if let (Some(alignments), true) = (alignments, has_tokens) {
            graph.apply_alignments(alignments);
        }
        Ok(graph)
    }

    /// Build the node arena from a parse tree.
    ///
    /// The first instance of a short-name creates its node; later bare
    /// references to that short-name resolve to it. Unknown bare tokens and
    /// quoted tokens become literals.
    pub fn from_tree(tree: &Instance, tokens: Vec<String>) -> Self {
        let mut graph = Self::with_root(&tree.short, &tree.concept, tokens);
        // (node, its instance, index of the next relation to read). A nested
        // instance is fully read before its parent's next relation, so node
        // order and short-name visibility follow the text left to right.
        let mut stack: Vec<(NodeId, &Instance, usize)> = vec![(graph.root, tree, 0)];
        while let Some((id, instance, next)) = stack.pop() {
            let Some((role, tail)) = instance.relations.get(next) else { continue };
            stack.push((id, instance, next + 1));
            let tail = match tail {
                TreeTail::Instance(inner) => {
                    let child = graph.add_node(&inner.short, &inner.concept);
                    stack.push((child, inner.as_ref(), 0));
                    Tail::Node(child)
                }
                TreeTail::Symbol(s) => match graph.short_index.get(s.as_str()) {
                    Some(&target) => Tail::Node(target),
                    None => Tail::Literal(s.clone()),
                },
                TreeTail::Quoted(s) => Tail::Literal(s.clone()),
            };
            graph.nodes[id.index()].add_relation(role.as_str(), tail);
        }
        graph
    }

    /// Append a node. The short-name index keeps the first node per name.
    pub fn add_node(&mut self, short: &str, concept: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AmrNode::new(id, short, concept, self.tokens.len()));
        self.short_index.entry(short.to_string()).or_insert(id);
        id
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn nodes(&self) -> &[AmrNode] {
        &self.nodes
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn node(&self, id: NodeId) -> Option<&AmrNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut AmrNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(AmrNode::kind)
    }

    pub fn find_node_by_id(&self, short: &str) -> Option<&AmrNode> {
        self.short_index.get(short).and_then(|&id| self.node(id))
    }

    pub fn contains_short(&self, short: &str) -> bool {
        self.short_index.contains_key(short)
    }

    /// Tokens covered by `span`; `None` if the span is absent or out of range.
    pub fn find_tokens_by_span(&self, span: Option<Span>) -> Option<&[String]> {
        let span = span?;
        if span.start >= span.end {
            return None;
        }
        self.tokens.get(span.start..span.end)
    }

    pub fn find_tokens_by_node(&self, id: NodeId) -> Option<&[String]> {
        self.find_tokens_by_span(self.node(id)?.span())
    }

    /// Nodes still classified as predicates.
    pub fn event_nodes(&self) -> impl Iterator<Item = &AmrNode> {
        self.nodes.iter().filter(|n| n.is_verb())
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Every triple: node-list order, then label order, then child order.
    pub fn relations(&self) -> Vec<Relation> {
        self.nodes
            .iter()
            .flat_map(|head| {
                head.relations().iter().flat_map(move |(label, tails)| {
                    tails.iter().map(move |tail| Relation {
                        head: head.id(),
                        label: label.clone(),
                        tail: tail.clone(),
                    })
                })
            })
            .collect()
    }

    /// Fails with `NotFound` if `head`, or a node-valued `tail`, is not in
    /// this graph.
    pub fn add_relation(&mut self, head: NodeId, label: &str, tail: Tail) -> Result<()> {
        if let Some(target) = tail.as_node() {
            if self.node(target).is_none() {
                return Err(Error::NotFound(format!("tail node {target}")));
            }
        }
        self.node_mut(head)
            .ok_or_else(|| Error::NotFound(format!("node {head}")))?
            .add_relation(label, tail);
        Ok(())
    }

    pub fn remove_relation(&mut self, head: NodeId, label: &str, tail: &Tail) -> Result<()> {
        self.node_mut(head)
            .ok_or_else(|| Error::NotFound(format!("node {head}")))?
            .remove_relation(label, tail)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Nodes reachable from `from`, in depth-first pre-order.
    pub fn reachable(&self, from: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            let children: Vec<NodeId> = node.child_nodes().collect();
            stack.extend(children.into_iter().rev().filter(|c| !visited.contains(c)));
        }
        order
    }

    /// Post-order from `from`: in an acyclic region every node comes after
    /// all of its descendants.
    fn post_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![(from, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            let Some(node) = self.node(id) else { continue };
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in node.child_nodes() {
                if !visited.contains(&child) {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    // ========================================================================
    // Alignment
    // ========================================================================

    /// Mark aligned tokens, then fold descendant scopes into ancestors.
    pub fn apply_alignments(&mut self, alignments: &[Alignment]) {
        for alignment in alignments {
            match self.short_index.get(alignment.short.as_str()) {
                Some(&id) => self.nodes[id.index()].update_scope(alignment.token),
                None => debug!(short = %alignment.short, token = alignment.token, "alignment names unknown node"),
            }
        }
        self.update_scope_from_children(self.root);
    }

    /// OR every descendant's scope into each ancestor reachable from `from`.
    ///
    /// Terminates on cyclic graphs; along a cycle the result depends on
    /// which edge closes it.
    pub fn update_scope_from_children(&mut self, from: NodeId) {
        for id in self.post_order(from) {
            let Some(node) = self.node(id) else { continue };
            let children: Vec<NodeId> = node.child_nodes().collect();
            for child in children {
                if child == id {
                    continue;
                }
                let Some(child_scope) = self.node(child).map(|c| c.scope().to_vec()) else { continue };
                if let Some(node) = self.node_mut(id) {
                    node.merge_scope(&child_scope);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTIFY: &str =
        "(t / testify-01 :ARG0 (d / dealer) :ARG1 (b / buy-01 :ARG0 d :ARG1 (k / knife)))";

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i}")).collect()
    }

    fn shorts(graph: &AmrGraph, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| graph.node(id).unwrap().short.clone()).collect()
    }

    #[test]
    fn test_build_shares_reentrant_nodes() {
        let graph = AmrGraph::parse(TESTIFY, None, None).unwrap();
        assert_eq!(graph.nodes().len(), 4);
        let b = graph.find_node_by_id("b").unwrap();
        let d = graph.find_node_by_id("d").unwrap();
        assert_eq!(b.relations()[":ARG0"][0], Tail::Node(d.id()));
        assert_eq!(graph.node(graph.root()).unwrap().concept, "testify-01");
    }

    #[test]
    fn test_node_list_is_preorder() {
        let graph = AmrGraph::parse(TESTIFY, None, None).unwrap();
        let order: Vec<&str> = graph.nodes().iter().map(|n| n.short.as_str()).collect();
        assert_eq!(order, vec!["t", "d", "b", "k"]);
    }

    #[test]
    fn test_reference_before_definition_is_literal() {
        let graph = AmrGraph::parse("(a / and :op1 x :op2 (x / thing))", None, None).unwrap();
        let root = graph.node(graph.root()).unwrap();
        assert_eq!(root.relations()[":op1"][0], Tail::Literal("x".into()));
        assert!(matches!(root.relations()[":op2"][0], Tail::Node(_)));
    }

    #[test]
    fn test_reference_into_earlier_subtree() {
        let graph = AmrGraph::parse(
            "(t / tell-01 :ARG0 (d / doctor :mod (x / young)) :ARG2 (p / person) :ARG1 x)",
            None,
            None,
        ).unwrap();
        let order: Vec<&str> = graph.nodes().iter().map(|n| n.short.as_str()).collect();
        assert_eq!(order, vec!["t", "d", "x", "p"]);
        let root = graph.node(graph.root()).unwrap();
        assert_eq!(root.relations()[":ARG1"][0], Tail::Node(NodeId(2)));
    }

    #[test]
    fn test_quoted_short_is_literal() {
        let graph = AmrGraph::parse("(d / dog :name \"d\")", None, None).unwrap();
        let root = graph.node(graph.root()).unwrap();
        assert_eq!(root.relations()[":name"][0], Tail::Literal("d".into()));
    }

    #[test]
    fn test_duplicate_short_keeps_first() {
        let graph = AmrGraph::parse("(a / and :op1 (x / cat) :op2 (x / dog) :op3 x)", None, None).unwrap();
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.find_node_by_id("x").unwrap().concept, "cat");
        let root = graph.node(graph.root()).unwrap();
        assert_eq!(root.relations()[":op3"][0], Tail::Node(NodeId(1)));
    }

    #[test]
    fn test_relations_order() {
        let graph = AmrGraph::parse(TESTIFY, None, None).unwrap();
        let rels: Vec<(String, String)> = graph
            .relations()
            .iter()
            .map(|r| (graph.node(r.head).unwrap().short.clone(), r.label.clone()))
            .collect();
        assert_eq!(rels, vec![
            ("t".into(), ":ARG0".into()),
            ("t".into(), ":ARG1".into()),
            ("b".into(), ":ARG0".into()),
            ("b".into(), ":ARG1".into()),
        ]);
    }

    #[test]
    fn test_alignment_propagates_upward() {
        let alignments = Alignment::parse_line("0 t\t2 d\t5 b\t8 k").unwrap();
        let graph = AmrGraph::parse(TESTIFY, Some(&alignments), Some(tokens(10))).unwrap();

        let k = graph.find_node_by_id("k").unwrap();
        let b = graph.find_node_by_id("b").unwrap();
        let t = graph.find_node_by_id("t").unwrap();
        assert_eq!(k.span(), Some(Span::new(8, 9)));
        assert_eq!(b.head_idx(), Some(8));
        assert_eq!(b.span(), Some(Span::new(8, 9)));
        assert!(b.scope()[2] && b.scope()[5]);
        assert_eq!(t.scope().iter().filter(|&&f| f).count(), 4);
    }

    #[test]
    fn test_alignment_ignored_without_tokens() {
        let alignments = Alignment::parse_line("0 t").unwrap();
        let graph = AmrGraph::parse(TESTIFY, Some(&alignments), None).unwrap();
        assert!(graph.nodes().iter().all(|n| n.scope().is_empty()));
    }

    #[test]
    fn test_alignment_unknown_short_and_out_of_range() {
        let alignments = vec![Alignment::new(1, "zz"), Alignment::new(40, "d"), Alignment::new(1, "d")];
        let graph = AmrGraph::parse(TESTIFY, Some(&alignments), Some(tokens(3))).unwrap();
        assert_eq!(graph.find_node_by_id("d").unwrap().scope(), &[false, true, false]);
    }

    #[test]
    fn test_snt_metadata_supplies_tokens() {
        let text = "# ::snt the dog barked\n(b / bark-01 :ARG0 (d / dog))";
        let alignments = Alignment::parse_line("1 d\t2 b").unwrap();
        let graph = AmrGraph::parse(text, Some(&alignments), None).unwrap();
        assert_eq!(graph.tokens().len(), 3);
        let d = graph.find_node_by_id("d").unwrap();
        assert_eq!(graph.find_tokens_by_node(d.id()), Some(&["dog".to_string()][..]));
    }

    #[test]
    fn test_find_tokens_by_span_invalid() {
        let graph = AmrGraph::parse(TESTIFY, None, Some(tokens(4))).unwrap();
        assert_eq!(graph.find_tokens_by_span(None), None);
        assert_eq!(graph.find_tokens_by_span(Some(Span::new(2, 9))), None);
        assert_eq!(graph.find_tokens_by_span(Some(Span::new(3, 3))), None);
        assert_eq!(graph.find_tokens_by_span(Some(Span::new(1, 3))).map(|t| t.len()), Some(2));
        assert!(graph.find_node_by_id("nope").is_none());
    }

    #[test]
    fn test_scope_propagation_terminates_on_cycle() {
        let mut graph = AmrGraph::with_root("a", "go-02", tokens(4));
        let b = graph.add_node("b", "person");
        let root = graph.root();
        graph.add_relation(root, ":ARG0", Tail::Node(b)).unwrap();
        graph.add_relation(b, ":ARG0-of", Tail::Node(root)).unwrap();
        graph.add_relation(b, ":mod", Tail::Node(b)).unwrap();
        graph.node_mut(b).unwrap().update_scope(3);

        graph.update_scope_from_children(root);
        assert_eq!(graph.node(root).unwrap().head_idx(), Some(3));
        assert_eq!(shorts(&graph, &graph.reachable(root)), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_relation_missing_node() {
        let mut graph = AmrGraph::with_root("a", "and", Vec::new());
        assert!(matches!(
            graph.remove_relation(NodeId(7), ":op1", &Tail::Literal("x".into())),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_add_relation_rejects_dangling_tail() {
        let mut graph = AmrGraph::with_root("a", "go-02", tokens(1));
        let root = graph.root();
        assert!(matches!(
            graph.add_relation(root, ":ARG0", Tail::Node(NodeId(7))),
            Err(Error::NotFound(_))
        ));
        assert!(graph.node(root).unwrap().relations().is_empty());

        // Node-level edits bypass the check; propagation still skips the id.
        graph.node_mut(root).unwrap().add_relation(":ARG0", Tail::Node(NodeId(7)));
        graph.node_mut(root).unwrap().update_scope(0);
        graph.update_scope_from_children(root);
        assert_eq!(graph.node(root).unwrap().head_idx(), Some(0));
    }

    #[test]
    fn test_event_nodes() {
        let graph = AmrGraph::parse(TESTIFY, None, None).unwrap();
        let verbs: Vec<&str> = graph.event_nodes().map(|n| n.concept.as_str()).collect();
        assert_eq!(verbs, vec!["testify-01", "buy-01"]);
    }
}
