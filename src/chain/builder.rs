//! Document assembly: sentences + alignments + coreference → [`Document`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::extract;
use crate::model::entity::{most_common, NONE_WORD};
use crate::model::{Alignment, AmrGraph, Document, Entity, Event, Lexicon, Span};
use crate::rewrite;
use crate::Result;

/// Everything needed to build one document, already split per sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInput {
    pub doc_id: String,
    /// AMR text per sentence.
    pub amr: Vec<String>,
    /// Alignments per sentence.
    pub alignments: Vec<Vec<Alignment>>,
    /// Tokens per sentence. Sentence count and offsets come from here.
    pub sentences: Vec<Vec<String>>,
    /// Coreference clusters, document-absolute spans.
    pub clusters: Vec<Vec<Span>>,
}

/// Granularity of a [`SkippedUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipKind {
    /// The whole document produced no output.
    Document,
    /// One sentence was dropped; the document was still written.
    Sentence,
}

/// A sentence or document left out of the output, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    /// `doc_id` or `doc_id#sentence`, for display only.
    pub unit: String,
    pub kind: SkipKind,
    pub reason: String,
}

impl SkippedUnit {
    pub fn document(doc_id: impl Into<String>, reason: impl ToString) -> Self {
        Self { unit: doc_id.into(), kind: SkipKind::Document, reason: reason.to_string() }
    }

    pub fn sentence(doc_id: &str, sent_id: usize, reason: impl ToString) -> Self {
        Self { unit: format!("{doc_id}#{sent_id}"), kind: SkipKind::Sentence, reason: reason.to_string() }
    }
}

/// A finished document plus the sentences that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltDocument {
    pub document: Document,
    pub skipped: Vec<SkippedUnit>,
}

/// Builds [`Document`]s under one configuration. Stateless across calls.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    config: PipelineConfig,
    lexicon: Lexicon,
}

impl DocumentBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        let lexicon = config.lexicon();
        Self { config, lexicon }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Build one document. A sentence that fails to parse or lacks its AMR
    /// or alignment is skipped; the rest of the document is still built.
    pub fn build(&self, input: &DocumentInput) -> BuiltDocument {
        let offsets = sentence_offsets(&input.sentences);
        let all_tokens: Vec<String> = input.sentences.iter().flatten().cloned().collect();

        let mut entities: Vec<Entity> = input
            .clusters
            .iter()
            .enumerate()
            .map(|(ent_id, spans)| {
                let mentions = spans.iter().map(|&span| slice_tokens(&all_tokens, span)).collect();
                Entity::new(ent_id, spans.clone(), mentions, &self.lexicon)
            })
            .collect();

        let mut events = Vec::new();
        let mut skipped = Vec::new();
        for (sent_id, tokens) in input.sentences.iter().enumerate() {
            match self.sentence_events(input, sent_id, tokens) {
                Ok(mut sentence_events) => {
                    for event in &mut sentence_events {
                        resolve_roles(event, tokens, offsets[sent_id], &input.clusters);
                    }
                    events.append(&mut sentence_events);
                }
                Err(reason) => {
                    warn!(doc_id = %input.doc_id, sent_id, %reason, "skipping sentence");
                    skipped.push(SkippedUnit::sentence(&input.doc_id, sent_id, reason));
                }
            }
        }

        // Concepts are counted in extraction order, before sorting and the
        // frame filter.
        for entity in &mut entities {
            let ent_id = entity.ent_id;
            let concepts = events
                .iter()
                .flat_map(|e| &e.roles)
                .filter(|r| r.ent_id == Some(ent_id))
                .map(|r| r.concept.as_str());
            entity.concept = most_common(concepts).unwrap_or_else(|| NONE_WORD.to_string());
        }

        events.sort_by_key(Event::position);
        events.retain(|e| self.config.keeps_frame(&e.predicate));
        debug!(doc_id = %input.doc_id, entities = entities.len(), events = events.len(), "built document");

        BuiltDocument {
            document: Document { doc_id: input.doc_id.clone(), entities, events },
            skipped,
        }
    }

    /// Parse, rewrite and extract one sentence; sentence-relative positions.
    fn sentence_events(&self, input: &DocumentInput, sent_id: usize, tokens: &[String]) -> std::result::Result<Vec<Event>, String> {
        let amr = input.amr.get(sent_id).ok_or("missing AMR")?;
        let alignments = input.alignments.get(sent_id).ok_or("missing alignment")?;
        let run = || -> Result<Vec<Event>> {
            let mut graph = AmrGraph::parse(amr, Some(alignments), Some(tokens.to_vec()))?;
            rewrite::rewrite(&mut graph, &self.config)?;
            Ok(extract::extract_events(&graph, sent_id))
        };
        run().map_err(|e| e.to_string())
    }
}

/// Document offset of each sentence's first token.
fn sentence_offsets(sentences: &[Vec<String>]) -> Vec<usize> {
    sentences
        .iter()
        .scan(0, |next, sentence| {
            let offset = *next;
            *next += sentence.len();
            Some(offset)
        })
        .collect()
}

/// Tokens under `span`, clamped to the available range.
fn slice_tokens(tokens: &[String], span: Span) -> Vec<String> {
    let end = span.end.min(tokens.len());
    let start = span.start.min(end);
    tokens[start..end].to_vec()
}

/// Attach entity ids to roles whose head falls inside a coreference
/// mention, and give unpositioned verbs the sentence length.
fn resolve_roles(event: &mut Event, tokens: &[String], offset: usize, clusters: &[Vec<Span>]) {
    for role in &mut event.roles {
        let Some(head) = role.head_pos else { continue };
        if let Some((ent_id, span)) = match_entity(head + offset, clusters) {
            let local = span.relative_to(offset);
            role.span = Some(local);
            role.value = Some(slice_tokens(tokens, local));
            role.ent_id = Some(ent_id);
        }
    }
    event.verb_pos.get_or_insert(tokens.len());
}

/// Cluster whose mention contains `head`, with that mention's span.
///
/// Containment is `start <= head <= end`: role heads are exclusive span
/// ends. When several mentions contain `head`, the strictly narrowest wins;
/// among equals the first seen is kept.
pub fn match_entity(head: usize, clusters: &[Vec<Span>]) -> Option<(usize, Span)> {
    let mut best: Option<(usize, Span)> = None;
    for (ent_id, spans) in clusters.iter().enumerate() {
        for &span in spans {
            if !(span.start <= head && head <= span.end) {
                continue;
            }
            if best.is_none_or(|(_, b)| span.len() < b.len()) {
                best = Some((ent_id, span));
            }
        }
    }
    best
}
