//! Events and their roles.

use serde::{Deserialize, Serialize};

use super::entity::NONE_WORD;
use super::{Entity, Lexicon, Span};

/// One argument of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Relation label, e.g. `:ARG0`.
    pub role: String,
    /// Tokens of the filler (a literal is a single token); absent when the
    /// filler has no aligned span.
    pub value: Option<Vec<String>>,
    /// AMR concept of the filler (the literal itself for constants).
    pub concept: String,
    pub ent_id: Option<usize>,
    /// Sentence-relative token span.
    #[serde(skip)]
    pub span: Option<Span>,
    /// Sentence-relative head position (the exclusive end of `span`).
    #[serde(skip)]
    pub head_pos: Option<usize>,
}

impl Role {
    /// A constant-valued role: no span, no entity.
    pub fn literal(role: impl Into<String>, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self {
            role: role.into(),
            value: Some(vec![literal.clone()]),
            concept: literal,
            ent_id: None,
            span: None,
            head_pos: None,
        }
    }

    /// Word standing for this role: the entity head if resolved, else the
    /// head word of the value.
    pub fn word(&self, entities: &[Entity], lexicon: &Lexicon) -> String {
        if let Some(entity) = self.ent_id.and_then(|id| entities.get(id)) {
            return entity.head.clone();
        }
        match &self.value {
            Some(value) => lexicon.headword(value),
            None => NONE_WORD.to_string(),
        }
    }
}

/// `(predicate, ARG0 word, ARG1 word, ARG2 word, protagonist role)`.
pub type Quintuple = (String, String, String, String, Option<String>);

/// A predicate occurrence with its ordered roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// PropBank frame, e.g. `buy-01`.
    pub predicate: String,
    pub verb_pos: Option<usize>,
    pub sent_id: usize,
    pub roles: Vec<Role>,
}

impl Event {
    pub fn new(predicate: impl Into<String>, verb_pos: Option<usize>, sent_id: usize) -> Self {
        Self {
            predicate: predicate.into(),
            verb_pos,
            sent_id,
            roles: Vec::new(),
        }
    }

    /// `(sentence, verb position)`; an unknown verb position sorts last.
    pub fn position(&self) -> (usize, usize) {
        (self.sent_id, self.verb_pos.unwrap_or(usize::MAX))
    }

    /// Whether any role is filled by `entity`.
    pub fn contains(&self, entity: &Entity) -> bool {
        self.roles.iter().any(|r| r.ent_id == Some(entity.ent_id))
    }

    /// Label of the first role filled by `entity`.
    pub fn find_role(&self, entity: &Entity) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.ent_id == Some(entity.ent_id))
            .map(|r| r.role.as_str())
    }

    /// `(predicate, grammatical relation of entity)`.
    pub fn predicate_gr(&self, entity: &Entity) -> Option<(&str, &str)> {
        self.find_role(entity).map(|role| (self.predicate.as_str(), role))
    }

    /// Distinct entity ids, ascending.
    pub fn entities(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.roles.iter().filter_map(|r| r.ent_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Word of the last role labelled `relation`, or `"None"`.
    pub fn find_arg(&self, relation: &str, entities: &[Entity], lexicon: &Lexicon) -> String {
        self.roles
            .iter()
            .rev()
            .find(|r| r.role == relation)
            .map(|r| r.word(entities, lexicon))
            .unwrap_or_else(|| NONE_WORD.to_string())
    }

    pub fn quintuple(&self, protagonist: &Entity, entities: &[Entity], lexicon: &Lexicon) -> Quintuple {
        (
            self.predicate.clone(),
            self.find_arg(":ARG0", entities, lexicon),
            self.find_arg(":ARG1", entities, lexicon),
            self.find_arg(":ARG2", entities, lexicon),
            self.find_role(protagonist).map(String::from),
        )
    }

    /// `(predicate, protagonist role, role labels, role words)`.
    pub fn rich_repr(
        &self,
        protagonist: &Entity,
        entities: &[Entity],
        lexicon: &Lexicon,
    ) -> (String, Option<String>, Vec<String>, Vec<String>) {
        (
            self.predicate.clone(),
            self.find_role(protagonist).map(String::from),
            self.roles.iter().map(|r| r.role.clone()).collect(),
            self.roles.iter().map(|r| r.word(entities, lexicon)).collect(),
        )
    }

    /// Predicate plus one word per role, without `"None"` placeholders.
    pub fn words(&self, entities: &[Entity]) -> Vec<String> {
        let role_words = self.roles.iter().filter_map(|r| match r.ent_id.and_then(|id| entities.get(id)) {
            Some(entity) => Some(entity.head.clone()),
            None => r.value.as_ref().and_then(|v| v.last().cloned()),
        });
        std::iter::once(self.predicate.clone())
            .chain(role_words)
            .filter(|w| w != NONE_WORD)
            .collect()
    }
}
