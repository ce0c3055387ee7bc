//! Stop-lists of generic `(predicate, role)` pairs.

use std::path::Path;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;

use crate::model::Document;
use crate::{Error, Result};

/// High-frequency `(predicate, grammatical relation)` pairs to leave out of
/// chains, e.g. `("say-01", ":ARG0")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopList {
    pairs: HashMap<String, HashSet<String>>,
    len: usize,
}

impl StopList {
    pub fn new<I, P, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let mut list = Self::default();
        for (predicate, role) in pairs {
            list.insert(predicate, role);
        }
        list
    }

    /// Returns whether the pair was new.
    pub fn insert(&mut self, predicate: impl Into<String>, role: impl Into<String>) -> bool {
        let added = self.pairs.entry(predicate.into()).or_default().insert(role.into());
        if added {
            self.len += 1;
        }
        added
    }

    pub fn contains(&self, predicate: &str, role: &str) -> bool {
        self.pairs.get(predicate).is_some_and(|roles| roles.contains(role))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One `predicate<TAB>role` pair per line. Blank lines and `#` comments
    /// are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut list = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split('\t').collect::<Vec<_>>().as_slice() {
                [predicate, role] if !predicate.is_empty() && !role.is_empty() => {
                    list.insert(*predicate, *role);
                }
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "stop-list line {}: expected 'predicate<TAB>role', got '{line}'",
                        lineno + 1
                    )));
                }
            }
        }
        Ok(list)
    }

    /// Every pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .flat_map(|(predicate, roles)| roles.iter().map(move |role| (predicate.as_str(), role.as_str())))
    }

    /// Sorted `predicate<TAB>role` lines, readable by [`StopList::parse`].
    pub fn to_tsv(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self.iter().collect();
        pairs.sort_unstable();
        pairs.into_iter().map(|(predicate, role)| format!("{predicate}\t{role}\n")).collect()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// The `top_k` most frequent predicate-GR pairs over every entity chain
    /// of `documents`. Ties go to the pair seen first.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>, top_k: usize) -> Self {
        let mut counts: IndexMap<(String, String), usize> = IndexMap::new();
        for doc in documents {
            for (entity, chain) in doc.chains(None) {
                for event in chain {
                    if let Some((predicate, role)) = event.predicate_gr(entity) {
                        *counts.entry((predicate.to_string(), role.to_string())).or_default() += 1;
                    }
                }
            }
        }
        let mut ranked: Vec<((String, String), usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        Self::new(ranked.into_iter().take(top_k).map(|(pair, _)| pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Event, Lexicon, Role};

    #[test]
    fn test_parse() {
        let list = StopList::parse("# generic\nsay-01\t:ARG0\n\nhave-03\t:ARG0\nsay-01\t:ARG0\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("say-01", ":ARG0"));
        assert!(!list.contains("say-01", ":ARG1"));
        assert!(!list.contains("go-02", ":ARG0"));
        assert_eq!(list.to_tsv(), "have-03\t:ARG0\nsay-01\t:ARG0\n");
        assert_eq!(StopList::parse(&list.to_tsv()).unwrap(), list);
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = StopList::parse("say-01\t:ARG0\nsay-01 :ARG1\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(StopList::parse("say-01\t\n").is_err());
    }

    fn role(label: &str, ent_id: usize) -> Role {
        Role {
            role: label.into(),
            value: None,
            concept: "person".into(),
            ent_id: Some(ent_id),
            span: None,
            head_pos: None,
        }
    }

    #[test]
    fn test_from_documents_top_k() {
        let lex = Lexicon::default();
        let mut events = Vec::new();
        for (i, (predicate, label)) in [
            ("say-01", ":ARG0"),
            ("go-02", ":ARG0"),
            ("say-01", ":ARG0"),
            ("have-03", ":ARG0"),
            ("have-03", ":ARG0"),
            ("say-01", ":ARG0"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut e = Event::new(predicate, Some(i), 0);
            e.roles.push(role(label, 0));
            events.push(e);
        }
        let doc = Document {
            doc_id: "d".into(),
            entities: vec![Entity::new(0, Vec::new(), vec![vec!["senator".into()]], &lex)],
            events,
        };

        let top = StopList::from_documents([&doc], 2);
        assert_eq!(top.len(), 2);
        assert!(top.contains("say-01", ":ARG0"));
        assert!(top.contains("have-03", ":ARG0"));
        assert!(!top.contains("go-02", ":ARG0"));

        assert!(StopList::from_documents([&doc], 0).is_empty());
    }
}
