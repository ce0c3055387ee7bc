//! Coreference entities and mention head words.

use hashbrown::HashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Span;

/// Placeholder for an absent word or concept in exported records.
pub const NONE_WORD: &str = "None";

/// Pronouns and punctuation never chosen as a mention head.
pub const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they",
    "me", "him", "her", "us", "them",
    "myself", "yourself", "himself", "herself", "itself", "ourself", "ourselves", "themselves",
    "my", "your", "his", "its", "it's", "our", "their",
    "mine", "yours", "ours", "theirs",
    "this", "that", "those", "these",
    "-", ",",
];

/// Built-in English stop words.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
    "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below",
    "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s",
    "t", "can", "will", "just", "don", "don't", "should", "should've", "now", "d",
    "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Word lists used to pick content words out of mentions.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pronouns: HashSet<String>,
    stopwords: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::with_stopwords(DEFAULT_STOPWORDS.iter().copied())
    }
}

impl Lexicon {
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pronouns: PRONOUNS.iter().map(|p| p.to_string()).collect(),
            stopwords: stopwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Lowercased mention words minus pronouns, stop words and 1-letter words.
    pub fn content_words(&self, mention: &[String]) -> Vec<String> {
        mention
            .iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !self.pronouns.contains(w) && !self.stopwords.contains(w))
            .filter(|w| w.chars().count() > 1)
            .collect()
    }

    /// Rightmost content word of a mention, or `"None"`.
    pub fn headword(&self, mention: &[String]) -> String {
        self.content_words(mention)
            .pop()
            .unwrap_or_else(|| NONE_WORD.to_string())
    }
}

/// Most frequent item; ties go to the first seen.
pub(crate) fn most_common<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item.as_ref().to_string()).or_default() += 1;
    }
    let mut best: Option<(&String, usize)> = None;
    for (item, &count) in &counts {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item.clone())
}

/// A coreference cluster within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub ent_id: usize,
    /// Mention tokens, one list per mention.
    pub mentions: Vec<Vec<String>>,
    /// Document-absolute mention spans.
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Most frequent mention head word.
    pub head: String,
    /// Longest filtered mention.
    pub salient_mention: Vec<String>,
    /// Most common AMR concept among the roles this entity fills.
    pub concept: String,
}

impl Entity {
    /// Derive head word and salient mention; concept starts as `"None"`.
    pub fn new(ent_id: usize, spans: Vec<Span>, mentions: Vec<Vec<String>>, lexicon: &Lexicon) -> Self {
        let head = most_common(
            mentions
                .iter()
                .map(|m| lexicon.headword(m))
                .filter(|w| w != NONE_WORD),
        )
        .unwrap_or_else(|| NONE_WORD.to_string());

        let mut salient_mention = Vec::new();
        for mention in &mentions {
            let words = lexicon.content_words(mention);
            if words.len() > salient_mention.len() {
                salient_mention = words;
            }
        }

        Self {
            ent_id,
            mentions,
            spans,
            head,
            salient_mention,
            concept: NONE_WORD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_headword() {
        let lex = Lexicon::default();
        assert_eq!(lex.headword(&words("the knife dealer")), "dealer");
        assert_eq!(lex.headword(&words("The Dealer 's")), "'s");
        assert_eq!(lex.headword(&words("he")), NONE_WORD);
        assert_eq!(lex.headword(&words("a")), NONE_WORD);
        assert_eq!(lex.headword(&[]), NONE_WORD);
    }

    #[test]
    fn test_custom_stopwords() {
        let lex = Lexicon::with_stopwords(["dealer"]);
        assert_eq!(lex.headword(&words("the knife dealer")), "knife");
    }

    #[test]
    fn test_entity_derivation() {
        let lex = Lexicon::default();
        let entity = Entity::new(
            0,
            vec![Span::new(0, 3), Span::new(5, 6), Span::new(9, 11)],
            vec![words("the old dealer"), words("he"), words("the dealer")],
            &lex,
        );
        assert_eq!(entity.head, "dealer");
        assert_eq!(entity.salient_mention, words("old dealer"));
        assert_eq!(entity.concept, NONE_WORD);
    }

    #[test]
    fn test_entity_all_pronouns() {
        let entity = Entity::new(3, Vec::new(), vec![words("he"), words("him")], &Lexicon::default());
        assert_eq!(entity.head, NONE_WORD);
        assert!(entity.salient_mention.is_empty());
    }

    #[test]
    fn test_most_common_tie_keeps_first() {
        assert_eq!(most_common(["b", "a", "a", "b"]), Some("b".to_string()));
        assert_eq!(most_common(["b", "a", "a"]), Some("a".to_string()));
        assert_eq!(most_common(Vec::<String>::new()), None);
    }
}
