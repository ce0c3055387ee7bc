//! Pipeline configuration.

use std::path::Path;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::model::Lexicon;
use crate::rewrite::{ModalityPolicy, DEFAULT_ALLOWED_RELATIONS};
use crate::Result;

/// Knobs for the rewrite, extraction and chain-building stages.
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes:
///
/// ```json
/// { "modality": "relabel", "workers": 8, "worker_id": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub modality: ModalityPolicy,
    /// Relation labels kept by the final rewrite stage.
    pub allowed_relations: Vec<String>,
    /// When set, only events with these predicates are kept.
    pub frame_list: Option<HashSet<String>>,
    /// Replaces the built-in stop words used for entity head words.
    pub stopwords: Option<Vec<String>>,
    /// Number of shards the batch is split into.
    pub workers: usize,
    /// Shard processed by this worker, `0..workers`.
    pub worker_id: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            modality: ModalityPolicy::default(),
            allowed_relations: DEFAULT_ALLOWED_RELATIONS.iter().map(|s| s.to_string()).collect(),
            frame_list: None,
            stopwords: None,
            workers: 1,
            worker_id: 0,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Word lists for entity head derivation.
    pub fn lexicon(&self) -> Lexicon {
        match &self.stopwords {
            Some(words) => Lexicon::with_stopwords(words.iter().cloned()),
            None => Lexicon::default(),
        }
    }

    /// Whether `predicate` passes the frame filter.
    pub fn keeps_frame(&self, predicate: &str) -> bool {
        self.frame_list.as_ref().is_none_or(|frames| frames.contains(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.modality, ModalityPolicy::RemoveEdge);
        assert_eq!(config.allowed_relations.len(), DEFAULT_ALLOWED_RELATIONS.len());
        assert_eq!((config.workers, config.worker_id), (1, 0));
        assert!(config.keeps_frame("anything-01"));
    }

    #[test]
    fn test_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"modality": "relabel", "frame_list": ["buy-01"], "workers": 4}"#).unwrap();
        assert_eq!(config.modality, ModalityPolicy::Relabel);
        assert_eq!(config.workers, 4);
        assert!(config.keeps_frame("buy-01"));
        assert!(!config.keeps_frame("say-01"));
        assert_eq!(config.allowed_relations, PipelineConfig::default().allowed_relations);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"stopwords": ["dealer"]}}"#).unwrap();
        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        let words = vec!["the".to_string(), "knife".to_string(), "dealer".to_string()];
        assert_eq!(config.lexicon().headword(&words), "knife");
    }

    #[test]
    fn test_from_json_file_errors() {
        assert!(matches!(
            PipelineConfig::from_json_file("/nonexistent/config.json"),
            Err(crate::Error::Io(_))
        ));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(PipelineConfig::from_json_file(file.path()), Err(crate::Error::Json(_))));
    }
}
