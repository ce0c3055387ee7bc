//! Readers and writers for the on-disk text formats.
//!
//! A work directory holds one file per document under each input kind:
//!
//! ```text
//! <work>/amr/<subdir>/<doc>        AMR per sentence, blank-line separated
//! <work>/align/<subdir>/<doc>      one alignment line per sentence
//! <work>/tokenized/<subdir>/<doc>  one whitespace-tokenized sentence per line
//! <work>/coref/<subdir>/<doc>      one cluster per line, "<start> <end>" tab-separated
//! <work>/event/<subdir>/<doc>      JSON output
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::chain::DocumentInput;
use crate::model::{Alignment, Document, Span};
use crate::{Error, Result};

// ============================================================================
// Text formats
// ============================================================================

/// Coreference clusters, one per non-blank line.
pub fn read_coref(text: &str) -> Result<Vec<Vec<Span>>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(Span::parse).collect::<Result<Vec<_>>>())
        .collect()
}

/// Sentences of whitespace-separated tokens, one per line.
pub fn read_tokenized(text: &str) -> Vec<Vec<String>> {
    text.trim()
        .split('\n')
        .map(|line| line.split_whitespace().map(String::from).collect())
        .collect()
}

/// Alignments, one line per sentence.
pub fn read_alignments(text: &str) -> Result<Vec<Vec<Alignment>>> {
    text.split('\n').map(Alignment::parse_line).collect()
}

/// Per-sentence AMR blocks.
pub fn split_amr_sentences(text: &str) -> Vec<String> {
    text.split("\n\n").map(String::from).collect()
}

// ============================================================================
// Work directory
// ============================================================================

pub const AMR_DIR: &str = "amr";
pub const ALIGN_DIR: &str = "align";
pub const TOKENIZED_DIR: &str = "tokenized";
pub const COREF_DIR: &str = "coref";
pub const EVENT_DIR: &str = "event";

/// A document file within a work directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocRef {
    pub subdir: String,
    pub name: String,
}

impl DocRef {
    pub fn new(subdir: impl Into<String>, name: impl Into<String>) -> Self {
        Self { subdir: subdir.into(), name: name.into() }
    }

    /// File name without a trailing `.txt`.
    pub fn doc_id(&self) -> &str {
        self.name.strip_suffix(".txt").unwrap_or(&self.name)
    }
}

/// The on-disk layout shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, kind: &str, doc: &DocRef) -> PathBuf {
        self.root.join(kind).join(&doc.subdir).join(&doc.name)
    }

    /// Every document under `amr/`, sorted by subdirectory then name.
    pub fn document_names(&self) -> Result<Vec<DocRef>> {
        let mut docs = Vec::new();
        for subdir in fs::read_dir(self.root.join(AMR_DIR))? {
            let subdir = subdir?;
            if !subdir.file_type()?.is_dir() {
                continue;
            }
            let subdir_name = subdir.file_name().to_string_lossy().into_owned();
            for file in fs::read_dir(subdir.path())? {
                let file = file?;
                if file.file_type()?.is_file() {
                    docs.push(DocRef::new(subdir_name.clone(), file.file_name().to_string_lossy().into_owned()));
                }
            }
        }
        docs.sort();
        Ok(docs)
    }

    /// Load all four inputs of a document.
    ///
    /// Returns [`Error::IncompleteInput`] naming the first absent input.
    pub fn load_document(&self, doc: &DocRef) -> Result<DocumentInput> {
        for kind in [AMR_DIR, ALIGN_DIR, TOKENIZED_DIR, COREF_DIR] {
            if !self.path(kind, doc).is_file() {
                return Err(Error::IncompleteInput {
                    doc_id: doc.doc_id().to_string(),
                    missing: kind.to_string(),
                });
            }
        }
        let read = |kind: &str| fs::read_to_string(self.path(kind, doc));
        Ok(DocumentInput {
            doc_id: doc.doc_id().to_string(),
            amr: split_amr_sentences(&read(AMR_DIR)?),
            alignments: read_alignments(&read(ALIGN_DIR)?)?,
            sentences: read_tokenized(&read(TOKENIZED_DIR)?),
            clusters: read_coref(&read(COREF_DIR)?)?,
        })
    }

    pub fn output_path(&self, doc: &DocRef) -> PathBuf {
        self.path(EVENT_DIR, doc)
    }

    /// Whether output for `doc` already exists.
    pub fn is_done(&self, doc: &DocRef) -> bool {
        self.output_path(doc).exists()
    }

    pub fn write_document(&self, doc: &DocRef, document: &Document) -> Result<()> {
        let path = self.output_path(doc);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, document.to_json()?)?;
        Ok(())
    }

    /// Read a previously written document.
    pub fn read_document(&self, doc: &DocRef) -> Result<Document> {
        Document::from_json(&fs::read_to_string(self.output_path(doc))?)
    }
}
