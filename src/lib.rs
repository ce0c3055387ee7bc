//! # amr-chains: AMR graphs to narrative event chains
//!
//! Turns Abstract Meaning Representation parses into entity-centric
//! event chains for script/narrative reasoning.
//!
//! ## Design Principles
//!
//! 1. **Parser owns nothing**: AMR text → parse tree is a pure function
//! 2. **Arena graph**: nodes live in a flat `Vec`, edges address them by
//!    `NodeId`, so rewrites may introduce cycles without ownership games
//! 3. **Fixed rewrite pipeline**: split conjunctions, prune modality,
//!    materialize inverse roles, filter relations
//! 4. **Documents are independent**: one failing sentence or document never
//!    aborts a batch
//!
//! ## Quick Start
//!
//! ```rust
//! use amr_chains::{AmrGraph, Alignment, extract};
//! use amr_chains::config::PipelineConfig;
//!
//! # fn example() -> amr_chains::Result<()> {
//! let tokens: Vec<String> = "the dealer testified he bought a knife"
//!     .split_whitespace().map(String::from).collect();
//! let alignments = Alignment::parse_line("2 t\t1 d\t4 b\t6 k")?;
//! let mut graph = AmrGraph::parse(
//!     "(t / testify-01 :ARG0 (d / dealer) :ARG1 (b / buy-01 :ARG0 d :ARG1 (k / knife)))",
//!     Some(&alignments),
//!     Some(tokens),
//! )?;
//!
//! let events = extract::convert_amr_to_events(&mut graph, &PipelineConfig::default())?;
//! assert_eq!(events.len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Parse | `amr` | Bracketed AMR text → parse tree |
//! | Build | `model` | Parse tree → arena graph with token alignment |
//! | Rewrite | `rewrite` | Structural normalization (may add cycles) |
//! | Extract | `extract` | Verb nodes → `Event`/`Role` records |
//! | Chain | `chain` | Coreference clusters + events → `Document` chains |

// ============================================================================
// Modules
// ============================================================================

pub mod amr;
pub mod model;
pub mod rewrite;
pub mod extract;
pub mod chain;
pub mod export;
pub mod io;
pub mod batch;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    AmrGraph, AmrNode, NodeId, NodeKind, Tail, Relation, Span, Alignment,
    Role, Event, Entity, Lexicon, Document,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use rewrite::ModalityPolicy;
pub use chain::{DocumentBuilder, DocumentInput, StopList};
pub use batch::{BatchReport, SkipKind, SkippedUnit};
pub use config::PipelineConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("AMR syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Incomplete input for document {doc_id}: missing {missing}")]
    IncompleteInput { doc_id: String, missing: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
