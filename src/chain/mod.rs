//! # Entity & Chain Builder
//!
//! Merges coreference clusters with extracted events:
//!
//! 1. Parse, rewrite and extract every sentence (sentence-relative positions)
//! 2. Offset role heads to document coordinates, match them against clusters
//! 3. Sort events by `(sentence, verb position)`
//! 4. Derive each entity's concept from the roles it fills
//!
//! Chains themselves are views over the finished [`crate::Document`]; see
//! [`crate::Document::chain`].

pub mod builder;
pub mod stoplist;

pub use builder::{match_entity, BuiltDocument, DocumentBuilder, DocumentInput, SkipKind, SkippedUnit};
pub use stoplist::StopList;
