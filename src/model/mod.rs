//! # AMR Graph and Narrative Model
//!
//! Plain data types that cross every stage boundary:
//! parser → graph → rewrite → extractor → chain builder → JSON.
//!
//! Design rule: no file I/O and no model invocation here.

pub mod node;
pub mod span;
pub mod graph;
pub mod event;
pub mod entity;
pub mod document;

pub use node::{AmrNode, NodeId, NodeKind, Tail, TailList, STATIC_FRAMES, CONJUNCTION_FRAMES};
pub use span::{Span, Alignment};
pub use graph::{AmrGraph, Relation};
pub use event::{Role, Event, Quintuple};
pub use entity::{Entity, Lexicon};
pub use document::Document;
