//! Batch processing: many documents, failure-isolated.
//!
//! Documents are independent: each is loaded, built and written on its own,
//! and a failure is recorded in the [`BatchReport`] rather than propagated.
//! With the `parallel` feature documents are spread over the rayon pool.
//! Shard assignment (`index % workers == worker_id`) lets several processes
//! split one work directory.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::{BuiltDocument, DocumentBuilder, DocumentInput};
use crate::config::PipelineConfig;
use crate::io::{DocRef, WorkDir};
use crate::model::Document;
use crate::Result;

pub use crate::chain::{SkipKind, SkippedUnit};

/// Items assigned to `worker_id` out of `workers` shards, in order.
/// Zero workers is treated as one.
pub fn shard<T>(items: impl IntoIterator<Item = T>, workers: usize, worker_id: usize) -> Vec<T> {
    let workers = workers.max(1);
    items
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % workers == worker_id)
        .map(|(_, item)| item)
        .collect()
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Document ids written in this run.
    pub written: Vec<String>,
    /// Document ids whose output already existed.
    pub already_done: Vec<String>,
    /// Documents that failed and sentences dropped from written documents.
    pub skipped: Vec<SkippedUnit>,
}

impl BatchReport {
    pub fn failed_documents(&self) -> impl Iterator<Item = &SkippedUnit> {
        self.skipped.iter().filter(|s| s.kind == SkipKind::Document)
    }
}

/// Build every input, in order. Sentence-level skips are collected.
pub fn process_inputs(builder: &DocumentBuilder, inputs: &[DocumentInput]) -> (Vec<Document>, Vec<SkippedUnit>) {
    #[cfg(feature = "parallel")]
    let built: Vec<BuiltDocument> = {
        use rayon::prelude::*;
        inputs.par_iter().map(|input| builder.build(input)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let built: Vec<BuiltDocument> = inputs.iter().map(|input| builder.build(input)).collect();

    let mut documents = Vec::with_capacity(built.len());
    let mut skipped = Vec::new();
    for b in built {
        documents.push(b.document);
        skipped.extend(b.skipped);
    }
    (documents, skipped)
}

enum Outcome {
    Written { doc_id: String, skipped: Vec<SkippedUnit> },
    Failed(SkippedUnit),
}

/// Process this worker's shard of a work directory.
///
/// Documents with existing output are skipped. Only listing the directory
/// can fail the whole run.
pub fn run_work_dir(work: &WorkDir, config: &PipelineConfig) -> Result<BatchReport> {
    let docs = shard(work.document_names()?, config.workers, config.worker_id);
    let (done, pending): (Vec<DocRef>, Vec<DocRef>) = docs.into_iter().partition(|d| work.is_done(d));
    info!(
        worker = config.worker_id,
        workers = config.workers,
        pending = pending.len(),
        already_done = done.len(),
        "starting batch"
    );

    let builder = DocumentBuilder::new(config.clone());
    let run = |doc: &DocRef| match process_document(work, &builder, doc) {
        Ok(skipped) => Outcome::Written { doc_id: doc.doc_id().to_string(), skipped },
        Err(e) => {
            warn!(doc_id = doc.doc_id(), error = %e, "skipping document");
            Outcome::Failed(SkippedUnit::document(doc.doc_id(), e))
        }
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Outcome> = {
        use rayon::prelude::*;
        pending.par_iter().map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Outcome> = pending.iter().map(run).collect();

    let mut report = BatchReport {
        already_done: done.iter().map(|d| d.doc_id().to_string()).collect(),
        ..BatchReport::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Written { doc_id, skipped } => {
                report.written.push(doc_id);
                report.skipped.extend(skipped);
            }
            Outcome::Failed(unit) => report.skipped.push(unit),
        }
    }
    info!(
        written = report.written.len(),
        already_done = report.already_done.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

fn process_document(work: &WorkDir, builder: &DocumentBuilder, doc: &DocRef) -> Result<Vec<SkippedUnit>> {
    let input = work.load_document(doc)?;
    let BuiltDocument { document, skipped } = builder.build(&input);
    work.write_document(doc, &document)?;
    Ok(skipped)
}
