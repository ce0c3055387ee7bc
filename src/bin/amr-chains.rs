//! `amr-chains`: build event chains for a work directory.
//!
//! ```text
//! amr-chains run <work-dir> [--workers N --worker-id I] [--config cfg.json]
//! amr-chains stoplist <work-dir> --top-k 20 --output stoplist.tsv
//! ```
//!
//! Logging is controlled by `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use amr_chains::batch;
use amr_chains::io::WorkDir;
use amr_chains::{ModalityPolicy, PipelineConfig, StopList};

/// AMR parses to narrative event chains.
#[derive(Parser)]
#[command(name = "amr-chains", about = "AMR parses to narrative event chains")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract events for every unfinished document in a work directory.
    Run {
        /// Work directory containing amr/, align/, tokenized/ and coref/.
        work_dir: PathBuf,

        /// JSON pipeline configuration; flags below override it.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of shards.
        #[arg(long)]
        workers: Option<usize>,

        /// Shard handled by this process.
        #[arg(long)]
        worker_id: Option<usize>,

        /// File with one allowed predicate frame per line.
        #[arg(long)]
        frame_list: Option<PathBuf>,

        /// Modality policy: remove-edge or relabel.
        #[arg(long)]
        modality: Option<String>,
    },
    /// Compute a stop-list of the most frequent (predicate, role) pairs.
    Stoplist {
        /// Work directory whose event/ output is read.
        work_dir: PathBuf,

        /// Number of pairs to keep.
        #[arg(short = 'k', long, default_value_t = 20)]
        top_k: usize,

        /// Output file (tab-separated predicate and role).
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Run { work_dir, config, workers, worker_id, frame_list, modality } => {
            run(&work_dir, config, workers, worker_id, frame_list, modality)
        }
        Commands::Stoplist { work_dir, top_k, output } => stoplist(&work_dir, top_k, &output),
    };
    process::exit(exit_code);
}

/// Returns exit code: 0 = success, 1 = some documents failed,
/// 2 = bad configuration, 3 = I/O error.
fn run(
    work_dir: &Path,
    config_path: Option<PathBuf>,
    workers: Option<usize>,
    worker_id: Option<usize>,
    frame_list: Option<PathBuf>,
    modality: Option<String>,
) -> i32 {
    let mut config = match config_path {
        Some(path) => match PipelineConfig::from_json_file(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: failed to load config '{}': {}", path.display(), e);
                return 2;
            }
        },
        None => PipelineConfig::default(),
    };
    if let Some(n) = workers {
        config.workers = n;
    }
    if let Some(id) = worker_id {
        config.worker_id = id;
    }
    if let Some(policy) = modality {
        config.modality = match policy.as_str() {
            "remove-edge" | "remove_edge" => ModalityPolicy::RemoveEdge,
            "relabel" => ModalityPolicy::Relabel,
            other => {
                eprintln!("Error: unknown modality policy '{}'", other);
                return 2;
            }
        };
    }
    if let Some(path) = frame_list {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                config.frame_list = Some(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect());
            }
            Err(e) => {
                eprintln!("Error: failed to read frame list '{}': {}", path.display(), e);
                return 3;
            }
        }
    }
    if config.worker_id >= config.workers.max(1) {
        eprintln!("Error: worker id {} out of range for {} workers", config.worker_id, config.workers);
        return 2;
    }

    let work = WorkDir::new(work_dir);
    let report = match batch::run_work_dir(&work, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: failed to read work directory '{}': {}", work_dir.display(), e);
            return 3;
        }
    };

    println!(
        "written: {}, already done: {}, skipped: {}",
        report.written.len(),
        report.already_done.len(),
        report.skipped.len()
    );
    if report.failed_documents().next().is_some() { 1 } else { 0 }
}

fn stoplist(work_dir: &Path, top_k: usize, output: &Path) -> i32 {
    let work = WorkDir::new(work_dir);
    let docs = match work.document_names() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: failed to read work directory '{}': {}", work_dir.display(), e);
            return 3;
        }
    };

    let mut documents = Vec::new();
    for doc in docs.iter().filter(|d| work.is_done(d)) {
        match work.read_document(doc) {
            Ok(d) => documents.push(d),
            Err(e) => tracing::warn!(doc_id = doc.doc_id(), error = %e, "unreadable event file"),
        }
    }

    let list = StopList::from_documents(&documents, top_k);
    if let Err(e) = std::fs::write(output, list.to_tsv()) {
        eprintln!("Error: failed to write '{}': {}", output.display(), e);
        return 3;
    }
    println!("{} pairs from {} documents", list.len(), documents.len());
    0
}
