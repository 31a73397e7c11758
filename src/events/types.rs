//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the near-duplicate pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing phase events
    Scan(ScanEvent),
    /// Signature extraction phase events
    Extract(ExtractEvent),
    /// Bucket index / candidate generation phase events
    Index(IndexEvent),
    /// Similarity scoring phase events
    Score(ScoreEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the directory listing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { dir: PathBuf },
    /// A regular file was found
    FileFound { path: PathBuf },
    /// Listing completed
    Completed { total_files: usize },
}

/// Events during the signature extraction phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// Extraction has started
    Started { total_files: usize },
    /// Progress update during extraction
    Progress(ExtractProgress),
    /// A file could not be decoded as an image and was skipped
    Skipped { path: PathBuf, reason: String },
    /// Extraction completed
    Completed { extracted: usize, skipped: usize },
}

/// Progress information during signature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProgress {
    /// Number of files processed so far
    pub completed: usize,
    /// Total number of files to process
    pub total: usize,
    /// File just processed
    pub current_path: PathBuf,
}

/// Events during indexing and candidate generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Index construction has started
    Started { total_signatures: usize },
    /// Candidate pairs have been generated
    Completed {
        total_buckets: usize,
        candidate_pairs: usize,
    },
}

/// Events during similarity scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// Scoring has started
    Started { candidate_pairs: usize },
    /// Scoring completed
    Completed { near_duplicates: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Extracting,
    Indexing,
    Scoring,
    Ranking,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total regular files seen in the input directory
    pub total_files: usize,
    /// Signatures successfully extracted
    pub signatures_extracted: usize,
    /// Files skipped because they failed to decode
    pub skipped_files: usize,
    /// Candidate pairs generated by the bucket index
    pub candidate_pairs: usize,
    /// Near-duplicate pairs above the threshold
    pub near_duplicates: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Extracting => write!(f, "Extracting signatures"),
            PipelinePhase::Indexing => write!(f, "Indexing"),
            PipelinePhase::Scoring => write!(f, "Scoring"),
            PipelinePhase::Ranking => write!(f, "Ranking"),
        }
    }
}
