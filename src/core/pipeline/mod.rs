//! # Pipeline Module
//!
//! Wires the stages together: list files, extract signatures in parallel,
//! build the banded index, score candidate pairs, rank the results.
//!
//! Data flows strictly forward. The signature map is owned by the run,
//! read-only after extraction, and dropped with the result. A cancellation
//! flag is checked between per-file units of extraction work.

use crate::core::index::{BandedIndex, IndexStats, DEFAULT_BANDS};
use crate::core::scanner;
use crate::core::scorer::{self, NearDuplicate, DEFAULT_THRESHOLD};
use crate::core::signature::{
    FileDecoder, GrayscaleDecoder, Signature, SignatureExtractor, DEFAULT_HASH_SIZE,
};
use crate::error::{NearDupeError, ScanError};
use crate::events::{
    null_sender, Event, EventSender, ExtractEvent, ExtractProgress, IndexEvent, PipelineEvent,
    PipelinePhase, PipelineSummary, ScoreEvent,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Near-duplicate pairs, ranked by descending similarity
    pub results: Vec<NearDuplicate>,
    /// Regular files seen in the input directory
    pub total_files: usize,
    /// Signatures successfully extracted
    pub signatures_extracted: usize,
    /// Per-file skip messages (files that failed to decode)
    pub skipped: Vec<String>,
    /// Candidate pairs produced by the bucket index
    pub candidate_pairs: usize,
    /// Index occupancy statistics
    pub index_stats: IndexStats,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan (non-recursive)
    pub input_dir: PathBuf,
    /// Similarity threshold; pairs must score strictly above it
    pub threshold: f64,
    /// Hash size; signatures are `hash_size^2` bits
    pub hash_size: u32,
    /// Number of LSH bands
    pub bands: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            threshold: DEFAULT_THRESHOLD,
            hash_size: DEFAULT_HASH_SIZE,
            bands: DEFAULT_BANDS,
        }
    }
}

impl PipelineConfig {
    /// Signature length in bits.
    pub fn signature_len(&self) -> usize {
        (self.hash_size as usize) * (self.hash_size as usize)
    }

    /// Reject degenerate parameter combinations before any work starts.
    pub fn validate(&self) -> Result<(), NearDupeError> {
        if self.hash_size == 0 {
            return Err(NearDupeError::Config(
                "hash size must be positive".to_string(),
            ));
        }
        if self.bands == 0 {
            return Err(NearDupeError::Config(
                "number of bands must be positive".to_string(),
            ));
        }
        if self.bands > self.signature_len() {
            return Err(NearDupeError::Config(format!(
                "number of bands ({}) cannot exceed the signature length ({})",
                self.bands,
                self.signature_len()
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(NearDupeError::Config(format!(
                "threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    decoder: Option<Box<dyn GrayscaleDecoder>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            decoder: None,
            cancel_flag: None,
        }
    }

    /// Set the input directory
    pub fn input_dir(mut self, dir: PathBuf) -> Self {
        self.config.input_dir = dir;
        self
    }

    /// Set the similarity threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the hash size
    pub fn hash_size(mut self, hash_size: u32) -> Self {
        self.config.hash_size = hash_size;
        self
    }

    /// Set the number of LSH bands
    pub fn bands(mut self, bands: usize) -> Self {
        self.config.bands = bands;
        self
    }

    /// Inject a decoder (e.g. a synthetic one for tests)
    pub fn decoder(mut self, decoder: Box<dyn GrayscaleDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Attach a cancellation flag, checked between per-file units of work
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            decoder: self.decoder.unwrap_or_else(|| Box::new(FileDecoder::new())),
            cancel_flag: self
                .cancel_flag
                .unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The near-duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    decoder: Box<dyn GrayscaleDecoder>,
    cancel_flag: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(self) -> Result<PipelineResult, NearDupeError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(self, events: &EventSender) -> Result<PipelineResult, NearDupeError> {
        let start_time = Instant::now();

        self.config.validate()?;

        let signature_len = self.config.signature_len();
        if signature_len % self.config.bands != 0 {
            let banded = (signature_len / self.config.bands) * self.config.bands;
            warn!(
                bands = self.config.bands,
                signature_len,
                "bands does not evenly divide the signature length; \
                 the trailing {} bits are excluded from banding",
                signature_len - banded
            );
        }

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: list candidate files; an unreadable directory is fatal.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let files = scanner::list_regular_files_with_events(&self.config.input_dir, events)?;
        let total_files = files.len();
        info!(total_files, dir = %self.config.input_dir.display(), "listed input directory");

        // Phase 2: extract signatures in parallel across files.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Extracting,
        }));
        events.send(Event::Extract(ExtractEvent::Started { total_files }));

        let extractor = SignatureExtractor::with_decoder(self.config.hash_size, self.decoder);
        let completed = AtomicUsize::new(0);

        type Outcome = Option<std::result::Result<(PathBuf, Signature), String>>;
        let outcomes: Vec<Outcome> = files
            .par_iter()
            .map(|path| {
                if self.cancel_flag.load(Ordering::Relaxed) {
                    return None;
                }

                let outcome = match extractor.extract(path) {
                    Ok(signature) => Ok((path.clone(), signature)),
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "skipping undecodable file");
                        events.send(Event::Extract(ExtractEvent::Skipped {
                            path: path.clone(),
                            reason: e.to_string(),
                        }));
                        Err(e.to_string())
                    }
                };

                let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Extract(ExtractEvent::Progress(ExtractProgress {
                    completed: current,
                    total: total_files,
                    current_path: path.clone(),
                })));

                Some(outcome)
            })
            .collect();

        if self.cancel_flag.load(Ordering::Relaxed) {
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
            return Err(ScanError::Cancelled.into());
        }

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(message) => skipped.push(message),
            }
        }
        let signatures_extracted = entries.len();

        events.send(Event::Extract(ExtractEvent::Completed {
            extracted: signatures_extracted,
            skipped: skipped.len(),
        }));

        // Phase 3: single-writer index construction, then candidates.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Indexing,
        }));
        events.send(Event::Index(IndexEvent::Started {
            total_signatures: signatures_extracted,
        }));

        let index = BandedIndex::build(self.config.bands, signature_len, entries);
        let candidates = index.candidate_pairs();
        let index_stats = index.stats_with_candidates(candidates.len());
        info!(%index_stats, "built banded index");

        events.send(Event::Index(IndexEvent::Completed {
            total_buckets: index_stats.total_buckets,
            candidate_pairs: candidates.len(),
        }));

        // The bucket tables are no longer needed; keep only the signature
        // map for scoring.
        let signatures: HashMap<PathBuf, Signature> = index.into_entries().into_iter().collect();

        // Phase 4: score candidates in parallel against the threshold.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scoring,
        }));
        events.send(Event::Score(ScoreEvent::Started {
            candidate_pairs: candidates.len(),
        }));

        let mut results = scorer::score_candidates(&signatures, &candidates, self.config.threshold);

        events.send(Event::Score(ScoreEvent::Completed {
            near_duplicates: results.len(),
        }));

        // Phase 5: rank with the documented tie-break.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Ranking,
        }));
        scorer::rank(&mut results);

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files,
                signatures_extracted,
                skipped_files: skipped.len(),
                candidate_pairs: candidates.len(),
                near_duplicates: results.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            results,
            total_files,
            signatures_extracted,
            skipped,
            candidate_pairs: candidates.len(),
            index_stats,
            duration_ms,
        })
    }
}
