//! # Events Module
//!
//! Event-driven progress reporting for the pipeline.
//!
//! The pipeline sends [`Event`] values over an [`EventSender`]; a UI layer
//! (the CLI progress bar, or any future front end) consumes them from the
//! matching [`EventReceiver`]. Sending never blocks the pipeline and a
//! dropped receiver simply discards events.

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::{
    Event, ExtractEvent, ExtractProgress, IndexEvent, PipelineEvent, PipelinePhase,
    PipelineSummary, ScanEvent, ScoreEvent,
};
