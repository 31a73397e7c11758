//! # Near-Duplicate Finder
//!
//! Finds near-duplicate images in a directory without an O(n²) pairwise
//! comparison: a difference-hash signature per image, LSH banding into
//! candidate clusters, Hamming-similarity scoring of within-cluster pairs
//! only.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - The detection pipeline (signatures, banding, scoring)
//! - `events` - Event-driven progress reporting
//! - `error` - Tagged error types
//! - `cli` - Command-line interface (in the binary)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{NearDupeError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
