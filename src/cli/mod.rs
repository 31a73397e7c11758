//! # CLI Module
//!
//! Command-line interface for the near-duplicate finder.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for near-duplicates
//! near-dupes --inputdir ~/Photos
//!
//! # With custom threshold and banding
//! near-dupes -i ~/Photos -t 0.95 -s 16 -b 32
//!
//! # JSON output
//! near-dupes -i ~/Photos --output json
//! ```

use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use near_dupes::core::pipeline::{Pipeline, PipelineResult};
use near_dupes::error::{NearDupeError, Result};
use near_dupes::events::{Event, EventChannel, ExtractEvent, PipelineEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Efficient detection of near-duplicate images using locality sensitive hashing
#[derive(Parser, Debug)]
#[command(name = "near-dupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing images to check (non-recursive)
    #[arg(short = 'i', long = "inputdir")]
    inputdir: PathBuf,

    /// Similarity threshold; pairs must score strictly above it
    #[arg(short, long, default_value_t = 0.9)]
    threshold: f64,

    /// Hash size to use, signature length = hash_size^2
    #[arg(short = 's', long = "hash-size", default_value_t = 16)]
    hash_size: u32,

    /// Number of bands for the locality sensitive hashing step
    #[arg(short, long, default_value_t = 16)]
    bands: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    output: OutputFormat,

    /// Show index statistics and skipped files
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (one tab-separated pair per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    near_dupes::init_tracing();

    let cli = Cli::parse();

    let pipeline = Pipeline::builder()
        .input_dir(cli.inputdir.clone())
        .threshold(cli.threshold)
        .hash_size(cli.hash_size)
        .bands(cli.bands)
        .build();

    // Set up event handling for the progress bar
    let (sender, receiver) = EventChannel::new();

    let progress = if cli.output == OutputFormat::Pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(phase.to_string());
                    }
                }
                Event::Extract(ExtractEvent::Started { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                    }
                }
                Event::Extract(ExtractEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        if verbose {
                            pb.set_message(
                                p.current_path
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy()
                                    .into_owned(),
                            );
                        }
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let outcome = pipeline.run_with_events(&sender);

    // Drop sender to signal the event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = match outcome {
        Ok(result) => result,
        Err(NearDupeError::Scan(_)) => {
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            // One user-facing line, no raw fault
            eprintln!(
                "{}",
                style(format!(
                    "Couldn't open input directory {}",
                    cli.inputdir.display()
                ))
                .red()
            );
            std::process::exit(1);
        }
        Err(e) => {
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            eprintln!("{}", style(e.to_string()).red());
            std::process::exit(2);
        }
    };

    match cli.output {
        OutputFormat::Pretty => {
            print_pretty_results(&result, &cli.inputdir, cli.threshold, cli.verbose)
        }
        OutputFormat::Json => print_json_results(&result, &cli.inputdir, cli.threshold),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(result: &PipelineResult, inputdir: &Path, threshold: f64, verbose: bool) {
    if result.results.is_empty() {
        println!(
            "No near-duplicates found in {} (threshold {:.2}%)",
            inputdir.display(),
            threshold * 100.0
        );
    } else {
        println!(
            "Found {} near-duplicate images in {} (threshold {:.2}%)",
            style(result.results.len()).cyan().bold(),
            inputdir.display(),
            threshold * 100.0
        );
        for dupe in &result.results {
            println!(
                "{:.2}% similarity: file 1: {} - file 2: {}",
                dupe.similarity * 100.0,
                dupe.first.display(),
                dupe.second.display()
            );
        }
    }

    if verbose {
        eprintln!();
        eprintln!(
            "  {} files seen, {} signatures extracted, {} skipped",
            result.total_files,
            result.signatures_extracted,
            result.skipped.len()
        );
        eprintln!("  index: {}", result.index_stats);
        eprintln!("  completed in {:.1}s", result.duration_ms as f64 / 1000.0);
        for message in &result.skipped {
            eprintln!("  {} {}", style("skipped:").dim(), style(message).dim());
        }
    }
}

fn print_json_results(result: &PipelineResult, inputdir: &Path, threshold: f64) {
    let output = serde_json::json!({
        "input_dir": inputdir,
        "threshold": threshold,
        "total_files": result.total_files,
        "signatures_extracted": result.signatures_extracted,
        "skipped_files": result.skipped.len(),
        "candidate_pairs": result.candidate_pairs,
        "duration_ms": result.duration_ms,
        "near_duplicates": result.results,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &PipelineResult) {
    for dupe in &result.results {
        println!("{}\t{}", dupe.first.display(), dupe.second.display());
    }
}
