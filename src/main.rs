//! # near-dupes CLI
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! near-dupes --inputdir ~/Photos --threshold 0.9
//! near-dupes -i ~/Photos --verbose --output json
//! ```

mod cli;

use near_dupes::Result;

fn main() -> Result<()> {
    cli::run()
}
