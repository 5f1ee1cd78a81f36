//! Progress reporting for index builds

use finroute_core::index::BuildProgress;
use std::io::{self, Write};
use std::time::Instant;

/// Prints `embedded/total` with an ETA on one stderr line
pub struct ProgressReporter {
    started: Instant,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn report(&self, progress: BuildProgress) {
        let done = progress.embedded_passages.max(1);
        let elapsed = self.started.elapsed().as_secs_f64();
        let remaining = progress.total_passages.saturating_sub(progress.embedded_passages);
        let eta = elapsed / done as f64 * remaining as f64;

        eprint!(
            "\rEmbedding: {}/{} passages (ETA {:.0}s)   ",
            progress.embedded_passages, progress.total_passages, eta
        );
        io::stderr().flush().ok();
    }

    pub fn finish(&self) {
        eprintln!();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
