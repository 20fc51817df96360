//! In-place progress line

use std::io::Write;

/// Tracks how many articles were requested and how many have been processed
#[derive(Debug, Clone)]
pub struct Progress {
    sent: usize,
    processed: usize,
    enabled: bool,
}

impl Progress {
    /// Starts with the seed article already counted as sent
    pub fn new(enabled: bool) -> Self {
        Self {
            sent: 1,
            processed: 0,
            enabled,
        }
    }

    pub fn add_sent(&mut self, count: usize) {
        self.sent += count;
    }

    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn percent(&self) -> f64 {
        self.processed as f64 / self.sent.max(1) as f64 * 100.0
    }

    pub fn line(&self) -> String {
        format!(
            "\rArticles processed: {:5.2}% ({}/{})",
            self.percent(),
            self.processed,
            self.sent
        )
    }

    /// Rewrites the progress line on stdout
    pub fn report(&self) {
        if !self.enabled {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        // Progress output is cosmetic; a closed stdout must not stop the crawl
        let _ = write!(stdout, "{}", self.line());
        let _ = stdout.flush();
    }

    /// Ends the progress line
    pub fn finish(&self) {
        if self.enabled {
            println!();
        }
    }
}
