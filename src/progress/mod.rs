use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for progress reporting during chunked transfers
pub trait ProgressReporter: Send + Sync {
    fn start(&self, total: u64);
    fn inc(&self, delta: u64);
    fn finish(&self);
}

/// Indicatif-based progress bar for push/pull
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Progress bar labelled with the file being transferred
    pub fn file_transfer(file_name: &str, total_bytes: u64) -> Self {
        let template = format!(
            "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}})",
            file_name
        );
        let bar = ProgressBar::new(total_bytes);
        // Fall back to the default style if the template is rejected.
        if let Ok(style) = ProgressStyle::default_bar().template(&template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    /// Hidden bar, used when output is not a terminal or is JSON
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish_with_message("Complete");
    }
}

/// No-op progress reporter for when progress reporting is disabled
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn start(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self) {}
}

/// Counts transferred bytes; useful for callers that only want totals
#[derive(Default)]
pub struct ByteCounter {
    total: AtomicU64,
    transferred: AtomicU64,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl ProgressReporter for ByteCounter {
    fn start(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        self.transferred.fetch_add(delta, Ordering::Relaxed);
    }

    fn finish(&self) {}
}
