use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Observer of task completions.
///
/// Called once per finished task with the number of tasks completed so
/// far and the total. Calls are never concurrent and `completed` strictly
/// increases from 1 to `total`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, completed: usize, total: usize);
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn report(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Reporter that ignores every update
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _completed: usize, _total: usize) {}
}

/// Count of finished tasks, successful or not
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completion and return the new count
    pub fn increment(&self) -> usize {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }
}

/// Terminal progress bar counting extracted archives
pub struct ArchiveProgressBar {
    bar: ProgressBar,
}

impl ArchiveProgressBar {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} archives {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressReporter for ArchiveProgressBar {
    fn report(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }
}
