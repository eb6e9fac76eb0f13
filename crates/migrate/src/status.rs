//! Contains the [Status] progress reporter: per-subtask counters and timings, purely
//! observational.

use std::time::{Duration, Instant};
use tracing::info;

/// How often an in-progress subtask reports its counters.
const LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Tracks one migration subtask: items processed, total runtime, and commit runtime.
#[derive(Debug)]
pub struct Status {
    task: &'static str,
    count: u64,
    started: Instant,
    commit_started: Option<Instant>,
    next_log: Duration,
}

impl Status {
    /// Creates a new [Status] for the named subtask.
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            count: 0,
            started: Instant::now(),
            commit_started: None,
            next_log: LOG_INTERVAL,
        }
    }

    /// Counts one processed item, logging the running totals every [LOG_INTERVAL].
    pub fn tick(&mut self) {
        self.count += 1;
        let elapsed = self.started.elapsed();
        if elapsed > self.next_log {
            self.next_log += LOG_INTERVAL;
            info!(
                target: "migrate",
                task = self.task,
                processed = self.count,
                elapsed = ?elapsed,
                "Migration in progress"
            );
        }
    }

    /// The number of items processed so far.
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Marks the start of the database commit for this subtask.
    pub fn begin_commit(&mut self) {
        self.commit_started = Some(Instant::now());
    }

    /// Emits the completion log with final counters and timings.
    pub fn complete(&self) {
        info!(
            target: "migrate",
            task = self.task,
            processed = self.count,
            elapsed = ?self.started.elapsed(),
            commit_elapsed = ?self.commit_started.map(|at| at.elapsed()).unwrap_or_default(),
            "Migration subtask complete"
        );
    }
}
