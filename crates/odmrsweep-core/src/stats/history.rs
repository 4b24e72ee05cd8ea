//! Completed-sweep history
//!
//! Bounded store of finished runs with automatic eviction of the oldest.
//! This is the engine-side counterpart of a display layer that stacks
//! every completed spectrum: the consumer records each final result here
//! and can revisit earlier runs without re-acquiring them.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::sweep::result::SweepResult;

/// Maximum number of completed sweeps retained by default
const DEFAULT_CAPACITY: usize = 64;

/// One completed (or cancelled) sweep run
#[derive(Debug, Clone)]
pub struct SweepRecord {
    /// When the run finished
    pub completed_at: DateTime<Utc>,
    /// True when the run was cancelled before covering every step
    pub cancelled: bool,
    /// The final series delivered by the worker
    pub result: SweepResult,
}

/// Bounded store of completed sweep runs
#[derive(Debug)]
pub struct SweepHistory {
    records: VecDeque<SweepRecord>,
    capacity: usize,
}

impl SweepHistory {
    /// Create a history with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a history holding at most `capacity` runs (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Record a finished run, evicting the oldest when full
    pub fn record(&mut self, result: SweepResult, cancelled: bool) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(SweepRecord {
            completed_at: Utc::now(),
            cancelled,
            result,
        });
    }

    /// All retained runs, oldest first
    pub fn records(&self) -> &VecDeque<SweepRecord> {
        &self.records
    }

    /// The most recently recorded run
    pub fn last(&self) -> Option<&SweepRecord> {
        self.records.back()
    }

    /// Number of retained runs
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every retained run
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for SweepHistory {
    fn default() -> Self {
        Self::new()
    }
}
