//! Double-buffered hand-off between the sweep worker and its consumer
//!
//! A latest-value relay, not a queue: the producer overwrites the back
//! slot at whatever cadence it likes and the consumer swaps it in on its
//! own cadence. One lock covers the pending check and the slot swap as a
//! single unit; between swaps the consumer reads its front slot with no
//! synchronization at all. Publishes between two consumer polls overwrite
//! each other, so at most one update is ever pending.

use std::sync::{Arc, Mutex, PoisonError};

use super::result::SweepResult;

/// Shared side of the channel: the producer-owned back slot and the flag
/// marking it as unconsumed.
#[derive(Debug, Default)]
struct Shared {
    back: SweepResult,
    pending: bool,
}

/// Create a connected publisher/snapshot pair with empty slots.
pub fn channel() -> (SweepPublisher, SweepSnapshot) {
    let shared = Arc::new(Mutex::new(Shared::default()));
    (
        SweepPublisher {
            shared: Arc::clone(&shared),
        },
        SweepSnapshot {
            shared,
            front: SweepResult::default(),
        },
    )
}

/// Producer half of the double buffer.
#[derive(Debug)]
pub struct SweepPublisher {
    shared: Arc<Mutex<Shared>>,
}

impl SweepPublisher {
    /// Replace the pending update with `result`.
    ///
    /// Never blocks on the consumer; an unconsumed previous update is
    /// overwritten.
    pub fn publish(&self, result: SweepResult) {
        let mut shared = self
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        shared.back = result;
        shared.pending = true;
    }

    /// Empty the back slot and drop any unconsumed update.
    ///
    /// Called on sweep stop or restart so a later swap can never hand the
    /// consumer a previous run's data.
    pub fn clear(&self) {
        let mut shared = self
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        shared.back = SweepResult::default();
        shared.pending = false;
    }
}

/// Consumer half of the double buffer.
///
/// Owns the front slot outright: after a successful [`refresh`] the data
/// behind [`latest`] is plain local state until the next `refresh`.
///
/// [`refresh`]: SweepSnapshot::refresh
/// [`latest`]: SweepSnapshot::latest
#[derive(Debug)]
pub struct SweepSnapshot {
    shared: Arc<Mutex<Shared>>,
    front: SweepResult,
}

impl SweepSnapshot {
    /// Swap in the pending update, if any.
    ///
    /// Returns true when the front slot changed. The flag check and the
    /// slot swap happen under one lock acquisition.
    pub fn refresh(&mut self) -> bool {
        let mut shared = self
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !shared.pending {
            return false;
        }
        std::mem::swap(&mut shared.back, &mut self.front);
        shared.pending = false;
        true
    }

    /// The most recently swapped-in result.
    pub fn latest(&self) -> &SweepResult {
        &self.front
    }

    /// Empty both slots and the pending flag.
    pub fn clear(&mut self) {
        {
            let mut shared = self
                .shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            shared.back = SweepResult::default();
            shared.pending = false;
        }
        self.front = SweepResult::default();
    }
}
