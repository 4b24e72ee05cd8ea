//! Sweep result series types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary statistics for one swept frequency point.
///
/// Produced exactly once per surviving loop iteration, appended in
/// increasing index order and never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Swept frequency in Hz
    pub frequency_hz: f64,
    /// Mean of the averaged readings
    pub mean: f64,
    /// Smallest individual reading
    pub min: f64,
    /// Largest individual reading
    pub max: f64,
    /// Sample standard deviation of the readings (always >= 0)
    pub std_dev: f64,
}

/// Ordered series of sample points plus an acquisition-time tag.
///
/// The unit exchanged between the sweep worker and its consumer; every
/// instance is an independent value snapshot, never a live reference into
/// worker state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Sample points in increasing sweep-index order
    pub points: Vec<SamplePoint>,
    /// Time since sweep start when this snapshot was emitted
    pub elapsed: Duration,
}

impl SweepResult {
    /// Number of acquired points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points have been acquired yet
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recently acquired point
    pub fn last(&self) -> Option<&SamplePoint> {
        self.points.last()
    }

    /// Swept frequencies as a parallel series
    pub fn frequencies(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.frequency_hz).collect()
    }

    /// Mean signal values as a parallel series, in sweep order.
    ///
    /// This is the series dip detection runs on.
    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }

    /// Per-point minima as a parallel series
    pub fn mins(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.min).collect()
    }

    /// Per-point maxima as a parallel series
    pub fn maxes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.max).collect()
    }

    /// Per-point standard deviations as a parallel series
    pub fn std_devs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.std_dev).collect()
    }
}
