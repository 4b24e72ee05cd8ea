//! Sweep run configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable parameters for one sweep run.
///
/// Degenerate values are absorbed rather than rejected: `steps <= 1`
/// collapses the sweep to a single point at `start_freq_hz`, and
/// `averages == 0` produces zero-statistics points. The sweep always
/// completes and delivers its final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Sweep start frequency in Hz
    pub start_freq_hz: f64,
    /// Sweep end frequency in Hz
    pub end_freq_hz: f64,
    /// Number of swept frequency points
    pub steps: usize,
    /// Total settling delay per point, spread evenly across the averages
    pub point_delay: Duration,
    /// Number of readings averaged into each point
    pub averages: u32,
    /// Emit a partial update every this many points (0 = final update only)
    pub update_interval: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        // 2.85-2.95 GHz covers the NV center zero-field resonances
        Self {
            start_freq_hz: 2.85e9,
            end_freq_hz: 2.95e9,
            steps: 201,
            point_delay: Duration::from_millis(2),
            averages: 10,
            update_interval: 10,
        }
    }
}

impl SweepConfig {
    /// Frequency of sweep point `index` in Hz.
    ///
    /// The step divisor is only formed for `steps >= 2`; with one point
    /// (or none) the sweep collapses to `start_freq_hz`.
    pub fn frequency_at(&self, index: usize) -> f64 {
        if self.steps <= 1 {
            return self.start_freq_hz;
        }
        let step = (self.end_freq_hz - self.start_freq_hz) / (self.steps - 1) as f64;
        self.start_freq_hz + index as f64 * step
    }

    /// Settling delay for one individual reading.
    pub fn delay_per_average(&self) -> Duration {
        if self.averages == 0 {
            Duration::ZERO
        } else {
            self.point_delay / self.averages
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_endpoints() {
        let config = SweepConfig {
            start_freq_hz: 2.85e9,
            end_freq_hz: 2.95e9,
            steps: 5,
            ..Default::default()
        };

        assert_relative_eq!(config.frequency_at(0), 2.85e9);
        assert_relative_eq!(config.frequency_at(4), 2.95e9);
        assert_relative_eq!(config.frequency_at(2), 2.90e9);
    }

    #[test]
    fn test_single_step_collapses_to_start() {
        let config = SweepConfig {
            steps: 1,
            ..Default::default()
        };

        let freq = config.frequency_at(0);
        assert!(freq.is_finite());
        assert_relative_eq!(freq, config.start_freq_hz);
    }

    #[test]
    fn test_zero_steps_stays_finite() {
        let config = SweepConfig {
            steps: 0,
            ..Default::default()
        };
        assert!(config.frequency_at(0).is_finite());
    }

    #[test]
    fn test_delay_spread_across_averages() {
        let config = SweepConfig {
            point_delay: Duration::from_millis(10),
            averages: 5,
            ..Default::default()
        };
        assert_eq!(config.delay_per_average(), Duration::from_millis(2));
    }

    #[test]
    fn test_zero_averages_zero_delay() {
        let config = SweepConfig {
            averages: 0,
            ..Default::default()
        };
        assert_eq!(config.delay_per_average(), Duration::ZERO);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SweepConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let back: SweepConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
