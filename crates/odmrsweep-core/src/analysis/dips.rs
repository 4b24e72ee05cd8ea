//! Windowed dip detection for swept spectra
//!
//! Finds locally-minimal, sufficiently prominent points in a signal series
//! and merges near-duplicate candidates into one dip per cluster. Used to
//! annotate resonances in a finished or in-progress sweep.

use crate::{DEFAULT_DIP_PROMINENCE, DEFAULT_DIP_WINDOW};

/// Find prominent dips in `signal`.
///
/// Two phases:
/// 1. Candidate scan: index `i` (with at least `window` points on both
///    sides) is a raw candidate when it sits at least `prominence` below
///    the mean of its `2 * window` neighbors (excluding itself) and is
///    strictly below both immediate neighbors. A plateau is never a
///    candidate, and neither is a point exactly at the prominence
///    threshold.
/// 2. Cluster merge: a run of consecutive candidates whose index gaps are
///    all `<= window / 2` collapses to the candidate with the lowest
///    signal value; on an exact value tie the first-seen minimum wins.
///
/// Returns the surviving indices in increasing order. Inputs shorter than
/// `2 * window + 1`, and `window == 0`, yield no candidates.
///
/// # Example
/// ```
/// use odmrsweep_core::find_dips;
///
/// let signal = [1.0, 1.0, 0.2, 1.0, 1.0];
/// assert_eq!(find_dips(&signal, 1, 0.5), vec![2]);
/// ```
pub fn find_dips(signal: &[f64], window: usize, prominence: f64) -> Vec<usize> {
    let n = signal.len();
    if window == 0 || n < 2 * window + 1 {
        return Vec::new();
    }

    let mut raw: Vec<usize> = Vec::new();

    for i in window..n - window {
        let center = signal[i];

        let mut local_sum = 0.0;
        for j in i - window..=i + window {
            if j != i {
                local_sum += signal[j];
            }
        }
        let local_avg = local_sum / (2 * window) as f64;

        // Strict on both conditions: threshold ties and plateaus are out.
        if center + prominence < local_avg && center < signal[i - 1] && center < signal[i + 1] {
            raw.push(i);
        }
    }

    let min_gap = window / 2;
    let mut dips: Vec<usize> = Vec::with_capacity(raw.len());

    let mut i = 0;
    while i < raw.len() {
        let mut min_idx = raw[i];
        let mut min_val = signal[min_idx];

        while i + 1 < raw.len() && raw[i + 1] - raw[i] <= min_gap {
            i += 1;
            if signal[raw[i]] < min_val {
                min_val = signal[raw[i]];
                min_idx = raw[i];
            }
        }

        dips.push(min_idx);
        i += 1;
    }

    dips
}

/// Dip detection configuration
///
/// Thin builder over [`find_dips`] so display and analysis layers can
/// carry their tuning around as one value.
///
/// # Example
/// ```
/// use odmrsweep_core::DipFinder;
///
/// let finder = DipFinder::new().with_window(1).with_prominence(0.5);
/// let dips = finder.find(&[1.0, 0.3, 1.0, 0.2, 1.0, 0.4, 1.0]);
/// assert_eq!(dips, vec![1, 3, 5]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DipFinder {
    /// Neighborhood half-width in sweep points
    window: usize,
    /// Minimum required drop below the neighborhood average
    prominence: f64,
}

impl Default for DipFinder {
    fn default() -> Self {
        Self {
            window: DEFAULT_DIP_WINDOW,
            prominence: DEFAULT_DIP_PROMINENCE,
        }
    }
}

impl DipFinder {
    /// Create a dip finder with the default window and prominence
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the neighborhood half-width in sweep points
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the minimum prominence below the neighborhood average
    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = prominence;
        self
    }

    /// Find dips in `signal` with this configuration
    pub fn find(&self, signal: &[f64]) -> Vec<usize> {
        find_dips(signal, self.window, self.prominence)
    }

    /// Configured window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Configured prominence
    pub fn prominence(&self) -> f64 {
        self.prominence
    }
}
