//! Synthetic resonance signal source
//!
//! Stands in for the instrument pair when no transport is attached.
//! Models a fluorescence spectrum with two Lorentzian dips at fixed
//! fractional offsets of the configured band plus bounded pseudo-random
//! noise, so the full pipeline stays meaningful without hardware. The
//! noise source is a seeded LCG, making sweeps reproducible in tests.

use super::{Transport, TransportError};

/// Fractional position of the first resonance within the band
const DIP1_FRACTION: f64 = 0.3;

/// Fractional position of the second resonance within the band
const DIP2_FRACTION: f64 = 0.7;

/// Lorentzian half-width as a fraction of the band span
const WIDTH_FRACTION: f64 = 1.0 / 30.0;

/// Depth of each dip below the unit baseline
const DIP_DEPTH: f64 = 0.2;

/// Bound of the additive uniform noise
const NOISE_AMPLITUDE: f64 = 0.01;

/// Default LCG seed for noise generation
const DEFAULT_SEED: u32 = 0xDEADBEEF;

/// Synthetic double-dip signal source
///
/// Tracks the most recently applied frequency and answers reads with the
/// model value at that frequency plus noise. Never fails.
///
/// # Example
/// ```
/// use odmrsweep_core::transport::{SyntheticTransport, Transport};
///
/// let mut source = SyntheticTransport::with_seed(2.85e9, 2.95e9, 42);
/// source.apply_setting(2.88e9).unwrap();
/// let value = source.read_value().unwrap();
/// assert!(value > 0.0 && value < 1.2);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticTransport {
    /// Lower edge of the swept band in Hz
    band_start_hz: f64,
    /// Upper edge of the swept band in Hz
    band_end_hz: f64,
    /// Most recently applied frequency
    frequency_hz: f64,
    /// LCG state for noise generation
    noise_seed: u32,
}

impl SyntheticTransport {
    /// Create a source for the given band with the default noise seed
    pub fn for_band(band_start_hz: f64, band_end_hz: f64) -> Self {
        Self::with_seed(band_start_hz, band_end_hz, DEFAULT_SEED)
    }

    /// Create a source with an explicit noise seed for reproducible runs
    pub fn with_seed(band_start_hz: f64, band_end_hz: f64, seed: u32) -> Self {
        Self {
            band_start_hz,
            band_end_hz,
            frequency_hz: band_start_hz,
            noise_seed: seed,
        }
    }

    /// Noise-free model value at `frequency_hz`.
    ///
    /// Unit baseline minus two Lorentzian dips at fixed fractional
    /// positions of the band. A degenerate band (zero span) returns the
    /// bare baseline instead of forming a zero-width dip.
    pub fn model(&self, frequency_hz: f64) -> f64 {
        let span = self.band_end_hz - self.band_start_hz;
        let width = span.abs() * WIDTH_FRACTION;
        if width == 0.0 {
            return 1.0;
        }

        let center1 = self.band_start_hz + DIP1_FRACTION * span;
        let center2 = self.band_start_hz + DIP2_FRACTION * span;

        1.0 - DIP_DEPTH * lorentzian(frequency_hz, center1, width)
            - DIP_DEPTH * lorentzian(frequency_hz, center2, width)
    }

    /// Frequency of the first model resonance in Hz
    pub fn dip1_hz(&self) -> f64 {
        self.band_start_hz + DIP1_FRACTION * (self.band_end_hz - self.band_start_hz)
    }

    /// Frequency of the second model resonance in Hz
    pub fn dip2_hz(&self) -> f64 {
        self.band_start_hz + DIP2_FRACTION * (self.band_end_hz - self.band_start_hz)
    }

    /// Generate one noise sample in [-NOISE_AMPLITUDE, NOISE_AMPLITUDE]
    fn next_noise(&mut self) -> f64 {
        // LCG parameters (same as glibc)
        self.noise_seed = self
            .noise_seed
            .wrapping_mul(1103515245)
            .wrapping_add(12345);
        let bits = (self.noise_seed >> 16) & 0x7FFF;
        let unit = (bits as f64 / 16384.0) - 1.0;
        unit * NOISE_AMPLITUDE
    }
}

/// Unit-height Lorentzian centered at `center` with half-width `width`
fn lorentzian(x: f64, center: f64, width: f64) -> f64 {
    1.0 / (1.0 + ((x - center) / width).powi(2))
}

impl Transport for SyntheticTransport {
    fn apply_setting(&mut self, value: f64) -> Result<(), TransportError> {
        self.frequency_hz = value;
        Ok(())
    }

    fn read_value(&mut self) -> Result<f64, TransportError> {
        let noise = self.next_noise();
        Ok(self.model(self.frequency_hz) + noise)
    }
}
