//! Spectrum analysis module
//!
//! Consumer-side annotation of swept spectra:
//! - Windowed dip detection with prominence thresholding ([`dips`])
//!
//! Everything here is pure: analysis runs against whatever snapshot the
//! consumer currently holds and never touches the sweep worker.

pub mod dips;
