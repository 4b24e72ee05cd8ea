//! Instrument transport seam
//!
//! The sweep worker drives external instruments through two synchronous
//! primitives: apply a numeric sweep setting (the source frequency) and
//! read back a numeric value (the detector reading). Session handling,
//! resource discovery, and wire protocols live outside this crate; when no
//! transport is attached the worker falls back to the synthetic source in
//! [`synthetic`].

pub mod synthetic;

pub use synthetic::SyntheticTransport;

use thiserror::Error;

/// Errors that can occur on the instrument link
///
/// Both variants are non-fatal to a running sweep: a failed write leaves
/// the source at its previous setting and the point is still sampled, a
/// failed read degrades that single sample to zero.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to apply sweep setting: {0}")]
    Write(String),

    #[error("failed to read value: {0}")]
    Read(String),
}

/// A synchronous instrument link used by the sweep worker.
///
/// Implementations are externally synchronized: the worker is the sole
/// caller, with at most one command in flight at a time.
pub trait Transport: Send {
    /// Apply a numeric sweep setting (the source frequency in Hz).
    fn apply_setting(&mut self, value: f64) -> Result<(), TransportError>;

    /// Read one value from the measurement device.
    fn read_value(&mut self) -> Result<f64, TransportError>;
}
