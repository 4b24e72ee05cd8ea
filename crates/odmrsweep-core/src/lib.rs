//! Odmrsweep Core - Sweep engine, dip detection, and statistics
//!
//! This library provides the acquisition core for optically detected
//! magnetic resonance (ODMR) frequency sweeps. It drives a signal source
//! and a reading device point by point, reduces repeated readings to
//! summary statistics, and streams partial results to a consumer while
//! staying cancellable at every point boundary. Without an attached
//! instrument transport it falls back to a deterministic synthetic
//! resonance model, so the whole pipeline runs without hardware.

pub mod analysis;
pub mod stats;
pub mod sweep;
pub mod transport;

pub use analysis::dips::{find_dips, DipFinder};
pub use stats::history::SweepHistory;
pub use sweep::config::SweepConfig;
pub use sweep::controller::{SweepController, SweepState};
pub use sweep::result::{SamplePoint, SweepResult};
pub use sweep::sink::{ChannelSink, SweepEvent, SweepSink};
pub use transport::{SyntheticTransport, Transport, TransportError};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default dip-detection window in sweep points
pub const DEFAULT_DIP_WINDOW: usize = 40;

/// Default dip-detection prominence threshold
pub const DEFAULT_DIP_PROMINENCE: f64 = 0.01;
