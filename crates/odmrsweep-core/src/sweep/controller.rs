//! Cancellable background sweep worker
//!
//! One worker thread per active sweep. `start` joins any leftover worker
//! (cancelling it first if still running), clears the cancel flag, and
//! spawns a fresh one; `stop` raises the flag and joins. The accumulated
//! series is private to the worker and escapes only as value snapshots
//! through the sink, so no locking guards the hot loop.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::sweep::config::SweepConfig;
use crate::sweep::result::{SamplePoint, SweepResult};
use crate::sweep::sink::SweepSink;
use crate::sweep::timing::precise_sleep;
use crate::transport::{SyntheticTransport, Transport};

/// Lifecycle of the sweep worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// No worker is running
    Idle,
    /// A worker is acquiring points
    Running,
    /// Cancellation has been requested, worker not yet joined
    Stopping,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

/// Owns the background worker that executes one sweep at a time.
///
/// # Example
/// ```no_run
/// use odmrsweep_core::{ChannelSink, SweepConfig, SweepController, SweepEvent};
///
/// let mut controller = SweepController::new();
/// let (sink, events) = ChannelSink::unbounded();
///
/// // No transport attached: the synthetic source stands in
/// controller.start(SweepConfig::default(), None, sink).unwrap();
///
/// for event in events.iter() {
///     if let SweepEvent::Done(result) = event {
///         println!("swept {} points", result.len());
///         break;
///     }
/// }
/// ```
pub struct SweepController {
    worker: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    points_done: Arc<AtomicUsize>,
    total_points: usize,
}

impl SweepController {
    /// Create a controller with no active worker
    pub fn new() -> Self {
        Self {
            worker: None,
            cancel: Arc::new(AtomicBool::new(false)),
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
            points_done: Arc::new(AtomicUsize::new(0)),
            total_points: 0,
        }
    }

    /// Current worker lifecycle state
    pub fn state(&self) -> SweepState {
        match self.state.load(Ordering::Acquire) {
            STATE_RUNNING => SweepState::Running,
            STATE_STOPPING => SweepState::Stopping,
            _ => SweepState::Idle,
        }
    }

    /// Points completed and total for the current (or last) run
    pub fn progress(&self) -> (usize, usize) {
        (self.points_done.load(Ordering::Acquire), self.total_points)
    }

    /// Start a sweep on a fresh background worker.
    ///
    /// A still-joinable worker from a previous `start` is cancelled and
    /// joined first, so calling `start` without an explicit prior
    /// [`stop`](Self::stop) is always safe and waits at most one point.
    /// With `transport == None` the sweep samples the built-in synthetic
    /// source for the configured band.
    ///
    /// Returns as soon as the worker is spawned; results arrive through
    /// `sink`, ending with exactly one done notification for this run.
    pub fn start<S: SweepSink>(
        &mut self,
        config: SweepConfig,
        transport: Option<Box<dyn Transport>>,
        sink: S,
    ) -> Result<()> {
        self.join_previous();

        let mut transport = transport.unwrap_or_else(|| {
            tracing::info!("no transport attached, sampling the synthetic source");
            Box::new(SyntheticTransport::for_band(
                config.start_freq_hz,
                config.end_freq_hz,
            ))
        });

        self.cancel.store(false, Ordering::Release);
        self.points_done.store(0, Ordering::Release);
        self.total_points = config.steps;
        self.state.store(STATE_RUNNING, Ordering::Release);

        let cancel = Arc::clone(&self.cancel);
        let state = Arc::clone(&self.state);
        let points_done = Arc::clone(&self.points_done);
        let steps = config.steps;

        let spawned = std::thread::Builder::new()
            .name("sweep-worker".into())
            .spawn(move || {
                run_sweep(&config, transport.as_mut(), sink, &cancel, &points_done);
                state.store(STATE_IDLE, Ordering::Release);
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                tracing::info!(steps, "sweep started");
                Ok(())
            }
            Err(err) => {
                self.state.store(STATE_IDLE, Ordering::Release);
                Err(err).context("failed to spawn sweep worker")
            }
        }
    }

    /// Request cancellation and wait for the worker to exit.
    ///
    /// Blocks until the worker has observably finished, which takes at
    /// most one point's full averaging-and-delay cost. Idempotent and
    /// safe to call with no active worker.
    pub fn stop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.state.store(STATE_STOPPING, Ordering::Release);
            self.cancel.store(true, Ordering::Release);
            if handle.join().is_err() {
                tracing::error!("sweep worker panicked");
            }
            tracing::info!("sweep stopped");
        }
        self.state.store(STATE_IDLE, Ordering::Release);
    }

    /// Cancel and join a leftover worker before starting the next run
    fn join_previous(&mut self) {
        if let Some(handle) = self.worker.take() {
            if !handle.is_finished() {
                self.state.store(STATE_STOPPING, Ordering::Release);
                self.cancel.store(true, Ordering::Release);
                tracing::debug!("joining previous sweep worker before restart");
            }
            if handle.join().is_err() {
                tracing::error!("previous sweep worker panicked");
            }
        }
    }
}

impl Default for SweepController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SweepController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker loop: one iteration per swept point.
fn run_sweep<S: SweepSink>(
    config: &SweepConfig,
    transport: &mut dyn Transport,
    mut sink: S,
    cancel: &AtomicBool,
    points_done: &AtomicUsize,
) {
    let started = Instant::now();
    let mut points: Vec<SamplePoint> = Vec::with_capacity(config.steps);
    let delay_per_average = config.delay_per_average();

    for i in 0..config.steps {
        // Cancellation is polled once per point boundary; a stop raised
        // mid-average finishes that average first.
        if cancel.load(Ordering::Acquire) {
            tracing::debug!(point = i, "sweep cancelled");
            break;
        }

        let frequency_hz = config.frequency_at(i);

        if let Err(err) = transport.apply_setting(frequency_hz) {
            // Non-fatal: the point is still sampled at whatever the
            // source is currently emitting.
            tracing::warn!(point = i, frequency_hz, %err, "failed to apply sweep setting");
        }

        points.push(sample_point(
            transport,
            frequency_hz,
            config.averages,
            delay_per_average,
            i,
        ));
        points_done.store(i + 1, Ordering::Release);

        if config.update_interval > 0 && i % config.update_interval == 0 {
            sink.on_update(snapshot(&points, started));
        }
    }

    // Unconditional final update, then exactly one done per start()
    let final_result = snapshot(&points, started);
    sink.on_update(final_result.clone());
    tracing::info!(
        points = final_result.len(),
        elapsed_ms = final_result.elapsed.as_millis() as u64,
        "sweep finished"
    );
    sink.on_done(final_result);
}

/// Average `averages` readings at one frequency into a sample point.
fn sample_point(
    transport: &mut dyn Transport,
    frequency_hz: f64,
    averages: u32,
    delay_per_average: std::time::Duration,
    point_index: usize,
) -> SamplePoint {
    if averages == 0 {
        // No readings requested: emit a zero-statistics point instead of
        // dividing by zero
        return SamplePoint {
            frequency_hz,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            std_dev: 0.0,
        };
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::MAX;
    let mut max = f64::MIN;

    for _ in 0..averages {
        let value = match transport.read_value() {
            Ok(v) => v,
            Err(err) => {
                // One bad sample, not retried; timing stays deterministic
                tracing::warn!(point = point_index, %err, "read failed, sample degraded to zero");
                0.0
            }
        };

        sum += value;
        sum_sq += value * value;
        min = min.min(value);
        max = max.max(value);

        precise_sleep(delay_per_average);
    }

    let n = averages as f64;
    let mean = sum / n;
    // Floating-point cancellation can push the variance fractionally
    // negative; clamp before the square root
    let variance = (sum_sq / n - mean * mean).max(0.0);

    SamplePoint {
        frequency_hz,
        mean,
        min,
        max,
        std_dev: variance.sqrt(),
    }
}

/// Value snapshot of the series acquired so far.
fn snapshot(points: &[SamplePoint], started: Instant) -> SweepResult {
    SweepResult {
        points: points.to_vec(),
        elapsed: started.elapsed(),
    }
}
