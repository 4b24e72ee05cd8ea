//! Odmrsweep - headless ODMR sweep acquisition tool
//!
//! Runs frequency sweeps from the command line. Without hardware the
//! sweep samples the built-in synthetic resonance source, so this binary
//! exercises the whole pipeline: sweep, stream updates, detect dips.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use odmrsweep_core::{
    ChannelSink, DipFinder, SweepConfig, SweepController, SweepEvent, SweepHistory, SweepResult,
    SyntheticTransport, Transport,
};

/// Parsed command line
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

/// Everything a sweep run needs from the command line
struct RunOptions {
    config: SweepConfig,
    /// Explicit synthetic-source seed for reproducible runs
    seed: Option<u32>,
    /// Number of consecutive sweeps to run
    repeat: usize,
    finder: DipFinder,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("odmrsweep=info".parse()?)
                .add_directive("odmrsweep_core=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    match parse_args(&args[1..])? {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("odmrsweep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Run(options) => run(options),
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut config = SweepConfig::default();
    let mut seed: Option<u32> = None;
    let mut repeat: usize = 1;
    let mut finder = DipFinder::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            "--config" | "-c" => {
                config = load_config(take_value(args, i, "--config")?)?;
                i += 2;
            }
            "--start" => {
                let ghz: f64 = parse_value(args, i, "--start")?;
                config.start_freq_hz = ghz * 1e9;
                i += 2;
            }
            "--end" => {
                let ghz: f64 = parse_value(args, i, "--end")?;
                config.end_freq_hz = ghz * 1e9;
                i += 2;
            }
            "--steps" => {
                config.steps = parse_value(args, i, "--steps")?;
                i += 2;
            }
            "--averages" => {
                config.averages = parse_value(args, i, "--averages")?;
                i += 2;
            }
            "--delay-ms" => {
                let ms: f64 = parse_value(args, i, "--delay-ms")?;
                if !(ms >= 0.0) {
                    bail!("--delay-ms must be non-negative, got {}", ms);
                }
                config.point_delay = Duration::from_secs_f64(ms / 1000.0);
                i += 2;
            }
            "--update-interval" => {
                config.update_interval = parse_value(args, i, "--update-interval")?;
                i += 2;
            }
            "--seed" => {
                seed = Some(parse_value(args, i, "--seed")?);
                i += 2;
            }
            "--repeat" => {
                repeat = parse_value(args, i, "--repeat")?;
                if repeat == 0 {
                    bail!("--repeat must be at least 1");
                }
                i += 2;
            }
            "--dip-window" => {
                finder = finder.with_window(parse_value(args, i, "--dip-window")?);
                i += 2;
            }
            "--dip-prominence" => {
                finder = finder.with_prominence(parse_value(args, i, "--dip-prominence")?);
                i += 2;
            }
            arg => bail!("unknown argument: {} (try --help)", arg),
        }
    }

    Ok(Command::Run(RunOptions {
        config,
        seed,
        repeat,
        finder,
    }))
}

/// The value following a flag, or an error naming the flag
fn take_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{flag} requires a value"))
}

/// Parse the value following a flag
fn parse_value<T>(args: &[String], i: usize, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    take_value(args, i, flag)?
        .parse()
        .with_context(|| format!("invalid value for {flag}"))
}

/// Load a sweep configuration from a JSON file
fn load_config(path: &str) -> Result<SweepConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("invalid sweep config in {path}"))
}

fn run(options: RunOptions) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to install Ctrl+C handler")?;
    }

    let mut controller = SweepController::new();
    let mut history = SweepHistory::new();
    let total = options.config.steps;

    for run_index in 1..=options.repeat {
        if options.repeat > 1 {
            info!(run = run_index, of = options.repeat, "starting sweep");
        }

        // An explicit seed pins the synthetic source; otherwise the
        // controller attaches its own fallback
        let transport: Option<Box<dyn Transport>> = options.seed.map(|seed| {
            Box::new(SyntheticTransport::with_seed(
                options.config.start_freq_hz,
                options.config.end_freq_hz,
                seed,
            )) as Box<dyn Transport>
        });

        let (sink, events) = ChannelSink::unbounded();
        controller.start(options.config.clone(), transport, sink)?;

        let result = loop {
            if interrupted.swap(false, Ordering::SeqCst) {
                info!("interrupt received, stopping sweep");
                controller.stop();
            }
            match events.recv_timeout(Duration::from_millis(100)) {
                Ok(SweepEvent::Update(snapshot)) => {
                    info!(points = snapshot.len(), total, "sweep progress");
                }
                Ok(SweepEvent::Done(result)) => break result,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    bail!("sweep worker went away without a final result");
                }
            }
        };

        let cancelled = result.len() < total;
        print_summary(&result, &options.finder);
        history.record(result, cancelled);

        if cancelled {
            // A Ctrl+C that cut this run short also ends the series
            break;
        }
    }

    controller.stop();

    if history.len() > 1 {
        print_history(&history);
    }

    Ok(())
}

fn print_summary(result: &SweepResult, finder: &DipFinder) {
    println!();
    println!("Sweep Summary");
    println!("{}", "═".repeat(62));
    println!("  Points:    {}", result.len());
    println!("  Elapsed:   {:.3} s", result.elapsed.as_secs_f64());

    if result.is_empty() {
        println!("  No data acquired");
        return;
    }

    let means = result.means();
    let min_signal = means.iter().cloned().fold(f64::MAX, f64::min);
    let max_signal = means.iter().cloned().fold(f64::MIN, f64::max);
    println!(
        "  Band:      {:.6} - {:.6} GHz",
        result.points[0].frequency_hz / 1e9,
        result.points[result.len() - 1].frequency_hz / 1e9
    );
    println!("  Signal:    {min_signal:.4} .. {max_signal:.4}");

    let dips = finder.find(&means);
    if dips.is_empty() {
        println!("  No dips above the configured prominence");
    } else {
        println!("{}", "─".repeat(62));
        println!("  {:>3}  {:>14}  {:>10}", "#", "Frequency (GHz)", "Signal");
        for (n, &idx) in dips.iter().enumerate() {
            let point = &result.points[idx];
            println!(
                "  {:>3}  {:>14.6}  {:>10.4}",
                n + 1,
                point.frequency_hz / 1e9,
                point.mean
            );
        }
    }
}

fn print_history(history: &SweepHistory) {
    println!();
    println!("Run History");
    println!("{}", "═".repeat(62));
    for (n, record) in history.records().iter().enumerate() {
        println!(
            "  {:>3}  {}  {:>5} points  {:>8.3} s  {}",
            n + 1,
            record.completed_at.format("%H:%M:%S"),
            record.result.len(),
            record.result.elapsed.as_secs_f64(),
            if record.cancelled { "cancelled" } else { "complete" }
        );
    }
}

fn print_help() {
    println!(
        "odmrsweep {} - headless ODMR sweep acquisition",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("  odmrsweep [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -c, --config <FILE>        Load sweep config from a JSON file");
    println!("      --start <GHZ>          Sweep start frequency in GHz");
    println!("      --end <GHZ>            Sweep end frequency in GHz");
    println!("      --steps <N>            Number of sweep points");
    println!("      --averages <N>         Readings averaged per point");
    println!("      --delay-ms <MS>        Settling delay per point in ms");
    println!("      --update-interval <N>  Points between progress updates");
    println!("      --seed <N>             Synthetic-source noise seed");
    println!("      --repeat <N>           Run N consecutive sweeps");
    println!("      --dip-window <N>       Dip detection window in points");
    println!("      --dip-prominence <X>   Dip detection prominence");
    println!("  -h, --help                 Print this help");
    println!("  -v, --version              Print version");
    println!();
    println!("Without hardware attached the sweep samples a synthetic");
    println!("double-resonance source; use --seed for reproducible runs.");
}
