//! padlock - Crack a simulated numpad padlock
//!
//! This tool builds a padlock accessor from a configuration file or a keypad
//! size, runs the backtracking cracker against it and reports the passcode.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use padlock_core::{
    crack, Padlock, PadlockAccessor, PadlockBuilder, PadlockConfig, WriteLatency,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Crack a simulated padlock whose input buffer is expensive to write
#[derive(Parser, Debug)]
#[command(name = "padlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Skip the simulated write latency
    #[arg(long, global = true, env = "PADLOCK_FAST")]
    fast: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crack a single padlock and report its passcode
    Crack {
        /// Configuration file, or the keypad size as a number
        config: Option<String>,

        /// Keypad size; overrides the configuration
        #[arg(short, long)]
        keypad_size: Option<usize>,
    },

    /// Crack many fresh padlocks and report time and write statistics
    Bench {
        /// Number of padlocks to crack
        #[arg(short, long, default_value = "500")]
        runs: usize,

        /// Keypad size of every padlock
        #[arg(short, long, default_value = "9")]
        keypad_size: usize,
    },
}

/// Aggregated results of a benchmark
#[derive(Debug, Default)]
struct BenchStats {
    runs: usize,
    total_time: Duration,
    total_writes: u64,
}

impl BenchStats {
    fn record(&mut self, elapsed: Duration, writes: u64) {
        self.runs += 1;
        self.total_time += elapsed;
        self.total_writes += writes;
    }

    fn avg_millis(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_time.as_secs_f64() * 1000.0 / self.runs as f64
    }

    fn avg_writes(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_writes as f64 / self.runs as f64
    }

    /// Run time in seconds had every write paid a one second latency
    fn estimated_secs(&self) -> f64 {
        self.avg_millis() / 1000.0 + self.avg_writes()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.global.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    match cli.command {
        Command::Crack {
            ref config,
            keypad_size,
        } => run_crack(&cli.global, config.as_deref(), keypad_size),
        Command::Bench { runs, keypad_size } => run_bench(&cli.global, runs, keypad_size),
    }
}

/// Build the accessor for `crack` from the command line
fn build_accessor(
    global: &GlobalOpts,
    config: Option<&str>,
    keypad_size: Option<usize>,
) -> Result<Box<dyn PadlockAccessor>> {
    let config = PadlockConfig::from_arg(config).context("Failed to load padlock configuration")?;
    debug!("Using configuration: {:?}", config);

    let mut builder = PadlockBuilder::new().with_config(config);
    if let Some(size) = keypad_size {
        builder = builder.with_keypad_size(size);
    }
    if global.fast {
        builder = builder.with_latency(WriteLatency::none());
    }
    builder.build().context("Failed to build padlock")
}

fn run_crack(global: &GlobalOpts, config: Option<&str>, keypad_size: Option<usize>) -> Result<()> {
    let mut accessor = build_accessor(global, config, keypad_size)?;
    info!("Cracking a padlock with {} keys", accessor.size());

    let start = Instant::now();
    let solution = crack(&mut accessor).context("Cracking aborted")?;
    let elapsed = start.elapsed();

    match solution {
        Some(passcode) => {
            info!(
                "Cracked solution in {:?} ({} writes, {} checks)",
                elapsed,
                accessor.write_count(),
                accessor.check_count()
            );
            println!("{:?}", passcode);
            Ok(())
        }
        None => {
            bail!("No solution found after {} writes", accessor.write_count())
        }
    }
}

fn run_bench(global: &GlobalOpts, runs: usize, keypad_size: usize) -> Result<()> {
    let latency = if global.fast {
        WriteLatency::none()
    } else {
        WriteLatency::from_env()
    };

    println!("Total run: {}", runs);
    println!("Numpad size: {}", keypad_size);

    let mut stats = BenchStats::default();
    for run in 1..=runs {
        let mut padlock = Padlock::new(keypad_size)
            .context("Failed to create padlock")?
            .with_latency(latency);
        padlock.reset_counters();

        let start = Instant::now();
        crack(&mut padlock).with_context(|| format!("Run #{} aborted", run))?;
        let elapsed = start.elapsed();

        if !padlock.check().context("Padlock buffer invalid after run")? {
            bail!("Invalid solution: passcode not correct after run #{}", run);
        }

        println!(
            "Run #{}: time: {}ms; write: {}",
            run,
            elapsed.as_millis(),
            padlock.write_count()
        );
        stats.record(elapsed, padlock.write_count());
    }

    println!("Run time sum: {}ms", stats.total_time.as_millis());
    println!("Write sum: {}", stats.total_writes);
    println!("Avg run time: {:.3}ms", stats.avg_millis());
    println!("Avg write: {:.3}", stats.avg_writes());
    println!(
        "Calculated estimate avg run time: {:.3}s",
        stats.estimated_secs()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fast() -> GlobalOpts {
        GlobalOpts {
            fast: true,
            verbose: 0,
        }
    }

    #[test]
    fn test_bench_stats() {
        let mut stats = BenchStats::default();
        stats.record(Duration::from_millis(10), 6);
        stats.record(Duration::from_millis(30), 10);

        assert_eq!(stats.runs, 2);
        assert_eq!(stats.total_writes, 16);
        assert!((stats.avg_millis() - 20.0).abs() < 1e-9);
        assert!((stats.avg_writes() - 8.0).abs() < 1e-9);
        assert!((stats.estimated_secs() - 8.02).abs() < 1e-9);
    }

    #[test]
    fn test_empty_bench_stats() {
        let stats = BenchStats::default();
        assert_eq!(stats.avg_millis(), 0.0);
        assert_eq!(stats.avg_writes(), 0.0);
    }

    #[test]
    fn test_build_accessor_from_number() {
        let accessor = build_accessor(&fast(), Some("6"), None).unwrap();
        assert_eq!(accessor.size(), 6);
    }

    #[test]
    fn test_build_accessor_override() {
        let accessor = build_accessor(&fast(), Some("6"), Some(3)).unwrap();
        assert_eq!(accessor.size(), 3);
    }

    #[test]
    fn test_build_accessor_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "access_type": "custom", "instance": {{ "kind": "preset", "passcode": [1, 2, 0] }} }}"#
        )
        .unwrap();

        let mut accessor = build_accessor(&fast(), file.path().to_str(), None).unwrap();
        assert_eq!(crack(&mut accessor).unwrap(), Some(vec![1, 2, 0]));
    }

    #[test]
    fn test_unsupported_access_type() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "access_type": "socket" }}"#).unwrap();
        assert!(build_accessor(&fast(), file.path().to_str(), None).is_err());
    }

    #[test]
    fn test_run_crack_fast() {
        assert!(run_crack(&fast(), Some("4"), None).is_ok());
    }

    #[test]
    fn test_run_bench_fast() {
        assert!(run_bench(&fast(), 3, 4).is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
