//! Scan magnetometer batches for readings that spike above each sensor's rolling average.
//!
//! With no arguments, `test1.json`, `test2.json` and `test3.json` are scanned from the
//! working directory.  Otherwise the single file given is scanned.  Reports go to stdout,
//! logs (`RUST_LOG`, default `info`) to stderr.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::warn;

use magscan::anomaly_detector::{DetectorOptions, DEFAULT_SPIKE_FACTOR, DEFAULT_STALE_AFTER_MINUTES, DEFAULT_WINDOW};
use magscan::batch_runner::{emit, BatchRunner, DEFAULT_BATCH_FILES};

#[derive(Parser, Debug)]
#[clap(name = "magscan")]
struct Opts {
    /// Batch file to scan instead of the three defaults.
    batch_file: Option<PathBuf>,

    #[clap(long, default_value_t = DEFAULT_STALE_AFTER_MINUTES, allow_hyphen_values = true)]
    stale_after_minutes: i32,

    #[clap(long, default_value_t = DEFAULT_WINDOW, parse(try_from_str = parse_window))]
    window: usize,

    #[clap(long, default_value_t = DEFAULT_SPIKE_FACTOR)]
    spike_factor: f64,

    /// Process batches concurrently; output order is unchanged.
    #[clap(long)]
    parallel: bool,
}

fn parse_window(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("window must be at least 1".to_owned()),
        Ok(window) => Ok(window),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts: Opts = Opts::parse();

    let paths = match opts.batch_file {
        Some(path) => vec![path],
        None => DEFAULT_BATCH_FILES.iter().map(PathBuf::from).collect(),
    };
    let runner = BatchRunner::new(DetectorOptions {
        stale_after_minutes: opts.stale_after_minutes,
        window: opts.window,
        spike_factor: opts.spike_factor,
    });

    let outcomes = if opts.parallel {
        tokio::runtime::Builder::new_current_thread()
            .build()?
            .block_on(runner.run_parallel(&paths))
    } else {
        runner.run(&paths)
    };

    let summary = emit(&outcomes, io::stdout())?;
    if !summary.all_succeeded() {
        warn!("{} of {} batches failed", summary.failed, summary.failed + summary.succeeded);
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::ErrorKind;

    use super::*;

    #[test]
    fn test_no_args_uses_defaults() {
        let opts = Opts::try_parse_from(["magscan"]).unwrap();
        assert_eq!(opts.batch_file, None);
        assert_eq!(opts.window, DEFAULT_WINDOW);
        assert_eq!(opts.stale_after_minutes, DEFAULT_STALE_AFTER_MINUTES);
        assert!(!opts.parallel);
    }

    #[test]
    fn test_single_batch_file() {
        let opts = Opts::try_parse_from(["magscan", "batch.json", "--window", "3"]).unwrap();
        assert_eq!(opts.batch_file, Some(PathBuf::from("batch.json")));
        assert_eq!(opts.window, 3);
    }

    #[test]
    fn test_two_batch_files_is_usage_error() {
        let err = Opts::try_parse_from(["magscan", "a.json", "b.json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = Opts::try_parse_from(["magscan", "--window", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
