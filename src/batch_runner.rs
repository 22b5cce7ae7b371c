use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use futures::future::join_all;
use log::{error, info};

use crate::anomaly_detector::{AnomalyDetector, DetectorOptions};
use crate::anomaly_report::AnomalyReport;
use crate::batch_decoder;

pub const DEFAULT_BATCH_FILES: [&str; 3] = ["test1.json", "test2.json", "test3.json"];

pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: anyhow::Result<AnomalyReport>,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Each batch is processed in isolation: its own detector, its own history and
/// its own error.  A failure in one never stops the next.
#[derive(Clone, Copy, Default)]
pub struct BatchRunner {
    options: DetectorOptions,
}

impl BatchRunner {
    pub fn new(options: DetectorOptions) -> Self {
        Self { options }
    }

    pub fn process_batch(&self, path: impl AsRef<Path>) -> anyhow::Result<AnomalyReport> {
        let path = path.as_ref();
        let batch = batch_decoder::load_batch(path)
            .with_context(|| format!("Error loading {}", path.display()))?;
        let anomalies = AnomalyDetector::detect_batch(self.options, &batch)
            .with_context(|| format!("Error processing {}", path.display()))?;
        info!("{}: {} readings, {} anomalies", path.display(), batch.readings.len(), anomalies.len());
        Ok(AnomalyReport::new(anomalies))
    }

    pub fn run(&self, paths: &[PathBuf]) -> Vec<BatchOutcome> {
        paths.iter()
            .map(|path| {
                info!("Processing {}", path.display());
                BatchOutcome { path: path.clone(), result: self.process_batch(path) }
            })
            .collect()
    }

    /// Same as [`run`](Self::run) but with every batch on the blocking pool.
    /// Outcomes come back in the order of `paths`.
    pub async fn run_parallel(&self, paths: &[PathBuf]) -> Vec<BatchOutcome> {
        let handles = paths.iter().cloned().map(|path| {
            let runner = *self;
            tokio::task::spawn_blocking(move || {
                info!("Processing {}", path.display());
                let result = runner.process_batch(&path);
                BatchOutcome { path, result }
            })
        });

        join_all(handles).await
            .into_iter()
            .zip(paths)
            .map(|(joined, path)| joined.unwrap_or_else(|e| BatchOutcome {
                path: path.clone(),
                result: Err(anyhow!("Batch task for {} failed: {e}", path.display())),
            }))
            .collect()
    }
}

/// Writes one report per successful batch and logs every failure.
pub fn emit(outcomes: &[BatchOutcome], mut writer: impl Write) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        writeln!(writer, "=== Processing {} ===", outcome.path.display())?;
        match &outcome.result {
            Ok(report) => {
                report.write_pretty(&mut writer)?;
                writeln!(writer)?;
                summary.succeeded += 1;
            }
            Err(e) => {
                error!("{e:#}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
