use log::{debug, trace};
use thiserror::Error;

use crate::reading::{Anomaly, Batch, Reading};
use crate::sensor_history::SensorHistory;
use crate::time_util;
use crate::time_util::{TimeError, TimeResult};

pub const DEFAULT_STALE_AFTER_MINUTES: i32 = 30;
pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_SPIKE_FACTOR: f64 = 5.0;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct DetectorOptions {
    /// Readings sent more than this many minutes before receipt are dropped.
    pub stale_after_minutes: i32,

    /// Number of prior accepted values a sensor needs before it can spike, and
    /// the length of the trailing window that gets averaged.
    pub window: usize,

    /// A reading spikes when it is strictly greater than `spike_factor * average`.
    pub spike_factor: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
            window: DEFAULT_WINDOW,
            spike_factor: DEFAULT_SPIKE_FACTOR,
        }
    }
}

#[derive(Error, PartialEq, Clone, Debug)]
pub enum DetectError {
    #[error("malformed received_time: {0}")]
    ReceivedTime(#[source] TimeError),
    #[error("reading #{index} from sensor {sensor_id:?}: {source}")]
    SentTime { index: usize, sensor_id: String, source: TimeError },
}

pub type DetectResult<T> = Result<T, DetectError>;

/// Outcome of feeding one reading through the detector.
#[derive(Debug, PartialEq, Clone)]
pub enum Verdict {
    Stale { minutes: i32 },
    WarmingUp,
    Normal { average: f64 },
    Spike(Anomaly),
}

pub struct AnomalyDetector {
    options: DetectorOptions,
    received_time: String,
    history: SensorHistory,
}

impl AnomalyDetector {
    /// Runs a whole batch and returns its anomalies ordered by `sent_time` (plain
    /// string order).  Nothing is returned if any reading fails to parse.
    pub fn detect(
        options: DetectorOptions,
        readings: &[Reading],
        received_time: &str,
    ) -> DetectResult<Vec<Anomaly>> {
        let mut detector = AnomalyDetector::new(options, received_time)?;
        let mut anomalies = Vec::new();

        for (index, reading) in readings.iter().enumerate() {
            let verdict = detector.observe(reading).map_err(|source| DetectError::SentTime {
                index,
                sensor_id: reading.sensor_id.clone(),
                source,
            })?;
            if let Verdict::Spike(anomaly) = verdict {
                anomalies.push(anomaly);
            }
        }

        // Stable, so equal sent_times keep their processing order.
        anomalies.sort_by(|a, b| a.sent_time.cmp(&b.sent_time));
        debug!(
            "{} readings across {} sensors produced {} anomalies",
            readings.len(),
            detector.history.sensor_count(),
            anomalies.len());
        Ok(anomalies)
    }

    pub fn detect_batch(options: DetectorOptions, batch: &Batch) -> DetectResult<Vec<Anomaly>> {
        Self::detect(options, &batch.readings, &batch.received_time)
    }

    pub fn new(options: DetectorOptions, received_time: &str) -> DetectResult<Self> {
        time_util::validate(received_time).map_err(DetectError::ReceivedTime)?;
        Ok(Self {
            options,
            received_time: received_time.to_owned(),
            history: SensorHistory::new(),
        })
    }

    /// Classifies `reading` against its sensor's history, then records it unless
    /// it was stale.
    pub fn observe(&mut self, reading: &Reading) -> TimeResult<Verdict> {
        let minutes = time_util::minutes_between(&reading.sent_time, &self.received_time)?;
        if minutes > self.options.stale_after_minutes {
            debug!("Dropping stale reading from {} sent at {} ({minutes} min old)",
                reading.sensor_id, reading.sent_time);
            return Ok(Verdict::Stale { minutes });
        }

        let DetectorOptions { window, spike_factor, .. } = self.options;
        let track = self.history.track_mut(&reading.sensor_id);
        let current = reading.magnetic_field;
        let verdict = match track.rolling_average(window) {
            None => Verdict::WarmingUp,
            Some(average) if current > spike_factor * average => {
                debug!("Spike on {} at {}: {current} against average {average}",
                    reading.sensor_id, reading.sent_time);
                Verdict::Spike(Anomaly::from(reading))
            }
            Some(average) => Verdict::Normal { average },
        };
        track.record(current);

        trace!("{} @ {} => {verdict:?}", reading.sensor_id, reading.sent_time);
        Ok(verdict)
    }

    pub fn history(&self) -> &SensorHistory {
        &self.history
    }
}
