use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SensorPhase {
    /// Fewer than `window` accepted values; no spike test is possible yet.
    Warming,
    Ready,
}

/// Accepted values for a single sensor, in the order they were processed.
#[derive(Debug, Default, Clone)]
pub struct SensorTrack {
    values: Vec<f64>,
}

impl SensorTrack {
    pub fn phase(&self, window: usize) -> SensorPhase {
        if self.values.len() < window {
            SensorPhase::Warming
        } else {
            SensorPhase::Ready
        }
    }

    /// Mean of the trailing `window` values, or `None` while still warming up.
    pub fn rolling_average(&self, window: usize) -> Option<f64> {
        if window == 0 || self.phase(window) == SensorPhase::Warming {
            return None;
        }
        let recent = &self.values[self.values.len() - window..];
        Some(recent.iter().sum::<f64>() / window as f64)
    }

    pub fn record(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Per-sensor tracks for one batch.  Owned by a single detector and dropped with it.
#[derive(Debug, Default)]
pub struct SensorHistory {
    tracks: HashMap<String, SensorTrack>,
}

impl SensorHistory {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn track(&self, sensor_id: &str) -> Option<&SensorTrack> {
        self.tracks.get(sensor_id)
    }

    pub fn track_mut(&mut self, sensor_id: &str) -> &mut SensorTrack {
        self.tracks.entry(sensor_id.to_owned()).or_default()
    }

    pub fn sensor_count(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warming_until_window_filled() {
        let mut track = SensorTrack::default();
        for i in 0..4 {
            track.record(i as f64);
            assert_eq!(track.phase(5), SensorPhase::Warming);
            assert_eq!(track.rolling_average(5), None);
        }
        track.record(4.0);
        assert_eq!(track.phase(5), SensorPhase::Ready);
        assert_eq!(track.rolling_average(5), Some(2.0));
    }

    #[test]
    fn test_rolling_average_reads_trailing_window_only() {
        let mut track = SensorTrack::default();
        for value in [100.0, 1.0, 1.0, 1.0, 1.0, 6.0] {
            track.record(value);
        }
        assert_eq!(track.len(), 6);
        assert_eq!(track.rolling_average(5), Some(2.0));
        assert_eq!(track.values(), &[100.0, 1.0, 1.0, 1.0, 1.0, 6.0]);
    }

    #[test]
    fn test_tracks_are_independent() {
        let mut history = SensorHistory::new();
        history.track_mut("A").record(1.0);
        history.track_mut("A").record(2.0);
        history.track_mut("B").record(3.0);

        assert_eq!(history.sensor_count(), 2);
        assert_eq!(history.track("A").map(|t| t.values().to_vec()), Some(vec![1.0, 2.0]));
        assert_eq!(history.track("B").map(|t| t.len()), Some(1));
        assert!(history.track("C").is_none());
    }
}
