use derive_new::new;
use serde::{Deserialize, Serialize};

/// One magnetometer sample as delivered by the decoder.
#[derive(new, Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Reading {
    pub magnetic_field: f64,
    pub sensor_id: String,
    pub sent_time: String,
}

/// A reading that spiked above its sensor's rolling average.  Copied out of the
/// batch; never refers back into detector history.
#[derive(new, Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Anomaly {
    pub magnetic_field: f64,
    pub sensor_id: String,
    pub sent_time: String,
}

impl From<&Reading> for Anomaly {
    fn from(reading: &Reading) -> Self {
        Self {
            magnetic_field: reading.magnetic_field,
            sensor_id: reading.sensor_id.clone(),
            sent_time: reading.sent_time.clone(),
        }
    }
}

#[derive(new, Debug, PartialEq, Clone)]
pub struct Batch {
    pub received_time: String,
    pub readings: Vec<Reading>,
}
