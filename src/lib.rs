pub mod time_util;
pub mod reading;
pub mod sensor_history;
pub mod anomaly_detector;
pub mod anomaly_report;
pub mod batch_decoder;
pub mod batch_runner;
