use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::reading::{Batch, Reading};

const RECEIVED_TIME: &str = "received_time";
const MAGNETIC_FIELD: &str = "magnetic_field";
const SENSOR_ID: &str = "sensor_id";
const SENT_TIME: &str = "sent_time";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("batch is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing {field}{}", describe_reading(.reading))]
    MissingField { field: &'static str, reading: Option<usize> },
    #[error("invalid {field}{}: {value}", describe_reading(.reading))]
    InvalidField { field: &'static str, reading: Option<usize>, value: String },
}

pub type BatchResult<T> = Result<T, BatchError>;

fn describe_reading(reading: &Option<usize>) -> String {
    match reading {
        Some(index) => format!(" in reading #{index}"),
        None => String::new(),
    }
}

pub fn load_batch(path: impl AsRef<Path>) -> BatchResult<Batch> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let document: Value = serde_json::from_reader(reader)?;
    debug!("Decoding batch from {}", path.as_ref().display());
    decode_value(&document)
}

pub fn decode_batch(json: &str) -> BatchResult<Batch> {
    let document: Value = serde_json::from_str(json)?;
    decode_value(&document)
}

/// Pulls a batch out of an arbitrary JSON document: the first string
/// `received_time` found, plus every object that carries a `magnetic_field`,
/// both in document order.
pub fn decode_value(document: &Value) -> BatchResult<Batch> {
    let received_time = find_received_time(document)
        .ok_or(BatchError::MissingField { field: RECEIVED_TIME, reading: None })?
        .to_owned();

    let mut objects = Vec::new();
    collect_reading_objects(document, &mut objects);

    let readings = objects.into_iter()
        .enumerate()
        .map(|(index, object)| decode_reading(index, object))
        .collect::<BatchResult<Vec<_>>>()?;

    Ok(Batch { received_time, readings })
}

fn find_received_time(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(received_time)) = map.get(RECEIVED_TIME) {
                return Some(received_time);
            }
            map.values().find_map(find_received_time)
        }
        Value::Array(items) => items.iter().find_map(find_received_time),
        _ => None,
    }
}

fn collect_reading_objects<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) if map.contains_key(MAGNETIC_FIELD) => out.push(map),
        Value::Object(map) => map.values().for_each(|v| collect_reading_objects(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_reading_objects(v, out)),
        _ => {}
    }
}

fn decode_reading(index: usize, object: &Map<String, Value>) -> BatchResult<Reading> {
    let field = |name: &'static str| {
        object.get(name)
            .filter(|v| !v.is_null())
            .ok_or(BatchError::MissingField { field: name, reading: Some(index) })
    };
    let invalid = |name: &'static str, value: &Value| BatchError::InvalidField {
        field: name,
        reading: Some(index),
        value: value.to_string(),
    };

    let raw_field = field(MAGNETIC_FIELD)?;
    let parsed = match raw_field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let magnetic_field = parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(MAGNETIC_FIELD, raw_field))?;

    let sensor_id = match field(SENSOR_ID)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(invalid(SENSOR_ID, other)),
    };

    let sent_time = match field(SENT_TIME)? {
        Value::String(s) => s.clone(),
        other => return Err(invalid(SENT_TIME, other)),
    };

    Ok(Reading { magnetic_field, sensor_id, sent_time })
}
