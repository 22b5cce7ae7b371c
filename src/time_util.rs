use std::ops::Range;

use thiserror::Error;

const HOUR_DIGITS: Range<usize> = 11..13;
const MINUTE_DIGITS: Range<usize> = 14..16;
const MIN_TIMESTAMP_LEN: usize = 16;

#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum TimeError {
  #[error("timestamp {timestamp:?} is {len} bytes, need at least 16")]
  TooShort { timestamp: String, len: usize },
  #[error("timestamp {timestamp:?} has non-numeric {field} digits")]
  NotNumeric { timestamp: String, field: &'static str },
}

pub type TimeResult<T> = Result<T, TimeError>;

/// Minutes from `t1` to `t2` using only the hour and minute digits of each
/// timestamp (`...THH:MM...`).  Date, seconds and timezone are ignored, so a
/// pair straddling midnight yields a large negative (or positive) difference.
pub fn minutes_between(t1: &str, t2: &str) -> TimeResult<i32> {
  let (hour1, min1) = hour_minute(t1)?;
  let (hour2, min2) = hour_minute(t2)?;
  Ok((hour2 - hour1) * 60 + (min2 - min1))
}

/// Checks that `timestamp` honours the positional layout without computing anything.
pub fn validate(timestamp: &str) -> TimeResult<()> {
  hour_minute(timestamp).map(|_| ())
}

fn hour_minute(timestamp: &str) -> TimeResult<(i32, i32)> {
  if timestamp.len() < MIN_TIMESTAMP_LEN {
    return Err(TimeError::TooShort { timestamp: timestamp.to_owned(), len: timestamp.len() });
  }
  let hour = parse_field(timestamp, HOUR_DIGITS, "hour")?;
  let minute = parse_field(timestamp, MINUTE_DIGITS, "minute")?;
  Ok((hour, minute))
}

fn parse_field(timestamp: &str, range: Range<usize>, field: &'static str) -> TimeResult<i32> {
  timestamp.get(range)
      .and_then(|digits| digits.parse::<i32>().ok())
      .ok_or_else(|| TimeError::NotNumeric { timestamp: timestamp.to_owned(), field })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_same_minute_is_zero() {
    assert_eq!(minutes_between("2024-03-01T10:15:00Z", "2024-03-01T10:15:59Z"), Ok(0));
  }

  #[test]
  fn test_hours_and_minutes_combine() {
    assert_eq!(minutes_between("2024-03-01T09:45:00Z", "2024-03-01T10:16:00Z"), Ok(31));
    assert_eq!(minutes_between("2024-03-01T10:16:00Z", "2024-03-01T09:45:00Z"), Ok(-31));
  }

  #[test]
  fn test_date_is_ignored_across_midnight() {
    // Previous day's 23:50 against 00:05 looks like it was sent far in the future.
    assert_eq!(minutes_between("2024-03-01T23:50:00Z", "2024-03-02T00:05:00Z"), Ok(-1425));
    assert_eq!(minutes_between("2024-02-27T10:00:00Z", "2024-03-02T10:00:00Z"), Ok(0));
  }

  #[test]
  fn test_too_short() {
    let err = minutes_between("2024-03-01T10:1", "2024-03-01T10:15:00Z").unwrap_err();
    assert_eq!(err, TimeError::TooShort { timestamp: "2024-03-01T10:1".to_owned(), len: 15 });
  }

  #[test]
  fn test_exactly_sixteen_bytes_is_enough() {
    assert_eq!(minutes_between("2024-03-01T10:15", "2024-03-01T11:00"), Ok(45));
  }

  #[test]
  fn test_non_numeric_digits() {
    let err = minutes_between("2024-03-01T10:15:00Z", "2024-03-01Tab:15:00Z").unwrap_err();
    assert!(matches!(err, TimeError::NotNumeric { field: "hour", .. }));

    let err = validate("2024-03-01T10:x5:00Z").unwrap_err();
    assert!(matches!(err, TimeError::NotNumeric { field: "minute", .. }));
  }

  #[test]
  fn test_multibyte_boundary_is_not_numeric() {
    // 'é' straddles offset 11, so the hour slice is not on a char boundary.
    let err = validate("2024-03-01é0:15:00Z").unwrap_err();
    assert!(matches!(err, TimeError::NotNumeric { field: "hour", .. }));
  }
}
