use std::io;

use anyhow::anyhow;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use magscan::anomaly_detector::DEFAULT_STALE_AFTER_MINUTES;
use magscan::reading::Reading;
use magscan::time_util;

const MIDNIGHT: &str = "0000-00-00T00:00:00";
const STALE_AFTER_MINUTES: i32 = DEFAULT_STALE_AFTER_MINUTES;
const MAX_STALE_AGE: i32 = 120;

#[derive(Parser, Debug)]
#[clap(name = "batch_generator")]
struct Opts {
  #[clap(short = 'n', long, default_value = "4")]
  num_sensors: u32,

  #[clap(short = 'r', long, default_value = "20")]
  readings_per_sensor: u32,

  #[clap(long, default_value = "0.05", parse(try_from_str = parse_probability))]
  spike_probability: f64,

  #[clap(long, default_value = "0.1", parse(try_from_str = parse_probability))]
  stale_probability: f64,

  #[clap(long, default_value = "2024-05-04T12:00:00Z")]
  received_time: String,

  #[clap(short, long, default_value = "0")]
  seed: u64,
}

#[derive(Serialize)]
struct GeneratedBatch<'a> {
  received_time: &'a str,
  readings: Vec<Reading>,
}

fn parse_probability(s: &str) -> Result<f64, String> {
  let p = s.parse::<f64>().map_err(|e| format!("{e}"))?;
  if (0.0..=1.0).contains(&p) {
    Ok(p)
  } else {
    Err(format!("{p} is not between 0 and 1"))
  }
}

fn main() -> anyhow::Result<()> {
  let opts: Opts = Opts::parse();
  let mut rng = StdRng::seed_from_u64(opts.seed);

  let batch = generate(&opts, &mut rng)?;
  serde_json::to_writer_pretty(io::stdout(), &batch)?;
  println!();
  Ok(())
}

fn generate<'a>(opts: &'a Opts, rng: &mut StdRng) -> anyhow::Result<GeneratedBatch<'a>> {
  let received_minutes = time_util::minutes_between(MIDNIGHT, &opts.received_time)?;
  if received_minutes < 0 {
    return Err(anyhow!("received_time {:?} has a negative hour or minute", opts.received_time));
  }
  // Ages past midnight would wrap to a fresh-looking time of day.
  if opts.stale_probability > 0.0 && received_minutes <= STALE_AFTER_MINUTES {
    return Err(anyhow!(
      "received_time {:?} is too close to midnight for stale readings; use --stale-probability 0",
      opts.received_time));
  }
  let (date_prefix, time_suffix) = opts.received_time.get(..11)
      .zip(opts.received_time.get(16..))
      .ok_or_else(|| anyhow!("received_time {:?} is not splittable", opts.received_time))?;

  let max_fresh_age = received_minutes.min(STALE_AFTER_MINUTES);
  let max_stale_age = received_minutes.min(MAX_STALE_AGE);

  let baselines: Vec<f64> = (0..opts.num_sensors).map(|_| rng.gen_range(20.0..80.0)).collect();
  let mut readings = Vec::new();
  for _ in 0..opts.readings_per_sensor {
    for (sensor, baseline) in baselines.iter().enumerate() {
      let age = if rng.gen_bool(opts.stale_probability) {
        rng.gen_range(STALE_AFTER_MINUTES + 1..=max_stale_age)
      } else {
        rng.gen_range(0..=max_fresh_age)
      };
      let magnetic_field = if rng.gen_bool(opts.spike_probability) {
        baseline * rng.gen_range(6.0..20.0)
      } else {
        baseline + rng.gen_range(-5.0..5.0)
      };
      let sent_minutes = received_minutes - age;
      readings.push(Reading {
        magnetic_field,
        sensor_id: format!("sensor-{sensor}"),
        sent_time: format!("{date_prefix}{:02}:{:02}{time_suffix}", sent_minutes / 60, sent_minutes % 60),
      });
    }
  }

  Ok(GeneratedBatch { received_time: &opts.received_time, readings })
}
