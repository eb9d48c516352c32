//! Window aggregation over device readings.
//!
//! Everything here is a pure function of a set of readings and a reference
//! instant `now`. Callers fetch the readings; nothing is cached between calls.

use crate::errors::{Error, Result};
use crate::format::{average_with_unit, TimeFormat, HUMIDITY_UNIT, PM_UNIT, TEMPERATURE_UNIT};
use crate::model::{Reading, WindowAverageResponse};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Length of the trailing window, in minutes.
pub const WINDOW_MINUTES: i64 = 60;

/// Width of each sub-window bucket, in minutes.
pub const BUCKET_MINUTES: i64 = 15;

/// Fixed sample floor for the 60-minute average. It does not scale with the
/// window length.
pub const MIN_HOURLY_SAMPLES: usize = 45;

const BUCKET_COUNT: usize = (WINDOW_MINUTES / BUCKET_MINUTES) as usize;

pub const HOURLY_LABEL: &str = "Average for last 60 minutes";

/// Inclusive lower bound of the trailing window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(WINDOW_MINUTES)
}

/// Whole minutes elapsed between `timestamp` and `now`, rounded down.
/// Timestamps after `now` give negative ages.
pub fn minutes_ago(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> i64 {
    (now - timestamp).num_milliseconds().div_euclid(60_000)
}

/// Mean of each measurement over a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Means {
    pub pm25: f64,
    pub pm10: f64,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    pm25: f64,
    pm10: f64,
    temperature: f64,
    humidity: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, reading: &Reading) {
        self.pm25 += reading.pm25;
        self.pm10 += reading.pm10;
        self.temperature += reading.temperature;
        self.humidity += reading.humidity;
        self.count += 1;
    }

    fn means(&self) -> Option<Means> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Means {
            pm25: self.pm25 / n,
            pm10: self.pm10 / n,
            temperature: self.temperature / n,
            humidity: self.humidity / n,
        })
    }
}

/// Averages over one window or bucket. `timestamp` is the instant the
/// computation ran at, not derived from the readings.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAverage {
    pub interval: String,
    pub means: Means,
    pub count: usize,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
}

impl WindowAverage {
    pub fn render(&self, format: TimeFormat) -> WindowAverageResponse {
        WindowAverageResponse {
            interval: self.interval.clone(),
            average_pm25: average_with_unit(self.means.pm25, PM_UNIT),
            average_pm10: average_with_unit(self.means.pm10, PM_UNIT),
            average_temperature: average_with_unit(self.means.temperature, TEMPERATURE_UNIT),
            average_humidity: average_with_unit(self.means.humidity, HUMIDITY_UNIT),
            count: self.count,
            device_id: self.device_id.clone(),
            timestamp: format.render(self.timestamp),
        }
    }
}

/// Most recent reading of every device, newest first.
pub fn latest_per_device(readings: &[Reading]) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|&r| seen.insert(r.device_id.as_str()))
        .collect()
}

/// Most recent reading of `device_id`.
pub fn latest_for_device<'a>(readings: &'a [Reading], device_id: &str) -> Result<&'a Reading> {
    readings
        .iter()
        .filter(|r| r.device_id == device_id)
        .max_by_key(|r| r.timestamp)
        .ok_or_else(|| Error::NotFound(device_id.to_string()))
}

/// Average over the trailing 60 minutes, gated on `MIN_HOURLY_SAMPLES`.
pub fn hourly_average(
    readings: &[Reading],
    device_id: &str,
    now: DateTime<Utc>,
) -> Result<WindowAverage> {
    let since = window_start(now);
    let mut acc = Accumulator::default();
    readings
        .iter()
        .filter(|r| r.device_id == device_id && r.timestamp >= since)
        .for_each(|r| acc.add(r));

    match acc.means() {
        Some(means) if acc.count >= MIN_HOURLY_SAMPLES => Ok(WindowAverage {
            interval: HOURLY_LABEL.to_string(),
            means,
            count: acc.count,
            device_id: device_id.to_string(),
            timestamp: now,
        }),
        _ => Err(Error::InsufficientData {
            required: MIN_HOURLY_SAMPLES,
            actual: acc.count,
        }),
    }
}

/// Bucket slot for a reading of the given age, 0 being the oldest bucket.
/// Ages of 60 minutes or more fall outside every bucket.
fn bucket_slot(minutes_ago: i64) -> Option<usize> {
    if minutes_ago >= WINDOW_MINUTES {
        return None;
    }
    let newest_first = (minutes_ago.max(0) / BUCKET_MINUTES) as usize;
    Some(BUCKET_COUNT - 1 - newest_first)
}

fn bucket_label(slot: usize) -> String {
    let newest_first = (BUCKET_COUNT - 1 - slot) as i64;
    let from = newest_first * BUCKET_MINUTES;
    format!("Average for {}-{} min ago", from, from + BUCKET_MINUTES)
}

/// Averages over the four 15-minute buckets of the trailing hour, oldest
/// bucket first. Empty buckets are left out.
pub fn quarter_hour_averages(
    readings: &[Reading],
    device_id: &str,
    now: DateTime<Utc>,
) -> Vec<WindowAverage> {
    let mut buckets: [Accumulator; BUCKET_COUNT] = Default::default();

    for reading in readings.iter().filter(|r| r.device_id == device_id) {
        if let Some(slot) = bucket_slot(minutes_ago(now, reading.timestamp)) {
            buckets[slot].add(reading);
        }
    }

    buckets
        .iter()
        .enumerate()
        .filter_map(|(slot, acc)| {
            acc.means().map(|means| WindowAverage {
                interval: bucket_label(slot),
                means,
                count: acc.count,
                device_id: device_id.to_string(),
                timestamp: now,
            })
        })
        .collect()
}
