use crate::errors::{Error, Result};
use crate::model::{Reading, ReadingRow};

fn required(value: Option<f64>, field: &str, row: &ReadingRow) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(Error::Validation(format!(
            "{} is not finite ({}) for device {} at {}",
            field, v, row.device_id, row.timestamp
        ))),
        None => Err(Error::Validation(format!(
            "{} is missing for device {} at {}",
            field, row.device_id, row.timestamp
        ))),
    }
}

/// Validates a stored row and turns it into a `Reading`
pub fn reading_from_row(row: ReadingRow) -> Result<Reading> {
    if row.device_id.is_empty() {
        return Err(Error::Validation("Device ID cannot be empty".to_string()));
    }

    let pm25 = required(row.pm25, "pm25", &row)?;
    let pm10 = required(row.pm10, "pm10", &row)?;
    let temperature = required(row.temperature, "temperature", &row)?;
    let humidity = required(row.humidity, "humidity", &row)?;

    Ok(Reading {
        device_id: row.device_id,
        timestamp: row.timestamp,
        pm25,
        pm10,
        temperature,
        humidity,
    })
}
