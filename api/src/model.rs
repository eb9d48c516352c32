use crate::format::{with_unit, TimeFormat, HUMIDITY_UNIT, PM_UNIT, TEMPERATURE_UNIT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Air-quality sample reported by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub pm10: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading {
    pub fn render(&self, format: TimeFormat) -> FormattedReading {
        FormattedReading {
            device_id: self.device_id.clone(),
            timestamp: format.render(self.timestamp),
            pm25: with_unit(self.pm25, PM_UNIT),
            pm10: with_unit(self.pm10, PM_UNIT),
            temperature: with_unit(self.temperature, TEMPERATURE_UNIT),
            humidity: with_unit(self.humidity, HUMIDITY_UNIT),
        }
    }
}

/// Row as stored. Ingestion is schemaless upstream, so measurements may be
/// missing; see `validate::reading_from_row`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingRow {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Reading as returned by the latest-reading endpoints
#[derive(Debug, Clone, Serialize)]
pub struct FormattedReading {
    pub device_id: String,
    pub timestamp: String,
    pub pm25: String,
    pub pm10: String,
    pub temperature: String,
    pub humidity: String,
}

/// Window average as returned by the hourly and 15-minute endpoints
#[derive(Debug, Clone, Serialize)]
pub struct WindowAverageResponse {
    pub interval: String,
    pub average_pm25: String,
    pub average_pm10: String,
    pub average_temperature: String,
    pub average_humidity: String,
    pub count: usize,
    pub device_id: String,
    pub timestamp: String,
}

/// Body of 404/400 responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of 500 responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
