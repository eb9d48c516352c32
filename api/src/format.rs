//! Rendering helpers shared by every endpoint: unit suffixes, one-decimal
//! averages and the two timestamp modes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::fmt::Display;

pub const PM_UNIT: &str = "µg/m³";
pub const TEMPERATURE_UNIT: &str = "°C";
pub const HUMIDITY_UNIT: &str = "%";

/// Fixed offset added to UTC instants in IST mode.
pub const IST_OFFSET_MINUTES: i64 = 5 * 60 + 30;

/// How timestamps are rendered in responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    #[default]
    Utc,
    /// UTC instant shifted by +5:30. The output keeps the `Z` designator;
    /// this is plain arithmetic, not a zone conversion.
    Ist,
}

impl TimeFormat {
    /// Maps the `format` query parameter. Only `ist` selects IST mode.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("ist") => TimeFormat::Ist,
            _ => TimeFormat::Utc,
        }
    }

    pub fn render(self, instant: DateTime<Utc>) -> String {
        let shifted = match self {
            TimeFormat::Utc => instant,
            TimeFormat::Ist => instant + Duration::minutes(IST_OFFSET_MINUTES),
        };
        shifted.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Raw value followed by its unit, e.g. `42.5 µg/m³`.
pub fn with_unit(value: impl Display, unit: &str) -> String {
    format!("{} {}", value, unit)
}

/// Rounds to the nearest tenth on the exact binary value, halves away from
/// zero. `{:.1}` alone sends exact halves such as 10.25 to the even digit.
fn round_one_decimal(value: f64) -> f64 {
    let twentieths = (value * 20.0).round();
    // exact when the fused residual is zero
    let is_half = twentieths % 2.0 != 0.0 && value.mul_add(20.0, -twentieths) == 0.0;
    if is_half {
        (twentieths + twentieths.signum()) / 20.0
    } else {
        value
    }
}

/// Value rounded to one decimal place followed by its unit, e.g. `42.0 °C`.
pub fn average_with_unit(value: f64, unit: &str) -> String {
    format!("{:.1} {}", round_one_decimal(value), unit)
}
