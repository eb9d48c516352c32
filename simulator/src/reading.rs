use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

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
    pub fn random(rng: &mut impl Rng, device_id: String) -> Self {
        Self {
            device_id,
            timestamp: Utc::now(),
            pm25: round1(rng.gen_range(10.0..120.0)),       // µg/m³
            pm10: round1(rng.gen_range(20.0..200.0)),       // µg/m³
            temperature: round1(rng.gen_range(20.0..40.0)), // °C
            humidity: round1(rng.gen_range(30.0..80.0)),    // %
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = Reading::random(&mut rng, "device_01".to_string());
            assert!((10.0..=120.0).contains(&r.pm25));
            assert!((20.0..=200.0).contains(&r.pm10));
            assert!((20.0..=40.0).contains(&r.temperature));
            assert!((30.0..=80.0).contains(&r.humidity));
        }
    }

    #[test]
    fn test_one_decimal() {
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(round1(99.96), 100.0);

        let mut rng = StdRng::seed_from_u64(42);
        let r = Reading::random(&mut rng, "device_02".to_string());
        assert_eq!(round1(r.pm25), r.pm25);
        assert_eq!(r.device_id, "device_02");
    }
}
