use crate::errors::Result;
use crate::model::Reading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Read access to stored readings.
///
/// Implementations are constructed once at startup and shared between
/// requests behind an `Arc`.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Every reading, newest first.
    async fn all_readings_desc(&self) -> Result<Vec<Reading>>;

    /// Up to `limit` readings of `device_id`, newest first.
    async fn recent_for_device(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>>;

    /// Readings of `device_id` with `timestamp >= since`, oldest first.
    async fn readings_since(&self, device_id: &str, since: DateTime<Utc>) -> Result<Vec<Reading>>;
}

/// Process-local store backing the router and store tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryReadingStore {
    readings: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings: Arc::new(RwLock::new(readings)),
        }
    }

    pub fn insert(&self, reading: Reading) {
        self.write().push(reading);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Reading>> {
        self.readings.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Reading>> {
        self.readings.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn all_readings_desc(&self) -> Result<Vec<Reading>> {
        let mut readings = self.read().clone();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(readings)
    }

    async fn recent_for_device(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>> {
        let mut readings: Vec<Reading> = self
            .read()
            .iter()
            .filter(|r| r.device_id == device_id)
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings.truncate(limit);
        Ok(readings)
    }

    async fn readings_since(&self, device_id: &str, since: DateTime<Utc>) -> Result<Vec<Reading>> {
        let mut readings: Vec<Reading> = self
            .read()
            .iter()
            .filter(|r| r.device_id == device_id && r.timestamp >= since)
            .cloned()
            .collect();
        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }
}
