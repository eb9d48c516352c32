use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No data found for device {0}")]
    NotFound(String),

    #[error("Not enough data for hourly average (requires ≥ {required} points, found {actual})")]
    InsufficientData { required: usize, actual: usize },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metrics encoding error: {0}")]
    MetricsEncoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
