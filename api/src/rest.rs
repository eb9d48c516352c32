use crate::aggregate::{self, window_start};
use crate::errors::Error;
use crate::format::TimeFormat;
use crate::metrics::{self, INSUFFICIENT_DATA_TOTAL, NOT_FOUND_TOTAL, REQUESTS_TOTAL, STORE_FAILURES_TOTAL};
use crate::model::{ErrorResponse, FormattedReading, MessageResponse, WindowAverageResponse};
use crate::store::ReadingStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
struct AppState {
    store: Arc<dyn ReadingStore>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    format: Option<String>,
}

impl FormatQuery {
    fn time_format(&self) -> TimeFormat {
        TimeFormat::from_param(self.format.as_deref())
    }
}

pub fn create_router(store: Arc<dyn ReadingStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/get-latest", get(get_latest))
        .route("/device/:id/latest", get(get_device_latest))
        .route("/device/:id/hourly", get(get_device_hourly))
        .route("/device/:id/15min", get(get_device_quarter_hours))
        .with_state(state)
}

pub async fn metrics_handler() -> Result<String, AppError> {
    Ok(metrics::gather_metrics()?)
}

async fn get_latest(
    State(state): State<AppState>,
    Query(params): Query<FormatQuery>,
) -> Result<Json<Vec<FormattedReading>>, AppError> {
    REQUESTS_TOTAL.inc();
    let format = params.time_format();

    let readings = state.store.all_readings_desc().await?;
    let latest: Vec<FormattedReading> = aggregate::latest_per_device(&readings)
        .into_iter()
        .map(|r| r.render(format))
        .collect();

    debug!("Latest readings for {} devices", latest.len());
    Ok(Json(latest))
}

async fn get_device_latest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FormatQuery>,
) -> Result<Json<FormattedReading>, AppError> {
    REQUESTS_TOTAL.inc();

    let readings = state.store.recent_for_device(&id, 1).await?;
    let latest = aggregate::latest_for_device(&readings, &id)?;

    Ok(Json(latest.render(params.time_format())))
}

async fn get_device_hourly(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FormatQuery>,
) -> Result<Json<WindowAverageResponse>, AppError> {
    REQUESTS_TOTAL.inc();
    let now = Utc::now();

    let readings = state.store.readings_since(&id, window_start(now)).await?;
    let average = aggregate::hourly_average(&readings, &id, now)?;

    Ok(Json(average.render(params.time_format())))
}

async fn get_device_quarter_hours(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FormatQuery>,
) -> Result<Json<Vec<WindowAverageResponse>>, AppError> {
    REQUESTS_TOTAL.inc();
    let now = Utc::now();
    let format = params.time_format();

    let readings = state.store.readings_since(&id, window_start(now)).await?;
    let averages = aggregate::quarter_hour_averages(&readings, &id, now)
        .iter()
        .map(|a| a.render(format))
        .collect();

    Ok(Json(averages))
}

pub struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::NotFound(id) => {
                NOT_FOUND_TOTAL.inc();
                debug!("No readings for device {}", id);
                (
                    StatusCode::NOT_FOUND,
                    Json(MessageResponse {
                        message: "No data found for device".to_string(),
                    }),
                )
                    .into_response()
            }
            Error::InsufficientData { required, actual } => {
                INSUFFICIENT_DATA_TOTAL.inc();
                info!("Hourly average refused: {} of {} samples", actual, required);
                (
                    StatusCode::BAD_REQUEST,
                    Json(MessageResponse {
                        message: format!(
                            "Not enough data for hourly average (requires ≥ {} points)",
                            required
                        ),
                    }),
                )
                    .into_response()
            }
            err => {
                if is_store_failure(&err) {
                    STORE_FAILURES_TOTAL.inc();
                }
                error!("API error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: err.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Errors raised while reading from the store, as opposed to the `/metrics`
/// export path.
fn is_store_failure(err: &Error) -> bool {
    matches!(
        err,
        Error::Database(_) | Error::Migration(_) | Error::Validation(_)
    )
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
