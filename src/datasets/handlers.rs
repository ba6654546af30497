// src/datasets/handlers.rs

use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{
    ColumnMissing, ContinuousSummary, CorrelationResponse, DatasetOverview, DatasetPreview,
    MissingSummary, PreviewQuery, RelationPoint, RelationQuery, RelationResponse, ValueCount,
    ValueCountsResponse,
};
use super::store::StoredDataset;
use crate::auth::AuthedUser;
use crate::common::{generate_dataset_id, ApiError, AppState};
use crate::eda::{stats, DataFrame, FrameError};

/// Number of histogram buckets for continuous column distributions.
const HISTOGRAM_BINS: usize = 50;

/// Bucket label for missing cells in categorical value counts.
const MISSING_LABEL: &str = "(missing)";

const DEFAULT_PREVIEW_ROWS: usize = 20;
const MAX_PREVIEW_ROWS: usize = 200;

/// POST /api/datasets - Upload a CSV dataset
///
/// Replaces the user's current dataset and responds with its overview.
pub async fn upload_dataset(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    info!(user_id = %authed.id, "User uploading dataset");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("dataset.csv").to_string();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(ApiError::BadRequest(
                "Only CSV files are allowed".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;

        let frame = DataFrame::from_csv_bytes(&data).map_err(|e| match e {
            FrameError::Empty => ApiError::BadRequest("CSV file is empty".to_string()),
            FrameError::NoDataRows => {
                ApiError::BadRequest("CSV file has no data rows".to_string())
            }
            FrameError::MalformedRow(msg) => ApiError::BadRequest(msg),
        })?;

        let classes = frame.classify_columns();
        let dataset = StoredDataset {
            id: generate_dataset_id(),
            filename,
            uploaded_at: chrono::Utc::now().to_rfc3339(),
            frame,
            classes,
        };

        let dataset = state.datasets.put(&authed.id, dataset).await;

        info!(
            user_id = %authed.id,
            dataset_id = %dataset.id,
            rows = dataset.frame.n_rows(),
            columns = dataset.frame.n_cols(),
            "Dataset uploaded successfully"
        );

        return Ok((StatusCode::CREATED, Json(overview_of(&dataset))));
    }

    Err(ApiError::BadRequest("No dataset file provided".to_string()))
}

/// GET /api/datasets/overview - Shape and column classification
pub async fn get_overview(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<DatasetOverview>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;
    Ok(Json(overview_of(&dataset)))
}

/// GET /api/datasets/correlation - Pearson matrix over continuous columns
pub async fn get_correlation(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<CorrelationResponse>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;
    let columns = dataset.classes.continuous.clone();
    let matrix = stats::correlation_matrix(&dataset.frame, &columns);
    Ok(Json(CorrelationResponse { columns, matrix }))
}

/// GET /api/datasets/missing - Missing-value distribution per column
pub async fn get_missing(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<MissingSummary>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;
    let rows = dataset.frame.n_rows();

    let columns = dataset
        .frame
        .names()
        .iter()
        .map(|name| {
            let values = dataset.frame.column(name).unwrap_or_default();
            let missing = values.iter().filter(|v| v.is_none()).count();
            ColumnMissing {
                name: name.clone(),
                missing,
                present: rows - missing,
                percent_missing: percent(missing, rows),
            }
        })
        .collect();

    Ok(Json(MissingSummary { rows, columns }))
}

/// GET /api/datasets/columns/:name/summary - Continuous column statistics
pub async fn get_column_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(name): Path<String>,
) -> Result<Json<ContinuousSummary>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;

    if !dataset.frame.has_column(&name) {
        return Err(ApiError::NotFound(format!("Column '{}' not found", name)));
    }
    if !dataset.is_continuous(&name) {
        return Err(ApiError::BadRequest(format!(
            "Column '{}' is categorical; summaries cover continuous columns",
            name
        )));
    }

    let series = dataset
        .frame
        .numeric_column(&name)
        .unwrap_or_default();
    let values: Vec<f64> = series.iter().filter_map(|v| *v).collect();
    let missing = series.len() - values.len();
    let d = stats::describe(&values);

    Ok(Json(ContinuousSummary {
        column: name,
        count: d.count,
        missing,
        percent_missing: percent(missing, series.len()),
        mean: d.mean,
        std: d.std,
        min: d.min,
        max: d.max,
        q25: d.q25,
        q50: d.q50,
        q75: d.q75,
        histogram: stats::histogram(&values, HISTOGRAM_BINS),
    }))
}

/// GET /api/datasets/columns/:name/counts - Categorical value counts
pub async fn get_column_counts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(name): Path<String>,
) -> Result<Json<ValueCountsResponse>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;

    if !dataset.frame.has_column(&name) {
        return Err(ApiError::NotFound(format!("Column '{}' not found", name)));
    }
    if !dataset.is_categorical(&name) {
        return Err(ApiError::BadRequest(format!(
            "Column '{}' is continuous; value counts cover categorical columns",
            name
        )));
    }

    let values = dataset.frame.column(&name).unwrap_or_default();
    let counts = stats::value_counts(values, MISSING_LABEL)
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();

    Ok(Json(ValueCountsResponse {
        column: name,
        counts,
    }))
}

/// GET /api/datasets/relation - Chart data for feature relationships
pub async fn get_relation(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<RelationQuery>,
) -> Result<Json<RelationResponse>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;

    for axis in [&query.x, &query.y] {
        if !dataset.frame.has_column(axis) {
            return Err(ApiError::BadRequest(format!("Column '{}' not found", axis)));
        }
    }
    if let Some(color) = &query.color {
        if !dataset.frame.has_column(color) {
            return Err(ApiError::BadRequest(format!("Column '{}' not found", color)));
        }
    }

    let response = match query.chart.as_str() {
        "scatter" | "bar" => {
            let points = paired_points(&dataset, &query);
            if query.chart == "scatter" {
                RelationResponse::Scatter {
                    x: query.x,
                    y: query.y,
                    points,
                }
            } else {
                RelationResponse::Bar {
                    x: query.x,
                    y: query.y,
                    points,
                }
            }
        }
        "box" => {
            if !dataset.is_continuous(&query.y) {
                return Err(ApiError::BadRequest(format!(
                    "Box plots need a continuous y-axis; '{}' is categorical",
                    query.y
                )));
            }
            let xs = dataset.frame.column(&query.x).unwrap_or_default();
            let ys = dataset
                .frame
                .numeric_column(&query.y)
                .unwrap_or_default();
            RelationResponse::Box {
                x: query.x,
                y: query.y,
                groups: stats::box_groups(xs, &ys),
            }
        }
        other => {
            warn!(chart = %other, "Unknown relation chart type requested");
            return Err(ApiError::BadRequest(format!(
                "Unknown chart type '{}'; expected scatter, box, or bar",
                other
            )));
        }
    };

    Ok(Json(response))
}

/// GET /api/datasets/preview - First rows of the dataset
pub async fn get_preview(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<DatasetPreview>, ApiError> {
    let dataset = current_dataset(&state_lock, &authed).await?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PREVIEW_ROWS)
        .min(MAX_PREVIEW_ROWS);

    Ok(Json(DatasetPreview {
        columns: dataset.frame.names().to_vec(),
        rows: dataset.frame.head(limit),
        total_rows: dataset.frame.n_rows(),
    }))
}

/// DELETE /api/datasets - Drop the user's dataset
pub async fn delete_dataset(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if !state.datasets.remove(&authed.id).await {
        return Err(ApiError::NotFound("No dataset uploaded".to_string()));
    }

    info!(user_id = %authed.id, "Dataset removed");
    Ok(Json(json!({ "message": "Dataset removed" })))
}

// ---- Helper Functions ----

async fn current_dataset(
    state_lock: &Arc<RwLock<AppState>>,
    authed: &AuthedUser,
) -> Result<Arc<StoredDataset>, ApiError> {
    let state = state_lock.read().await.clone();
    state
        .datasets
        .get(&authed.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No dataset uploaded".to_string()))
}

fn overview_of(dataset: &StoredDataset) -> DatasetOverview {
    DatasetOverview {
        id: dataset.id.clone(),
        filename: dataset.filename.clone(),
        uploaded_at: dataset.uploaded_at.clone(),
        rows: dataset.frame.n_rows(),
        columns: dataset.frame.n_cols(),
        duplicates: dataset.frame.duplicate_row_count(),
        categorical: dataset.classes.categorical.clone(),
        continuous: dataset.classes.continuous.clone(),
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

fn paired_points(dataset: &StoredDataset, query: &RelationQuery) -> Vec<RelationPoint> {
    let xs = dataset.frame.column(&query.x).unwrap_or_default();
    let ys = dataset.frame.column(&query.y).unwrap_or_default();
    let colors = query
        .color
        .as_deref()
        .and_then(|c| dataset.frame.column(c));

    xs.iter()
        .zip(ys)
        .enumerate()
        .filter_map(|(row, (x, y))| {
            let (Some(x), Some(y)) = (x.as_deref(), y.as_deref()) else {
                return None;
            };
            Some(RelationPoint {
                x: x.to_string(),
                y: y.to_string(),
                color: colors.and_then(|c| c[row].clone()),
            })
        })
        .collect()
}
