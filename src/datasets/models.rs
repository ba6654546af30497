// src/datasets/models.rs
//! Response models for the dataset endpoints.

use serde::{Deserialize, Serialize};

use crate::eda::stats::{BoxGroup, HistogramBin};

/// Shape and column classification of the uploaded dataset.
#[derive(Debug, Serialize)]
pub struct DatasetOverview {
    pub id: String,
    pub filename: String,
    pub uploaded_at: String,
    pub rows: usize,
    pub columns: usize,
    pub duplicates: usize,
    pub categorical: Vec<String>,
    pub continuous: Vec<String>,
}

/// Pearson correlation matrix over the continuous columns.
/// `matrix[i][j]` correlates `columns[i]` with `columns[j]`; undefined
/// entries (zero variance, too few complete pairs) are null.
#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Serialize)]
pub struct ColumnMissing {
    pub name: String,
    pub missing: usize,
    pub present: usize,
    pub percent_missing: f64,
}

#[derive(Debug, Serialize)]
pub struct MissingSummary {
    pub rows: usize,
    pub columns: Vec<ColumnMissing>,
}

/// Descriptive statistics plus histogram for one continuous column.
#[derive(Debug, Serialize)]
pub struct ContinuousSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub percent_missing: f64,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Occurrence counts for one categorical column, in first-seen order.
#[derive(Debug, Serialize)]
pub struct ValueCountsResponse {
    pub column: String,
    pub counts: Vec<ValueCount>,
}

/// Query parameters for the feature-relation endpoint.
#[derive(Debug, Deserialize)]
pub struct RelationQuery {
    pub chart: String,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelationPoint {
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Chart-ready relation data: raw pairs for scatter/bar, per-group summaries
/// for box plots.
#[derive(Debug, Serialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum RelationResponse {
    Scatter {
        x: String,
        y: String,
        points: Vec<RelationPoint>,
    },
    Bar {
        x: String,
        y: String,
        points: Vec<RelationPoint>,
    },
    Box {
        x: String,
        y: String,
        groups: Vec<BoxGroup>,
    },
}

/// Bounded row preview of the uploaded dataset.
#[derive(Debug, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub total_rows: usize,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}
