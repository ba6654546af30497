// src/datasets/mod.rs
//! # Datasets Module
//!
//! CSV upload and the EDA endpoints served from the uploaded dataset:
//! - Dataset overview (shape, duplicates, column classification)
//! - Correlation matrix over continuous columns
//! - Missing-value distribution
//! - Per-column summaries, value counts, and histograms
//! - Feature-relation data for scatter/box/bar charts

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

#[cfg(test)]
mod tests;

pub use routes::datasets_routes;
pub use store::DatasetStore;
