// src/datasets/store.rs
//! In-memory per-user dataset store.
//!
//! The application persists nothing but user records; uploaded datasets live
//! in process memory for the duration of the session, one dataset per user.
//! Uploading again replaces the previous dataset.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::eda::{ColumnClasses, DataFrame};

/// A parsed upload together with its classification, ready to serve stats.
#[derive(Debug)]
pub struct StoredDataset {
    pub id: String,
    pub filename: String,
    pub uploaded_at: String,
    pub frame: DataFrame,
    pub classes: ColumnClasses,
}

impl StoredDataset {
    pub fn is_continuous(&self, column: &str) -> bool {
        self.classes.continuous.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.classes.categorical.iter().any(|c| c == column)
    }
}

/// Shared handle to the per-user dataset map.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    inner: Arc<RwLock<HashMap<String, Arc<StoredDataset>>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the user's dataset, replacing any previous one.
    pub async fn put(&self, user_id: &str, dataset: StoredDataset) -> Arc<StoredDataset> {
        let dataset = Arc::new(dataset);
        self.inner
            .write()
            .await
            .insert(user_id.to_string(), dataset.clone());
        dataset
    }

    pub async fn get(&self, user_id: &str) -> Option<Arc<StoredDataset>> {
        self.inner.read().await.get(user_id).cloned()
    }

    /// Drop the user's dataset. Returns whether one existed.
    pub async fn remove(&self, user_id: &str) -> bool {
        self.inner.write().await.remove(user_id).is_some()
    }
}
