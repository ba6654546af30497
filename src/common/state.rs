// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::datasets::DatasetStore;
use crate::services::google::GoogleService;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub google_service: Arc<GoogleService>,
    pub datasets: DatasetStore,
}
