//! Tests for datasets module
//!
//! These tests verify:
//! - The per-user in-memory dataset store
//! - Handler behavior for the EDA endpoints, including the error paths
//!   (missing dataset, unknown columns, wrong column kind, unknown chart)

#[cfg(test)]
mod tests {
    use super::super::handlers;
    use super::super::models::RelationQuery;
    use super::super::store::{DatasetStore, StoredDataset};
    use axum::extract::{Extension, Path, Query};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::AuthedUser;
    use crate::common::{generate_dataset_id, ApiError, AppState};
    use crate::eda::DataFrame;
    use crate::services::google::GoogleService;

    fn sample_dataset(filename: &str, csv: &str) -> StoredDataset {
        let frame = DataFrame::from_csv_str(csv).unwrap();
        let classes = frame.classify_columns();
        StoredDataset {
            id: generate_dataset_id(),
            filename: filename.to_string(),
            uploaded_at: chrono::Utc::now().to_rfc3339(),
            frame,
            classes,
        }
    }

    /// 30 rows with a continuous `score` column and a categorical `grade`
    /// column.
    fn grades_csv() -> String {
        let mut csv = String::from("score,grade\n");
        for i in 0..30 {
            csv.push_str(&format!("{}.5,{}\n", i, ["a", "b"][i % 2]));
        }
        csv
    }

    async fn test_state() -> Arc<RwLock<AppState>> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        Arc::new(RwLock::new(AppState {
            db: pool,
            jwt_secret: "test_secret_key".to_string(),
            google_service: Arc::new(GoogleService::new(None, None, reqwest::Client::new())),
            datasets: DatasetStore::new(),
        }))
    }

    /// State with the grades dataset already uploaded for the given user.
    async fn seeded_state(user_id: &str) -> Arc<RwLock<AppState>> {
        let state = test_state().await;
        let dataset = sample_dataset("grades.csv", &grades_csv());
        state.read().await.datasets.put(user_id, dataset).await;
        state
    }

    fn authed(user_id: &str) -> AuthedUser {
        AuthedUser {
            id: user_id.to_string(),
            email: "user@example.com".to_string(),
        }
    }

    // ---- Store ----

    #[tokio::test]
    async fn test_store_put_and_get() {
        let store = DatasetStore::new();
        assert!(store.get("U_AAAAAA").await.is_none());

        let dataset = sample_dataset("iris.csv", "species,petal\nsetosa,1.4\nvirginica,5.1\n");
        store.put("U_AAAAAA", dataset).await;

        let stored = store.get("U_AAAAAA").await.unwrap();
        assert_eq!(stored.filename, "iris.csv");
        assert_eq!(stored.frame.n_rows(), 2);
    }

    #[tokio::test]
    async fn test_store_is_per_user() {
        let store = DatasetStore::new();
        store
            .put("U_AAAAAA", sample_dataset("a.csv", "x\n1\n"))
            .await;

        assert!(store.get("U_AAAAAA").await.is_some());
        assert!(store.get("U_BBBBBB").await.is_none());
    }

    #[tokio::test]
    async fn test_store_upload_replaces_previous_dataset() {
        let store = DatasetStore::new();
        store
            .put("U_AAAAAA", sample_dataset("first.csv", "x\n1\n"))
            .await;
        store
            .put("U_AAAAAA", sample_dataset("second.csv", "x\n1\n2\n"))
            .await;

        let stored = store.get("U_AAAAAA").await.unwrap();
        assert_eq!(stored.filename, "second.csv");
        assert_eq!(stored.frame.n_rows(), 2);
    }

    #[tokio::test]
    async fn test_store_remove() {
        let store = DatasetStore::new();
        store
            .put("U_AAAAAA", sample_dataset("a.csv", "x\n1\n"))
            .await;

        assert!(store.remove("U_AAAAAA").await);
        assert!(store.get("U_AAAAAA").await.is_none());
        // Removing again reports nothing was there
        assert!(!store.remove("U_AAAAAA").await);
    }

    #[test]
    fn test_stored_dataset_column_kinds() {
        let dataset = sample_dataset("grades.csv", &grades_csv());

        assert!(dataset.is_continuous("score"));
        assert!(!dataset.is_categorical("score"));
        assert!(dataset.is_categorical("grade"));
        assert!(!dataset.is_continuous("grade"));
        assert!(!dataset.is_continuous("unknown"));
    }

    // ---- Handlers ----

    #[tokio::test]
    async fn test_endpoints_require_uploaded_dataset() {
        let state = test_state().await;

        let result = handlers::get_overview(Extension(state), authed("U_AAAAAA")).await;

        match result {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "No dataset uploaded"),
            _ => panic!("Expected not found error"),
        }
    }

    #[tokio::test]
    async fn test_overview_reports_shape_and_column_kinds() {
        let state = seeded_state("U_AAAAAA").await;

        let overview = handlers::get_overview(Extension(state), authed("U_AAAAAA"))
            .await
            .expect("Overview failed")
            .0;

        assert_eq!(overview.rows, 30);
        assert_eq!(overview.columns, 2);
        assert_eq!(overview.duplicates, 0);
        assert_eq!(overview.continuous, vec!["score"]);
        assert_eq!(overview.categorical, vec!["grade"]);
    }

    #[tokio::test]
    async fn test_column_summary_for_unknown_column_is_not_found() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_column_summary(
            Extension(state),
            authed("U_AAAAAA"),
            Path("height".to_string()),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_column_summary_rejects_categorical_column() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_column_summary(
            Extension(state),
            authed("U_AAAAAA"),
            Path("grade".to_string()),
        )
        .await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("grade")),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_column_summary_reports_statistics() {
        let state = seeded_state("U_AAAAAA").await;

        let summary = handlers::get_column_summary(
            Extension(state),
            authed("U_AAAAAA"),
            Path("score".to_string()),
        )
        .await
        .expect("Summary failed")
        .0;

        assert_eq!(summary.column, "score");
        assert_eq!(summary.count, 30);
        assert_eq!(summary.missing, 0);
        assert_eq!(summary.min, Some(0.5));
        assert_eq!(summary.max, Some(29.5));
    }

    #[tokio::test]
    async fn test_column_counts_reject_continuous_column() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_column_counts(
            Extension(state),
            authed("U_AAAAAA"),
            Path("score".to_string()),
        )
        .await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("score")),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_column_counts_for_categorical_column() {
        let state = seeded_state("U_AAAAAA").await;

        let counts = handlers::get_column_counts(
            Extension(state),
            authed("U_AAAAAA"),
            Path("grade".to_string()),
        )
        .await
        .expect("Counts failed")
        .0;

        assert_eq!(counts.column, "grade");
        assert_eq!(counts.counts.len(), 2);
        assert_eq!(counts.counts[0].value, "a");
        assert_eq!(counts.counts[0].count, 15);
    }

    #[tokio::test]
    async fn test_relation_rejects_unknown_chart_kind() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_relation(
            Extension(state),
            authed("U_AAAAAA"),
            Query(RelationQuery {
                chart: "pie".to_string(),
                x: "grade".to_string(),
                y: "score".to_string(),
                color: None,
            }),
        )
        .await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("pie")),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_relation_rejects_unknown_column() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_relation(
            Extension(state),
            authed("U_AAAAAA"),
            Query(RelationQuery {
                chart: "scatter".to_string(),
                x: "height".to_string(),
                y: "score".to_string(),
                color: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_box_relation_needs_continuous_y_axis() {
        let state = seeded_state("U_AAAAAA").await;

        let result = handlers::get_relation(
            Extension(state),
            authed("U_AAAAAA"),
            Query(RelationQuery {
                chart: "box".to_string(),
                x: "score".to_string(),
                y: "grade".to_string(),
                color: None,
            }),
        )
        .await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("grade")),
            _ => panic!("Expected bad request error"),
        }
    }

    #[tokio::test]
    async fn test_delete_without_dataset_is_not_found() {
        let state = test_state().await;

        let result = handlers::delete_dataset(Extension(state), authed("U_AAAAAA")).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
