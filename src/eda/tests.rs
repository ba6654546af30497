//! Tests for eda module
//!
//! These tests verify the dataframe and statistics layer:
//! - CSV parsing edge cases (quoting, ragged rows, encodings)
//! - Column classification
//! - Descriptive statistics, correlation, histograms, value counts

#[cfg(test)]
mod tests {
    use super::super::frame::{DataFrame, FrameError};
    use super::super::stats;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} to be close to {}",
            actual,
            expected
        );
    }

    // ---- CSV parsing ----

    #[test]
    fn test_parse_basic_csv() {
        let df = DataFrame::from_csv_str("a,b,c\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(df.names(), &["a", "b", "c"]);
        assert_eq!(df.n_rows(), 2);
        assert_eq!(df.n_cols(), 3);
        assert_eq!(
            df.column("b").unwrap(),
            &[Some("2".to_string()), Some("5".to_string())]
        );
    }

    #[test]
    fn test_parse_trims_header_names() {
        let df = DataFrame::from_csv_str(" age , name \n30,ann\n").unwrap();
        assert_eq!(df.names(), &["age", "name"]);
    }

    #[test]
    fn test_parse_empty_cells_are_missing() {
        let df = DataFrame::from_csv_str("a,b\n1,\n,2\n").unwrap();
        assert_eq!(df.column("a").unwrap(), &[Some("1".to_string()), None]);
        assert_eq!(df.column("b").unwrap(), &[None, Some("2".to_string())]);
    }

    #[test]
    fn test_parse_ragged_rows_padded_to_header() {
        let df = DataFrame::from_csv_str("a,b,c\n1,2\n1,2,3,4\n").unwrap();
        assert_eq!(df.n_cols(), 3);
        assert_eq!(df.column("c").unwrap()[0], None);
        // The fourth cell of the over-long row is dropped
        assert_eq!(df.column("c").unwrap()[1], Some("3".to_string()));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let df =
            DataFrame::from_csv_str("name,quote\nann,\"hello, world\"\nbob,\"say \"\"hi\"\"\"\n")
                .unwrap();
        assert_eq!(
            df.column("quote").unwrap(),
            &[
                Some("hello, world".to_string()),
                Some("say \"hi\"".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_quoted_field_with_embedded_newline() {
        let df = DataFrame::from_csv_str("a,b\n1,\"line1\nline2\"\n2,x\n")
            .expect("quoted field spanning a newline should parse");
        assert_eq!(df.n_rows(), 2);
        assert_eq!(
            df.column("b").unwrap(),
            &[Some("line1\nline2".to_string()), Some("x".to_string())]
        );
        assert_eq!(df.column("a").unwrap()[1], Some("2".to_string()));
    }

    #[test]
    fn test_parse_unterminated_quote_is_error() {
        let err = DataFrame::from_csv_str("a,b\n1,\"oops\n").unwrap_err();
        assert!(matches!(err, FrameError::MalformedRow(_)));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(
            DataFrame::from_csv_str(""),
            Err(FrameError::Empty)
        ));
        assert!(matches!(
            DataFrame::from_csv_str("  \n \n"),
            Err(FrameError::Empty)
        ));
    }

    #[test]
    fn test_parse_header_only_input() {
        assert!(matches!(
            DataFrame::from_csv_str("a,b,c\n"),
            Err(FrameError::NoDataRows)
        ));
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let df = DataFrame::from_csv_str("a,b\r\n1,2\r\n3,4\r\n").unwrap();
        assert_eq!(df.n_rows(), 2);
        assert_eq!(df.column("b").unwrap()[1], Some("4".to_string()));
    }

    #[test]
    fn test_latin1_fallback_for_invalid_utf8() {
        // "café" in Latin-1: the 0xE9 byte is invalid UTF-8
        let bytes = b"name\ncaf\xe9\n";
        let df = DataFrame::from_csv_bytes(bytes).unwrap();
        assert_eq!(df.column("name").unwrap()[0], Some("café".to_string()));
    }

    // ---- Column classification ----

    #[test]
    fn test_classify_numeric_high_cardinality_is_continuous() {
        let mut csv = String::from("x\n");
        for i in 0..30 {
            csv.push_str(&format!("{}.5\n", i));
        }
        let df = DataFrame::from_csv_str(&csv).unwrap();
        let classes = df.classify_columns();
        assert_eq!(classes.continuous, vec!["x"]);
        assert!(classes.categorical.is_empty());
    }

    #[test]
    fn test_classify_low_cardinality_numeric_is_categorical() {
        // 30 rows but only 3 distinct values
        let mut csv = String::from("x\n");
        for i in 0..30 {
            csv.push_str(&format!("{}\n", i % 3));
        }
        let df = DataFrame::from_csv_str(&csv).unwrap();
        let classes = df.classify_columns();
        assert_eq!(classes.categorical, vec!["x"]);
    }

    #[test]
    fn test_classify_text_is_categorical_even_with_many_values() {
        let mut csv = String::from("name\n");
        for i in 0..30 {
            csv.push_str(&format!("person{}\n", i));
        }
        let df = DataFrame::from_csv_str(&csv).unwrap();
        let classes = df.classify_columns();
        assert_eq!(classes.categorical, vec!["name"]);
    }

    #[test]
    fn test_classify_mixed_dataset_preserves_column_order() {
        let mut csv = String::from("id,grade,score\n");
        for i in 0..40 {
            csv.push_str(&format!("{},{},{}.25\n", i, ["a", "b"][i % 2], i * 2));
        }
        let df = DataFrame::from_csv_str(&csv).unwrap();
        let classes = df.classify_columns();
        assert_eq!(classes.continuous, vec!["id", "score"]);
        assert_eq!(classes.categorical, vec!["grade"]);
    }

    // ---- Duplicates ----

    #[test]
    fn test_duplicate_row_count() {
        let df = DataFrame::from_csv_str("a,b\n1,2\n1,2\n3,4\n1,2\n").unwrap();
        assert_eq!(df.duplicate_row_count(), 2);
    }

    #[test]
    fn test_duplicate_rows_with_missing_cells_compare_equal() {
        let df = DataFrame::from_csv_str("a,b\n1,\n1,\n").unwrap();
        assert_eq!(df.duplicate_row_count(), 1);
    }

    // ---- Descriptive statistics ----

    #[test]
    fn test_mean_and_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(stats::mean(&values).unwrap(), 5.0);
        // Sample variance: 32 / 7
        assert_close(stats::sample_std(&values).unwrap(), (32.0f64 / 7.0).sqrt());
    }

    #[test]
    fn test_std_undefined_below_two_values() {
        assert_eq!(stats::sample_std(&[1.0]), None);
        assert_eq!(stats::sample_std(&[]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_close(stats::quantile(&sorted, 0.25).unwrap(), 1.75);
        assert_close(stats::quantile(&sorted, 0.5).unwrap(), 2.5);
        assert_close(stats::quantile(&sorted, 0.75).unwrap(), 3.25);
        assert_close(stats::quantile(&sorted, 0.0).unwrap(), 1.0);
        assert_close(stats::quantile(&sorted, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_describe_summary() {
        let d = stats::describe(&[3.0, 1.0, 2.0, 4.0]);
        assert_eq!(d.count, 4);
        assert_close(d.mean.unwrap(), 2.5);
        assert_close(d.min.unwrap(), 1.0);
        assert_close(d.max.unwrap(), 4.0);
        assert_close(d.q50.unwrap(), 2.5);
    }

    #[test]
    fn test_describe_empty_column() {
        let d = stats::describe(&[]);
        assert_eq!(d.count, 0);
        assert!(d.mean.is_none());
        assert!(d.min.is_none());
    }

    // ---- Correlation ----

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let ys: Vec<Option<f64>> = (0..10).map(|i| Some(2.0 * i as f64 + 1.0)).collect();
        assert_close(stats::pearson(&xs, &ys).unwrap(), 1.0);

        let neg: Vec<Option<f64>> = (0..10).map(|i| Some(-(i as f64))).collect();
        assert_close(stats::pearson(&xs, &neg).unwrap(), -1.0);
    }

    #[test]
    fn test_pearson_zero_variance_is_undefined() {
        let xs: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64)).collect();
        let constant: Vec<Option<f64>> = (0..5).map(|_| Some(3.0)).collect();
        assert_eq!(stats::pearson(&xs, &constant), None);
    }

    #[test]
    fn test_pearson_skips_incomplete_pairs() {
        let xs = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let ys = vec![Some(2.0), Some(9.0), None, Some(6.0)];
        // Only rows 0 and 3 are complete: (1,2) and (3,6), perfectly correlated
        assert_close(stats::pearson(&xs, &ys).unwrap(), 1.0);
    }

    #[test]
    fn test_pearson_needs_two_complete_pairs() {
        let xs = vec![Some(1.0), None];
        let ys = vec![Some(2.0), Some(3.0)];
        assert_eq!(stats::pearson(&xs, &ys), None);
    }

    #[test]
    fn test_correlation_matrix_diagonal_and_symmetry() {
        let mut csv = String::from("x,y\n");
        for i in 0..30 {
            csv.push_str(&format!("{}.0,{}.0\n", i, 60 - i));
        }
        let df = DataFrame::from_csv_str(&csv).unwrap();
        let columns = vec!["x".to_string(), "y".to_string()];
        let matrix = stats::correlation_matrix(&df, &columns);

        assert_close(matrix[0][0].unwrap(), 1.0);
        assert_close(matrix[1][1].unwrap(), 1.0);
        assert_close(matrix[0][1].unwrap(), -1.0);
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    // ---- Histogram ----

    #[test]
    fn test_histogram_counts_cover_all_values() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let bins = stats::histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_close(bins[0].start, 0.0);
        assert_close(bins[4].end, 9.9);
    }

    #[test]
    fn test_histogram_maximum_lands_in_last_bin() {
        let bins = stats::histogram(&[0.0, 5.0, 10.0], 2);
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn test_histogram_constant_column_single_bin() {
        let bins = stats::histogram(&[7.0, 7.0, 7.0], 50);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_histogram_empty_input() {
        assert!(stats::histogram(&[], 50).is_empty());
    }

    // ---- Value counts ----

    #[test]
    fn test_value_counts_first_seen_order() {
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
        ];
        let counts = stats::value_counts(&values, "(missing)");
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 3),
                ("a".to_string(), 2),
                ("(missing)".to_string(), 1),
            ]
        );
    }

    // ---- Box groups ----

    #[test]
    fn test_box_groups_per_label_summaries() {
        let xs = vec![
            Some("a".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            Some("a".to_string()),
            Some("a".to_string()),
            None,
        ];
        let ys = vec![
            Some(1.0),
            Some(3.0),
            Some(10.0),
            Some(2.0),
            Some(4.0),
            Some(99.0),
        ];
        let groups = stats::box_groups(&xs, &ys);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "a");
        assert_eq!(groups[0].count, 4);
        assert_close(groups[0].min, 1.0);
        assert_close(groups[0].median, 2.5);
        assert_close(groups[0].max, 4.0);

        assert_eq!(groups[1].label, "b");
        assert_eq!(groups[1].count, 1);
        assert_close(groups[1].median, 10.0);
    }

    #[test]
    fn test_box_groups_skip_missing_values() {
        let xs = vec![Some("a".to_string()), Some("a".to_string())];
        let ys = vec![Some(5.0), None];
        let groups = stats::box_groups(&xs, &ys);
        assert_eq!(groups[0].count, 1);
    }
}
