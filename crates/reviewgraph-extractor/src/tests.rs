//! Integration tests for the extraction pipeline

#[cfg(test)]
mod tests {
    use crate::{status, ExtractorConfig, ExtractorError, Pipeline, Shard};
    use reviewgraph_domain::ExtractionResult;
    use reviewgraph_gatekeeper::Gatekeeper;
    use reviewgraph_llm::MockBackend;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    const VALID: &str =
        r#"{"triples": [{"subject": "user", "predicate": "praises", "object": "faux_nails"}]}"#;

    fn test_config(concurrency: usize) -> ExtractorConfig {
        ExtractorConfig {
            concurrency,
            retry_backoff_ms: 1,
            ..ExtractorConfig::default()
        }
    }

    /// Writes a dataset with one review per text, spread over two users
    fn write_dataset(dir: &TempDir, texts: &[&str]) -> PathBuf {
        let reviews: Vec<serde_json::Value> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                serde_json::json!({
                    "pid": format!("P{}", i + 1),
                    "rating": 4.0,
                    "title": "Review",
                    "text": text,
                })
            })
            .collect();
        let split = reviews.len().div_ceil(2);
        let doc = serde_json::json!([
            {"id": "A1", "profile": &reviews[..split]},
            {"id": "A2", "profile": &reviews[split..]},
        ]);

        let path = dir.path().join("reviews.json");
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        path
    }

    fn read_results(path: &Path) -> Vec<ExtractionResult> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    fn sorted_indices(path: &Path) -> Vec<u64> {
        let mut indices: Vec<u64> = read_results(path).iter().map(|r| r.index()).collect();
        indices.sort_unstable();
        indices
    }

    #[tokio::test]
    async fn test_end_to_end_two_users() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["Love the faux nails", "the faux nails broke"]);
        let output = dir.path().join("output").join("reviews_output.jsonl");

        let backend = MockBackend::new(VALID);
        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(1));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.triples_written, 2);
        assert_eq!(backend.shutdown_count(), 1);

        let results = read_results(&output);
        assert_eq!(results.len(), 2);
        assert_eq!(sorted_indices(&output), vec![1, 2]);
        assert_eq!(results[0].review.user_id, "A1");
        assert_eq!(results[0].triples[0].object, "faux_nails");
    }

    #[tokio::test]
    async fn test_retry_until_valid_on_tenth_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["Love the faux nails"]);
        let output = dir.path().join("out.jsonl");

        let mut backend = MockBackend::default();
        let mut replies = vec!["not json at all"; 9];
        replies.push(VALID);
        backend.add_sequence("Text: Love the faux nails", replies);

        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(1));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(backend.calls_for("Text: Love the faux nails"), 10);
        assert_eq!(read_results(&output).len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_record_is_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["first nails", "second nails", "third nails"]);
        let output = dir.path().join("out.jsonl");

        let mut backend = MockBackend::new(VALID);
        backend.add_response("Text: third nails", "definitely not json");

        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(2));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.exhausted, 1);
        assert_eq!(backend.calls_for("Text: third nails"), 10);
        assert_eq!(sorted_indices(&output), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_resume_skips_completed_and_torn_lines_are_retried() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["one nails", "two nails", "three nails", "four nails"]);
        let output = dir.path().join("out.jsonl");

        // A previous run finished record 1 and died while writing record 2
        std::fs::write(
            &output,
            concat!(
                r#"{"idx": 1, "user_id": "A1", "product_id": "P1", "rating": 4.0, "#,
                r#""title": "Review", "text": "one nails", "triples": []}"#,
                "\n",
                r#"{"idx": 2, "user_id": "A1", "prod"#,
            ),
        )
        .unwrap();

        let backend = MockBackend::new(VALID);
        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(2));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.skipped_completed, 1);
        assert_eq!(summary.attempted, 3);
        assert_eq!(backend.calls_for("Text: one nails"), 0);
        assert_eq!(backend.calls_for("Text: two nails"), 1);
        assert_eq!(sorted_indices(&output), vec![1, 2, 3, 4]);

        // A second resume has nothing left to do
        let again = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(2));
        let summary = again.run(&source, &output).await.unwrap();
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.skipped_completed, 4);
        assert_eq!(sorted_indices(&output), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let texts: Vec<String> = (1..=12).map(|i| format!("review {} nails", i)).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let source = write_dataset(&dir, &text_refs);
        let output = dir.path().join("out.jsonl");

        let backend = MockBackend::new(VALID).with_latency(Duration::from_millis(20));
        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(3));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.succeeded, 12);
        assert!(backend.max_in_flight() <= 3);
        assert!(backend.max_in_flight() >= 2);
        assert_eq!(read_results(&output).len(), 12);
    }

    #[tokio::test]
    async fn test_shape_failures_are_retried() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["bare nails", "keyless nails", "failing nails"]);
        let output = dir.path().join("out.jsonl");

        let mut backend = MockBackend::new(VALID);
        backend.add_sequence(
            "Text: bare nails",
            [r#"[{"subject": "user", "predicate": "likes", "object": "nails"}]"#, VALID],
        );
        backend.add_sequence("Text: keyless nails", [r#"{"entities": []}"#, VALID]);
        backend.add_error("Text: failing nails");

        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(1));
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(backend.calls_for("Text: bare nails"), 2);
        assert_eq!(backend.calls_for("Text: keyless nails"), 2);
        assert_eq!(backend.calls_for("Text: failing nails"), 10);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.exhausted, 1);
    }

    #[tokio::test]
    async fn test_repairs_and_filters_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["The faux nails look cute"]);
        let output = dir.path().join("out.jsonl");

        let reply = r#"{"triples": [
            {"subject": "user", "likes": "faux_nails"},
            {"subject": "user", "predicate": "predicate", "object": "nails"},
            {"subject": "rocket", "predicate": "is", "object": "spaceship"},
            {"subject": "User", "predicate": "Likes", "object": "Faux_Nails"}
        ]}"#;
        let backend = MockBackend::new(reply);
        let pipeline = Pipeline::new(backend, Gatekeeper::default_config(), test_config(1));
        pipeline.run(&source, &output).await.unwrap();

        let results = read_results(&output);
        assert_eq!(results.len(), 1);
        let triples = &results[0].triples;
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].predicate, "likes");
        assert_eq!(triples[0].object, "faux_nails");
    }

    #[tokio::test]
    async fn test_shard_processes_only_its_records() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["a nails", "b nails", "c nails", "d nails", "e nails"]);
        let output = dir.path().join("out_split_1.jsonl");

        let config = ExtractorConfig {
            shard: Some(Shard { count: 2, id: 1 }),
            ..test_config(2)
        };
        let backend = MockBackend::new(VALID);
        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), config);
        let summary = pipeline.run(&source, &output).await.unwrap();

        assert_eq!(summary.skipped_other_shard, 3);
        assert_eq!(backend.call_count(), 2);
        assert_eq!(sorted_indices(&output), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_malformed_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("reviews.json");
        std::fs::write(&source, r#"[{"id": "A1"}]"#).unwrap();
        let output = dir.path().join("out.jsonl");

        let backend = MockBackend::new(VALID);
        let pipeline = Pipeline::new(backend.clone(), Gatekeeper::default_config(), test_config(1));
        let result = pipeline.run(&source, &output).await;

        assert!(matches!(result, Err(ExtractorError::DataFormat { .. })));
        assert_eq!(backend.call_count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_review_fields_are_written_back_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("reviews.json");
        std::fs::write(
            &source,
            r#"[{"id": 42, "profile": [
                {"pid": "P1", "rating": 5, "title": null, "text": "Love the faux nails"}
            ]}]"#,
        )
        .unwrap();
        let output = dir.path().join("out.jsonl");

        let backend = MockBackend::new(VALID);
        let pipeline = Pipeline::new(backend, Gatekeeper::default_config(), test_config(1));
        let summary = pipeline.run(&source, &output).await.unwrap();
        assert_eq!(summary.succeeded, 1);

        let line = std::fs::read_to_string(&output).unwrap();
        assert!(line.starts_with(r#"{"idx":1,"user_id":42,"product_id":"P1","rating":5,"title":null,"#));
        assert_eq!(read_results(&output)[0].triples.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["nails"]);
        let output = dir.path().join("out.jsonl");

        let pipeline = Pipeline::new(MockBackend::default(), Gatekeeper::default_config(), test_config(0));
        let result = pipeline.run(&source, &output).await;
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_status_counts_progress() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_dataset(&dir, &["one nails", "two nails", "three nails"]);
        let output = dir.path().join("out.jsonl");

        let mut backend = MockBackend::new(VALID);
        backend.add_error("Text: two nails");
        let pipeline = Pipeline::new(backend, Gatekeeper::default_config(), test_config(1));
        pipeline.run(&source, &output).await.unwrap();

        let report = status(&source, &output, None).await.unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.triples, 2);
        assert_eq!(report.unparsable_lines, 0);

        let fresh = status(&source, &dir.path().join("none.jsonl"), None).await.unwrap();
        assert_eq!(fresh.remaining, 3);
    }
}
