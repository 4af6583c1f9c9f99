//! Integration tests for the resolution pipeline.
//!
//! These tests run the full producer → worker pool → sink path with the real
//! HTTP retriever against a mock handle API.

use std::sync::Arc;
use std::time::Duration;

use handlefetch::{
    HttpClient, HttpRetriever, Pipeline, PipelineConfig, PipelineError, RetryPolicy, RunSummary,
};
use tokio::io::{AsyncReadExt, BufReader};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==================== Helper Functions ====================

/// Helper to create a retriever with fast, short retry settings.
fn fast_retriever() -> Result<Arc<HttpRetriever>, Box<dyn std::error::Error>> {
    let policy = RetryPolicy::new(
        2,
        Duration::from_millis(5),
        Duration::from_millis(20),
        2.0,
    );
    Ok(Arc::new(HttpRetriever::new(HttpClient::new()?, policy)))
}

fn url_record(value: &str) -> serde_json::Value {
    serde_json::json!({
        "responseCode": 1,
        "handle": "10.1/x",
        "values": [
            {"index": 1, "type": "URL", "data": {"format": "string", "value": value}, "ttl": 86400, "timestamp": "2020-01-01T00:00:00Z"}
        ]
    })
}

/// Runs a pipeline over `input` and returns the summary plus the output lines.
async fn run_pipeline(
    server: &MockServer,
    workers: usize,
    input: String,
) -> Result<(RunSummary, Vec<String>), Box<dyn std::error::Error>> {
    let prefix = format!("{}/api/handles", server.uri());
    let pipeline = Pipeline::new(PipelineConfig::new(workers)?, fast_retriever()?, prefix);

    let (writer, mut reader) = tokio::io::duplex(1 << 20);
    let summary = pipeline
        .run(BufReader::new(input.as_bytes()), writer)
        .await?;

    let mut output = String::new();
    reader.read_to_string(&mut output).await?;
    Ok((summary, output.lines().map(str::to_string).collect()))
}

// ==================== Counting Invariant Tests ====================

#[tokio::test]
async fn test_pipeline_one_line_per_target_for_any_worker_count()
-> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/handles/10\.1/\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(url_record("http://example.org/x"))
                .set_delay(Duration::from_millis(3)),
        )
        .mount(&server)
        .await;

    let mut input = String::new();
    for i in 0..50 {
        input.push_str(&format!("10.1/{i}\n"));
        if i % 10 == 0 {
            input.push('\n');
        }
    }

    for workers in [1, 2, 8, 64] {
        let (summary, lines) = run_pipeline(&server, workers, input.clone()).await?;
        assert_eq!(lines.len(), 50, "workers = {workers}");
        assert_eq!(summary.emitted, 50);
        assert_eq!(summary.succeeded, 50);

        let mut urls: Vec<&str> = lines
            .iter()
            .map(|line| line.split('\t').nth(3).unwrap_or_default())
            .collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), 50, "each target exactly once, workers = {workers}");
    }
    Ok(())
}

#[tokio::test]
async fn test_pipeline_failures_still_produce_lines() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/handles/10.1/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(url_record("http://example.org/ok")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/handles/10.1/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/handles/10.1/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{{{"))
        .mount(&server)
        .await;

    let input = "10.1/ok\n10.1/missing\n10.1/garbled\n".to_string();
    let (summary, lines) = run_pipeline(&server, 3, input).await?;

    assert_eq!(lines.len(), 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);

    let find = |suffix: &str| {
        lines
            .iter()
            .find(|line| line.contains(&format!("/api/handles/10.1/{suffix}\t")))
            .cloned()
            .unwrap_or_default()
    };
    assert!(find("ok").starts_with("200 OK\t"));
    assert!(find("ok").ends_with("\thttp://example.org/ok\t"));
    assert!(find("missing").starts_with("404 Not Found\t"));
    assert!(find("missing").ends_with("\tNOT_AVAILABLE\t"));
    assert!(find("garbled").starts_with("E_JSON\t"));
    Ok(())
}

// ==================== Normalization Tests ====================

#[tokio::test]
async fn test_pipeline_prefixed_and_bare_lines_hit_same_address()
-> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/handles/10.1/182"))
        .respond_with(ResponseTemplate::new(200).set_body_json(url_record("http://example.org/x")))
        .expect(2)
        .mount(&server)
        .await;

    let input = format!("10.1/182\n{}/api/handles/10.1/182\n", server.uri());
    let (summary, lines) = run_pipeline(&server, 2, input).await?;

    assert_eq!(summary.submitted, 2);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].split('\t').nth(3), lines[1].split('\t').nth(3));
    Ok(())
}

// ==================== Shutdown Tests ====================

#[tokio::test]
async fn test_pipeline_waits_for_slow_in_flight_targets() -> Result<(), Box<dyn std::error::Error>>
{
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(url_record("http://example.org/slow"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    // Input ends long before the responses arrive.
    let (summary, lines) = run_pipeline(&server, 4, "a/1\na/2\na/3\na/4\n".to_string()).await?;
    assert_eq!(summary.emitted, 4);
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| line.starts_with("200 OK\t")));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_invalid_worker_count_rejected() {
    assert!(matches!(
        PipelineConfig::new(0),
        Err(PipelineError::InvalidWorkers { value: 0 })
    ));
}
