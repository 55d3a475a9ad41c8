//! One entity's failure never disturbs another.

use crate::test_utils::*;
use nimbus::{FailureKind, FetchError, MemorySource, SearchConfig, SearchPhase};
use std::sync::Arc;
use std::time::Duration;

fn three_entities(
    volumes: MemorySource,
    vpcs: MemorySource,
    config: SearchConfig,
) -> (nimbus::SearchOrchestrator, [Arc<MemorySource>; 3]) {
    let linodes = Arc::new(MemorySource::new(numbered("web", 3)));
    let volumes = Arc::new(volumes);
    let vpcs = Arc::new(vpcs);
    let search = orchestrator(
        vec![
            descriptor("Linode", tagged_schema(), &linodes),
            descriptor("Volume", tagged_schema(), &volumes),
            descriptor("VPC", label_schema(), &vpcs),
        ],
        config,
    );
    (search, [linodes, volumes, vpcs])
}

#[tokio::test]
async fn test_mixed_failures_are_reported_separately() {
    let (search, _) = three_entities(
        MemorySource::failing(FetchError::api("Volume service unavailable")),
        MemorySource::new(numbered("web", 1)),
        SearchConfig::default(),
    );

    // VPC has no `tags`, so the tag clause excludes it before any request
    let output = search.search("tag:prod web").await.unwrap();

    assert_eq!(output.phase, SearchPhase::Settled);
    let errors = output.entity_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].entity, "VPC");
    assert_eq!(errors[0].kind, FailureKind::Unsupported);
    assert_eq!(errors[1].entity, "Volume");
    assert_eq!(errors[1].kind, FailureKind::Fetch);
    assert_eq!(errors[1].reason, "Volume service unavailable");
    assert_eq!(output.searched_entities, vec!["Linode".to_string()]);
}

#[tokio::test]
async fn test_failure_does_not_drop_other_results() {
    let (search, sources) = three_entities(
        MemorySource::failing(FetchError::network("connection refused")),
        MemorySource::new(numbered("web-vpc", 2)),
        SearchConfig::default(),
    );

    let output = search.search("web").await.unwrap();

    assert_eq!(output.results.len(), 5);
    assert_eq!(output.fetch_failures.len(), 1);
    assert_eq!(output.fetch_failures[0].0, "Volume");
    assert!(sources.iter().all(|source| source.request_count() == 1));
}

#[tokio::test]
async fn test_all_failed_is_not_an_empty_result() {
    let linodes = Arc::new(MemorySource::failing(FetchError::network("down")));
    let volumes = Arc::new(MemorySource::failing(FetchError::api("down")));
    let search = orchestrator(
        vec![
            descriptor("Linode", tagged_schema(), &linodes),
            descriptor("Volume", tagged_schema(), &volumes),
        ],
        SearchConfig::default(),
    );

    let output = search.search("web").await.unwrap();

    assert!(output.results.is_empty());
    assert_eq!(output.fetch_failures.len(), 2);
    assert!(!output.is_empty_result());
}

#[tokio::test]
async fn test_nothing_matched_is_an_empty_result() {
    let (search, _) = three_entities(
        MemorySource::new(numbered("data", 2)),
        MemorySource::new(numbered("net", 2)),
        SearchConfig::default(),
    );

    let output = search.search("zzz").await.unwrap();

    assert!(output.results.is_empty());
    assert!(output.entity_errors().is_empty());
    assert!(output.is_empty_result());
}

#[tokio::test]
async fn test_every_entity_unsupported() {
    let (search, sources) = three_entities(
        MemorySource::new(numbered("web", 1)),
        MemorySource::new(numbered("web", 1)),
        SearchConfig::default(),
    );

    let output = search.search("engine:mysql").await.unwrap();

    assert_eq!(output.phase, SearchPhase::Settled);
    assert_eq!(output.unsupported.len(), 3);
    assert!(output.unsupported.iter().all(|(_, err)| err.field == "engine"));
    assert!(output.searched_entities.is_empty());
    assert!(!output.is_empty_result());
    assert!(sources.iter().all(|source| source.request_count() == 0));
}

#[tokio::test(start_paused = true)]
async fn test_slow_entity_times_out_alone() {
    let config = SearchConfig {
        fetch_timeout_ms: Some(1_000),
        ..SearchConfig::default()
    };
    let (search, _) = three_entities(
        MemorySource::new(numbered("web", 2)).with_delay(Duration::from_secs(30)),
        MemorySource::new(numbered("web", 1)),
        config,
    );

    let output = search.search("web").await.unwrap();

    assert_eq!(
        output.fetch_failures,
        vec![("Volume".to_string(), FetchError::Timeout(1_000))]
    );
    assert_eq!(output.results.len(), 4);
}

#[tokio::test]
async fn test_refresh_retries_failed_entity() {
    let (search, sources) = three_entities(
        MemorySource::failing(FetchError::network("blip")),
        MemorySource::new(numbered("web", 1)),
        SearchConfig::default(),
    );
    let first = search.search("web").await.unwrap();
    assert_eq!(first.fetch_failures.len(), 1);

    sources[1].recover();
    sources[1].push(serde_json::json!({"id": 99, "label": "web-vol", "tags": []}));
    let generation = search.refresh().unwrap();
    assert!(generation.is_some());
    search.settled().await;

    let output = search.output();
    assert!(output.fetch_failures.is_empty());
    assert!(output
        .results
        .iter()
        .any(|item| item.entity == "Volume" && item.id == "99"));
}
