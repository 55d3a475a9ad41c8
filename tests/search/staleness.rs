//! Last query wins.

use crate::test_utils::*;
use nimbus::{MemorySource, SearchConfig, SearchPhase};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn slow_web() -> (nimbus::SearchOrchestrator, Arc<MemorySource>) {
    let linodes = Arc::new(
        MemorySource::new(vec![
            json!({"id": 1, "label": "web-1"}),
            json!({"id": 2, "label": "db-1"}),
        ])
        .with_delay_for("web", Duration::from_secs(5)),
    );
    let search = orchestrator(
        vec![descriptor("Linode", label_schema(), &linodes)],
        SearchConfig::default(),
    );
    (search, linodes)
}

#[tokio::test(start_paused = true)]
async fn test_newer_query_replaces_slow_one() {
    let (search, linodes) = slow_web();

    let first = search.submit("web").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = search.submit("db").unwrap();
    assert!(second > first);

    search.settled().await;
    assert_eq!(result_ids(&search), vec![("Linode".into(), "2".into())]);

    // Well past the slow response: nothing from "web" ever lands
    tokio::time::sleep(Duration::from_secs(10)).await;
    let state = search.state();
    assert_eq!(state.generation, second);
    assert_eq!(state.session.as_ref().unwrap().query, "db");
    assert_eq!(result_ids(&search), vec![("Linode".into(), "2".into())]);
    assert_eq!(linodes.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_never_see_superseded_results() {
    let (search, _) = slow_web();
    let mut updates = search.subscribe();

    search.submit("web").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = search.submit("db").unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let latest = updates.borrow_and_update().clone();
    assert_eq!(latest.generation, second);
    let session = latest.session.as_ref().unwrap();
    assert_eq!(session.query, "db");
    assert!(session
        .entities
        .iter()
        .flat_map(|entity| entity.records())
        .all(|record| record["label"] == "db-1"));
}

#[tokio::test(start_paused = true)]
async fn test_clear_discards_in_flight_search() {
    let (search, _) = slow_web();

    search.submit("web").unwrap();
    assert_eq!(search.state().phase, SearchPhase::Fetching);
    search.clear();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let output = search.output();
    assert_eq!(output.phase, SearchPhase::Idle);
    assert!(output.results.is_empty());
    assert!(search.state().session.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_load_more_is_dropped() {
    let linodes = Arc::new(
        MemorySource::new(numbered("web", 4)).with_delay(Duration::from_secs(1)),
    );
    let search = orchestrator(
        vec![descriptor("Linode", label_schema(), &linodes)],
        SearchConfig {
            page_size: 2,
            ..SearchConfig::default()
        },
    );

    search.search("web").await.unwrap();
    assert_eq!(search.load_more().unwrap(), 1);
    let generation = search.submit("web-4").unwrap();
    search.settled().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let state = search.state();
    assert_eq!(state.generation, generation);
    assert_eq!(result_ids(&search), vec![("Linode".into(), "4".into())]);
}
