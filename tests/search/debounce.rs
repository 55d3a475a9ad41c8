//! Keystroke settling over the full console catalog.

use crate::test_utils::*;
use nimbus::{Debouncer, SearchConfig, SearchPhase};
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(600);

#[tokio::test(start_paused = true)]
async fn test_typing_fans_out_once() {
    let console = Console::new();
    let bar = Debouncer::spawn(console.search.clone()).unwrap();

    for prefix in ["w", "we", "web"] {
        bar.input(prefix);
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    assert_eq!(console.search.state().phase, SearchPhase::Debouncing);
    assert_eq!(console.total_requests(), 0);

    tokio::time::sleep(QUIET).await;
    console.search.settled().await;

    let entities = console.search.active_entities().len();
    assert_eq!(console.total_requests(), entities);
    assert_eq!(console.search.state().session.as_ref().unwrap().query, "web");
    assert_eq!(console.search.output().phase, SearchPhase::Settled);
}

#[tokio::test(start_paused = true)]
async fn test_configured_window_is_used() {
    let config = SearchConfig {
        debounce_ms: 2_000,
        ..SearchConfig::default()
    };
    let console = Console::with(config, |_, source| source);
    let bar = Debouncer::spawn(console.search.clone()).unwrap();

    bar.input("web");
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(console.total_requests(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    console.search.settled().await;
    assert!(console.total_requests() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_the_bar_is_immediate() {
    let console = Console::new();
    let bar = Debouncer::spawn(console.search.clone()).unwrap();

    bar.input("web");
    tokio::time::sleep(QUIET).await;
    console.search.settled().await;
    assert!(!console.search.output().results.is_empty());

    bar.input("");
    tokio::time::sleep(Duration::from_millis(1)).await;
    let output = console.search.output();
    assert_eq!(output.phase, SearchPhase::Idle);
    assert!(output.results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_debouncer_submits_nothing() {
    let console = Console::new();
    let bar = Debouncer::spawn(console.search.clone()).unwrap();

    bar.input("web");
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(bar);
    tokio::time::sleep(QUIET).await;

    assert_eq!(console.total_requests(), 0);
}
