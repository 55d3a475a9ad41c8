//! The built-in console entities end to end.

use crate::test_utils::*;
use nimbus::catalog;
use nimbus::{SearchConfig, SearchPhase};

fn item_url(console: &Console, entity: &str, id: &str) -> Option<String> {
    console
        .search
        .output()
        .results
        .into_iter()
        .find(|item| item.entity == entity && item.id == id)
        .map(|item| item.url)
}

#[tokio::test]
async fn test_bare_term_reaches_every_entity() {
    let console = Console::new();

    let output = console.search.search("web").await.unwrap();

    assert_eq!(output.phase, SearchPhase::Settled);
    assert!(output.entity_errors().is_empty());
    assert_eq!(output.searched_entities.len(), catalog::templates().len());

    let groups = console.search.grouped_results();
    let names: Vec<&str> = groups.iter().map(|group| group.entity.as_str()).collect();
    assert_eq!(names, console.search.registry().names());
}

#[tokio::test]
async fn test_navigation_targets() {
    let console = Console::new();
    console.search.search("web").await.unwrap();

    assert_eq!(item_url(&console, catalog::LINODE, "1").as_deref(), Some("/linodes/1"));
    assert_eq!(
        item_url(&console, catalog::VOLUME, "11").as_deref(),
        Some("/volumes?query=web-data")
    );
    assert_eq!(
        item_url(&console, catalog::DATABASE, "81").as_deref(),
        Some("/databases/mysql/81")
    );
    assert_eq!(
        item_url(&console, catalog::OBJECT_STORAGE_BUCKET, "web-assets").as_deref(),
        Some("/object-storage/buckets/us-east-1/web-assets")
    );

    let domain = console
        .search
        .output()
        .results
        .into_iter()
        .find(|item| item.entity == catalog::DOMAIN)
        .unwrap();
    assert_eq!(domain.label, "web.example.com");
    assert_eq!(domain.url, "/domains/101");
}

#[tokio::test]
async fn test_base_filters_scope_results() {
    let console = Console::new();
    console.search.search("web").await.unwrap();

    let results = console.search.output().results;
    let scripts: Vec<&str> = results
        .iter()
        .filter(|item| item.entity == catalog::STACK_SCRIPT)
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(scripts, vec!["51"]);

    let images: Vec<&str> = results
        .iter()
        .filter(|item| item.entity == catalog::IMAGE)
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(images, vec!["private/61"]);

    let request = &console.source(catalog::STACK_SCRIPT).requests()[0];
    assert_eq!(request.filter.as_map()["mine"], serde_json::json!(true));
}

#[tokio::test]
async fn test_tag_alias_and_unsupported_entities() {
    let console = Console::new();

    let output = console.search.search("tag:my-app").await.unwrap();

    let ids = result_ids(&console.search);
    assert_eq!(
        ids,
        vec![
            (catalog::LINODE.to_string(), "1".to_string()),
            (catalog::LINODE.to_string(), "2".to_string()),
            (catalog::VOLUME.to_string(), "11".to_string()),
            (catalog::KUBERNETES_CLUSTER.to_string(), "91".to_string()),
        ]
    );

    let unsupported: Vec<&str> = output.unsupported.iter().map(|(e, _)| e.as_str()).collect();
    for entity in [
        catalog::VPC,
        catalog::STACK_SCRIPT,
        catalog::IMAGE,
        catalog::PLACEMENT_GROUP,
        catalog::DATABASE,
        catalog::OBJECT_STORAGE_BUCKET,
    ] {
        assert!(unsupported.contains(&entity), "{} should be unsupported", entity);
        assert_eq!(console.source(entity).request_count(), 0);
    }
}

#[tokio::test]
async fn test_domain_label_alias() {
    let console = Console::new();

    console.search.search("label:web.example").await.unwrap();

    let request = &console.source(catalog::DOMAIN).requests()[0];
    assert_eq!(
        request.filter.cache_key(),
        r#"{"domain":{"+contains":"web.example"}}"#
    );
    assert!(result_ids(&console.search).contains(&(catalog::DOMAIN.to_string(), "101".to_string())));
}

#[tokio::test]
async fn test_priority_and_disabled_entities() {
    let config = SearchConfig {
        entity_priority: vec![catalog::DOMAIN.to_string(), catalog::IMAGE.to_string()],
        disabled_entities: vec![catalog::STACK_SCRIPT.to_string()],
        ..SearchConfig::default()
    };
    let console = Console::with(config, |_, source| source);

    console.search.search("web").await.unwrap();

    let groups = console.search.grouped_results();
    assert_eq!(groups[0].entity, catalog::DOMAIN);
    assert_eq!(groups[1].entity, catalog::IMAGE);
    assert_eq!(groups[2].entity, catalog::LINODE);
    assert!(groups.iter().all(|group| group.entity != catalog::STACK_SCRIPT));
    assert_eq!(console.source(catalog::STACK_SCRIPT).request_count(), 0);
    assert!(!console.search.active_entities().contains(&catalog::STACK_SCRIPT));
}

#[tokio::test]
async fn test_first_page_uses_configured_page_size() {
    let config = SearchConfig {
        page_size: 50,
        ..SearchConfig::default()
    };
    let console = Console::with(config, |_, source| source);

    console.search.search("web").await.unwrap();

    let request = &console.source(catalog::LINODE).requests()[0];
    assert_eq!(request.page, 1);
    assert_eq!(request.page_size, 50);
}
