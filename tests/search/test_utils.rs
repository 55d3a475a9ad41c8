//! Shared fixtures for the federated search suite.

#![allow(dead_code)]

use nimbus::catalog;
use nimbus::{
    EntityRegistry, EntitySearchDescriptor, EntitySource, MemorySource, ResultPresenter,
    SearchConfig, SearchOrchestrator, SearchSchema,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Once};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route library logs to the test harness.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Console - the full built-in catalog over in-memory sources
// ============================================================================

/// Orchestrator over every built-in entity plus handles to its sources.
pub struct Console {
    pub search: SearchOrchestrator,
    sources: HashMap<String, Arc<MemorySource>>,
}

impl Console {
    /// Catalog with sample records and default configuration.
    pub fn new() -> Self {
        Self::with(SearchConfig::default(), |_, source| source)
    }

    /// Catalog with a custom config; `adjust` may wrap each source.
    pub fn with<F>(config: SearchConfig, adjust: F) -> Self
    where
        F: Fn(&str, MemorySource) -> MemorySource,
    {
        init_tracing();
        let mut sources = HashMap::new();
        let registry = catalog::registry_from(|name| {
            let source = Arc::new(adjust(name, MemorySource::new(sample_records(name))));
            sources.insert(name.to_string(), Arc::clone(&source));
            source as Arc<dyn EntitySource>
        })
        .expect("catalog registry");
        let search = SearchOrchestrator::new(registry, config).expect("orchestrator");
        Console { search, sources }
    }

    /// The in-memory source behind `entity`.
    pub fn source(&self, entity: &str) -> &Arc<MemorySource> {
        &self.sources[entity]
    }

    /// Total requests across every source.
    pub fn total_requests(&self) -> usize {
        self.sources.values().map(|s| s.request_count()).sum()
    }
}

/// Sample records per built-in entity.
pub fn sample_records(entity: &str) -> Vec<Value> {
    match entity {
        catalog::LINODE => vec![
            json!({"id": 1, "label": "web-1", "tags": ["my-app", "prod"], "ipv4": ["192.0.2.1"],
                   "region": "us-east", "status": "running", "type": "g6-standard-1", "image": "linode/debian12"}),
            json!({"id": 2, "label": "db-primary", "tags": ["my-app"], "ipv4": ["192.0.2.2"],
                   "region": "us-west", "status": "running", "type": "g6-dedicated-4", "image": "linode/ubuntu24.04"}),
            json!({"id": 3, "label": "cache", "tags": [], "ipv4": ["198.51.100.7"],
                   "region": "eu-central", "status": "offline", "type": "g6-nanode-1", "image": "linode/alpine3.20"}),
        ],
        catalog::VOLUME => vec![
            json!({"id": 11, "label": "web-data", "tags": ["my-app"], "region": "us-east", "status": "active"}),
        ],
        catalog::NODE_BALANCER => vec![
            json!({"id": 21, "label": "web-lb", "tags": ["prod"], "ipv4": "192.0.2.50", "region": "us-east"}),
        ],
        catalog::VPC => vec![
            json!({"id": 31, "label": "web-vpc", "region": "us-east", "description": "frontend network"}),
        ],
        catalog::FIREWALL => vec![
            json!({"id": 41, "label": "web-fw", "status": "enabled", "tags": ["prod"]}),
        ],
        catalog::STACK_SCRIPT => vec![
            json!({"id": 51, "label": "deploy-web", "username": "me", "description": "", "mine": true}),
            json!({"id": 52, "label": "web-community", "username": "someone", "description": "", "mine": false}),
        ],
        catalog::IMAGE => vec![
            json!({"id": "private/61", "label": "web-golden", "description": "", "is_public": false}),
            json!({"id": "linode/ubuntu24.04", "label": "ubuntu web", "description": "", "is_public": true}),
        ],
        catalog::PLACEMENT_GROUP => vec![
            json!({"id": 71, "label": "web-pg", "region": "us-east"}),
        ],
        catalog::DATABASE => vec![
            json!({"id": 81, "label": "web-db", "engine": "mysql", "region": "us-east", "status": "active"}),
        ],
        catalog::KUBERNETES_CLUSTER => vec![
            json!({"id": 91, "label": "web-lke", "region": "us-east", "tags": ["my-app"]}),
        ],
        catalog::DOMAIN => vec![
            json!({"id": 101, "domain": "web.example.com", "tags": [], "type": "master", "status": "active"}),
        ],
        catalog::OBJECT_STORAGE_BUCKET => vec![
            json!({"label": "web-assets", "cluster": "us-east-1", "region": "us-east"}),
        ],
        _ => Vec::new(),
    }
}

// ============================================================================
// Small registries
// ============================================================================

/// `label` + `tags` default fields with the `tag` alias.
pub fn tagged_schema() -> SearchSchema {
    SearchSchema::new()
        .with_default_field("label")
        .with_default_field("tags")
        .with_alias("tag", "tags")
}

/// `label` only.
pub fn label_schema() -> SearchSchema {
    SearchSchema::new().with_default_field("label")
}

/// Build a descriptor with a `/name/{id}` navigation target.
pub fn descriptor(name: &str, schema: SearchSchema, source: &Arc<MemorySource>) -> EntitySearchDescriptor {
    EntitySearchDescriptor::new(
        name,
        schema,
        ResultPresenter::new(format!("/{}/{{id}}", name.to_lowercase())),
        Arc::clone(source) as Arc<dyn EntitySource>,
    )
}

/// Orchestrator over the given descriptors with `config`.
pub fn orchestrator(
    descriptors: Vec<EntitySearchDescriptor>,
    config: SearchConfig,
) -> SearchOrchestrator {
    init_tracing();
    let registry = EntityRegistry::new(descriptors).expect("registry");
    SearchOrchestrator::new(registry, config).expect("orchestrator")
}

/// `count` records labelled `{prefix}-{n}`.
pub fn numbered(prefix: &str, count: usize) -> Vec<Value> {
    (1..=count)
        .map(|n| json!({"id": n, "label": format!("{}-{}", prefix, n), "tags": []}))
        .collect()
}

/// `(entity, id)` pairs of the current results.
pub fn result_ids(search: &SearchOrchestrator) -> Vec<(String, String)> {
    search
        .output()
        .results
        .into_iter()
        .map(|item| (item.entity, item.id))
        .collect()
}
