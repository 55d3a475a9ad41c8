//! Result merging
//!
//! Flattens per-entity pages into one ordered list of
//! [`SearchResultItem`]s. Entity order is the caller's priority list first,
//! then registration order. Within an entity, records keep API order across
//! pages in cursor order.

use crate::registry::EntityRegistry;
use crate::session::SearchSession;
use nimbus_core::SearchResultItem;

/// Registration positions in presentation order
///
/// Names in `priority` come first, in the order given; unknown names are
/// skipped. Every other entity follows in registration order.
pub fn presentation_order(registry: &EntityRegistry, priority: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(registry.len());
    for name in priority {
        if let Some(position) = registry.position(name) {
            if !order.contains(&position) {
                order.push(position);
            }
        }
    }
    for position in 0..registry.len() {
        if !order.contains(&position) {
            order.push(position);
        }
    }
    order
}

/// Merge every loaded page of `session` into one list
pub fn merge_results(
    session: &SearchSession,
    registry: &EntityRegistry,
    order: &[usize],
) -> Vec<SearchResultItem> {
    let mut results = Vec::new();
    for &position in order {
        let (Some(slot), Some(descriptor)) = (session.slot_of(position), registry.at(position))
        else {
            continue;
        };
        let entity = &session.entities[slot];
        results.reserve(entity.record_count());
        results.extend(entity.records().cloned().map(|record| descriptor.present(record)));
    }
    results
}

/// Results of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup {
    /// Entity name
    pub entity: String,
    /// The entity's items in merged order
    pub items: Vec<SearchResultItem>,
}

/// Group merged results by entity
///
/// Groups appear in order of their first item; items keep their relative
/// order. Entities with no items produce no group.
pub fn group_by_entity(results: Vec<SearchResultItem>) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    for item in results {
        match groups.iter_mut().find(|group| group.entity == item.entity) {
            Some(group) => group.items.push(item),
            None => groups.push(ResultGroup {
                entity: item.entity.clone(),
                items: vec![item],
            }),
        }
    }
    groups
}
