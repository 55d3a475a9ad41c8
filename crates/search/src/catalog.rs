//! Built-in console entities
//!
//! Schemas and presenters for the entities the console's federated search
//! covers. The catalog carries no I/O: callers attach an [`EntitySource`]
//! per entity with [`registry_from`].
//!
//! Registration order (and so the default presentation order) is the order
//! of [`templates`].

use crate::descriptor::{EntitySearchDescriptor, ResultPresenter};
use crate::registry::EntityRegistry;
use crate::source::EntitySource;
use nimbus_core::Result;
use nimbus_query::{MatchRule, SearchSchema};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Compute instances
pub const LINODE: &str = "Linode";
/// Block storage volumes
pub const VOLUME: &str = "Volume";
/// Load balancers
pub const NODE_BALANCER: &str = "NodeBalancer";
/// Virtual private clouds
pub const VPC: &str = "VPC";
/// Cloud firewalls
pub const FIREWALL: &str = "Firewall";
/// Deployment scripts owned by the account
pub const STACK_SCRIPT: &str = "StackScript";
/// Private machine images
pub const IMAGE: &str = "Image";
/// Placement groups
pub const PLACEMENT_GROUP: &str = "Placement Group";
/// Managed databases
pub const DATABASE: &str = "Database";
/// Managed Kubernetes clusters
pub const KUBERNETES_CLUSTER: &str = "Kubernetes Cluster";
/// DNS domains
pub const DOMAIN: &str = "Domain";
/// Object storage buckets
pub const OBJECT_STORAGE_BUCKET: &str = "Object Storage Bucket";

/// Schema and presenter of a built-in entity
#[derive(Debug, Clone)]
pub struct EntityTemplate {
    /// Entity name
    pub name: &'static str,
    /// Filterable surface
    pub schema: SearchSchema,
    /// Record projection
    pub presenter: ResultPresenter,
}

impl EntityTemplate {
    /// Attach a source, producing a descriptor
    pub fn with_source(&self, source: Arc<dyn EntitySource>) -> EntitySearchDescriptor {
        EntitySearchDescriptor::new(
            self.name,
            self.schema.clone(),
            self.presenter.clone(),
            source,
        )
    }
}

fn template(name: &'static str, schema: SearchSchema, url: &str) -> EntityTemplate {
    EntityTemplate {
        name,
        schema,
        presenter: ResultPresenter::new(url),
    }
}

/// `label` as the only default field, `id` by equality
fn labelled() -> SearchSchema {
    SearchSchema::new()
        .with_default_field("label")
        .with_field("id", MatchRule::Equals)
}

/// `label` and `tags` as default fields, `tag` as an alias for `tags`
fn tagged() -> SearchSchema {
    labelled().with_default_field("tags").with_alias("tag", "tags")
}

static TEMPLATES: Lazy<Vec<EntityTemplate>> = Lazy::new(|| {
    vec![
        template(
            LINODE,
            tagged()
                .with_default_field("ipv4")
                .with_field("region", MatchRule::Contains)
                .with_field("status", MatchRule::Contains)
                .with_field("type", MatchRule::Contains)
                .with_field("image", MatchRule::Contains),
            "/linodes/{id}",
        ),
        template(
            VOLUME,
            tagged()
                .with_field("region", MatchRule::Contains)
                .with_field("status", MatchRule::Contains),
            "/volumes?query={label}",
        ),
        template(
            NODE_BALANCER,
            tagged()
                .with_default_field("ipv4")
                .with_field("region", MatchRule::Contains),
            "/nodebalancers/{id}",
        ),
        template(
            VPC,
            labelled()
                .with_field("region", MatchRule::Contains)
                .with_field("description", MatchRule::Contains),
            "/vpcs/{id}",
        ),
        template(
            FIREWALL,
            labelled()
                .with_field("status", MatchRule::Contains)
                .with_field("tags", MatchRule::Contains)
                .with_alias("tag", "tags"),
            "/firewalls/{id}",
        ),
        template(
            STACK_SCRIPT,
            labelled()
                .with_field("username", MatchRule::Contains)
                .with_field("description", MatchRule::Contains)
                .with_base_filter("mine", true),
            "/stackscripts/{id}",
        ),
        template(
            IMAGE,
            labelled()
                .with_field("description", MatchRule::Contains)
                .with_base_filter("is_public", false),
            "/images?query={label}",
        ),
        template(
            PLACEMENT_GROUP,
            labelled().with_field("region", MatchRule::Contains),
            "/placement-groups/{id}",
        ),
        template(
            DATABASE,
            labelled()
                .with_field("engine", MatchRule::Contains)
                .with_field("region", MatchRule::Contains)
                .with_field("status", MatchRule::Contains),
            "/databases/{engine}/{id}",
        ),
        template(
            KUBERNETES_CLUSTER,
            labelled()
                .with_field("region", MatchRule::Contains)
                .with_field("tags", MatchRule::Contains)
                .with_alias("tag", "tags"),
            "/kubernetes/clusters/{id}",
        ),
        EntityTemplate {
            name: DOMAIN,
            schema: SearchSchema::new()
                .with_default_field("domain")
                .with_default_field("tags")
                .with_field("type", MatchRule::Contains)
                .with_field("status", MatchRule::Contains)
                .with_field("id", MatchRule::Equals)
                .with_alias("label", "domain")
                .with_alias("tag", "tags"),
            presenter: ResultPresenter::new("/domains/{id}").with_label_field("domain"),
        },
        EntityTemplate {
            name: OBJECT_STORAGE_BUCKET,
            schema: SearchSchema::new()
                .with_default_field("label")
                .with_field("cluster", MatchRule::Contains)
                .with_field("region", MatchRule::Contains),
            presenter: ResultPresenter::new("/object-storage/buckets/{cluster}/{label}")
                .with_id_field("label"),
        },
    ]
});

/// Built-in entity templates in registration order
pub fn templates() -> &'static [EntityTemplate] {
    &TEMPLATES
}

/// Look up a built-in template by entity name
pub fn template_for(name: &str) -> Option<&'static EntityTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Build a registry of every built-in entity
///
/// `source_for` is called once per entity, in registration order, with the
/// entity name.
///
/// # Example
///
/// ```
/// use nimbus_search::catalog;
/// use nimbus_search::source::{EntitySource, MemorySource};
/// use std::sync::Arc;
///
/// let registry = catalog::registry_from(|_| {
///     Arc::new(MemorySource::empty()) as Arc<dyn EntitySource>
/// })
/// .unwrap();
/// assert_eq!(registry.len(), catalog::templates().len());
/// ```
pub fn registry_from<F>(mut source_for: F) -> Result<EntityRegistry>
where
    F: FnMut(&str) -> Arc<dyn EntitySource>,
{
    EntityRegistry::new(
        TEMPLATES
            .iter()
            .map(|template| template.with_source(source_for(template.name))),
    )
}
