//! Versioned xDS snapshots
//!
//! A snapshot is one consistent set of the four resource families, each with a
//! content-derived version. Versions only change when content does, so a
//! translation pass that reproduces yesterday's output produces yesterday's
//! versions and proxies are not pushed anything.

use std::collections::BTreeMap;

use tracing::{debug, error};

use super::hasher::{HashError, ResourceHasher, Version};
use super::resources::{
    Cluster, ClusterLoadAssignment, EnvoyResource, Listener, ResourceType, RouteConfiguration,
};

/// One versioned resource family, keyed by resource name
#[derive(Clone, Debug, PartialEq)]
pub struct Resources<T> {
    version: Version,
    items: BTreeMap<String, T>,
}

impl<T: EnvoyResource> Resources<T> {
    /// Later resources replace earlier ones of the same name; snapshot
    /// generation deduplicates before it gets here
    pub fn new(version: Version, resources: Vec<T>) -> Self {
        let items = resources
            .into_iter()
            .map(|res| (res.resource_name().to_string(), res))
            .collect();
        Self { version, items }
    }
}

impl<T> Resources<T> {
    pub fn empty() -> Self {
        Self {
            version: Version::empty(),
            items: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn items(&self) -> &BTreeMap<String, T> {
        &self.items
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Immutable once built; share it behind an `Arc`
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub endpoints: Resources<ClusterLoadAssignment>,
    pub clusters: Resources<Cluster>,
    pub routes: Resources<RouteConfiguration>,
    pub listeners: Resources<Listener>,
}

impl Snapshot {
    /// Snapshot handed to proxies whose Gateway no longer exists
    pub fn empty() -> Self {
        Self {
            endpoints: Resources::empty(),
            clusters: Resources::empty(),
            routes: Resources::empty(),
            listeners: Resources::empty(),
        }
    }

    pub fn version(&self, resource_type: ResourceType) -> &Version {
        match resource_type {
            ResourceType::Endpoints => self.endpoints.version(),
            ResourceType::Clusters => self.clusters.version(),
            ResourceType::Routes => self.routes.version(),
            ResourceType::Listeners => self.listeners.version(),
        }
    }

    /// True when every family carries the same version as in `other`
    pub fn same_versions(&self, other: &Snapshot) -> bool {
        ResourceType::ALL
            .iter()
            .all(|ty| self.version(*ty) == other.version(*ty))
    }
}

/// Version and assemble the resources for one proxy
///
/// Listeners without filter chains are dropped before versioning. Resources
/// sharing a name are reduced to one per name, independent of input order. The
/// endpoints version folds in the clusters hash so a cluster change always
/// republishes endpoints. A hash failure only affects its own family (and,
/// through that fold, endpoints).
pub fn generate_xds_snapshot<H: ResourceHasher>(
    hasher: &H,
    clusters: Vec<Cluster>,
    endpoints: Vec<ClusterLoadAssignment>,
    route_configs: Vec<RouteConfiguration>,
    mut listeners: Vec<Listener>,
) -> Snapshot {
    listeners.retain(|lis| !lis.filter_chains.is_empty());
    let clusters = dedup_by_name(clusters);
    let endpoints = dedup_by_name(endpoints);
    let listeners = dedup_by_name(listeners);

    let endpoints_hash = hash_resources(hasher, &endpoints);
    let clusters_hash = hash_resources(hasher, &clusters);
    let listeners_hash = hash_resources(hasher, &listeners);

    let endpoints_version = match (&clusters_hash, &endpoints_hash) {
        (Ok(c), Ok(e)) => Version::Hashed(format!("{c}-{e}")),
        (_, Err(err)) | (Err(err), _) => Version::failed(ResourceType::Endpoints, err.clone()),
    };

    let snapshot = Snapshot {
        endpoints: Resources::new(endpoints_version, endpoints),
        clusters: Resources::new(into_version(ResourceType::Clusters, clusters_hash), clusters),
        routes: make_rds_resources(hasher, route_configs),
        listeners: Resources::new(
            into_version(ResourceType::Listeners, listeners_hash),
            listeners,
        ),
    };

    debug!(
        clusters = snapshot.clusters.len(),
        clusters_version = %snapshot.clusters.version(),
        endpoints = snapshot.endpoints.len(),
        endpoints_version = %snapshot.endpoints.version(),
        routes = snapshot.routes.len(),
        routes_version = %snapshot.routes.version(),
        listeners = snapshot.listeners.len(),
        listeners_version = %snapshot.listeners.version(),
        "generated xds snapshot"
    );

    snapshot
}

/// Version route configurations on their own
///
/// Route configs without virtual hosts are dropped.
pub fn make_rds_resources<H: ResourceHasher>(
    hasher: &H,
    mut route_configs: Vec<RouteConfiguration>,
) -> Resources<RouteConfiguration> {
    route_configs.retain(|rc| !rc.virtual_hosts.is_empty());
    let route_configs = dedup_by_name(route_configs);
    let version = into_version(ResourceType::Routes, hash_resources(hasher, &route_configs));
    Resources::new(version, route_configs)
}

/// Keep one resource per name: the one with the greatest JSON encoding.
///
/// A resource that fails to encode sorts lowest; the hasher reports the
/// failure if it survives.
fn dedup_by_name<R: EnvoyResource>(resources: Vec<R>) -> Vec<R> {
    let mut by_name: BTreeMap<String, (Vec<u8>, R)> = BTreeMap::new();
    for res in resources {
        let encoded = serde_json::to_vec(&res).unwrap_or_default();
        let replaces = by_name
            .get(res.resource_name())
            .map_or(true, |(kept, _)| encoded > *kept);
        if replaces {
            by_name.insert(res.resource_name().to_string(), (encoded, res));
        } else {
            debug!(
                resource_type = %R::RESOURCE_TYPE,
                name = res.resource_name(),
                "dropping duplicate resource"
            );
        }
    }
    by_name.into_values().map(|(_, res)| res).collect()
}

fn hash_resources<H: ResourceHasher, R: EnvoyResource>(
    hasher: &H,
    resources: &[R],
) -> Result<u64, HashError> {
    hasher.hash(resources).inspect_err(|err| {
        error!(
            resource_type = %R::RESOURCE_TYPE,
            count = resources.len(),
            error = %err,
            "error trying to hash resources"
        );
    })
}

fn into_version(resource_type: ResourceType, hash: Result<u64, HashError>) -> Version {
    match hash {
        Ok(h) => Version::Hashed(h.to_string()),
        Err(err) => Version::failed(resource_type, err),
    }
}
