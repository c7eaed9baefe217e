//! xDS snapshot generation and caching

mod cache;
mod hasher;
mod resources;
mod snapshot;


pub use cache::{gateway_cache_key, snapshot_cache_key, SnapshotCache, FALLBACK_NODE_CACHE_KEY};
pub use hasher::{HashError, ResourceHasher, Sha256ResourceHasher, Version, EMPTY_VERSION};
pub use resources::{
    Cluster, ClusterLoadAssignment, EnvoyResource, Filter, FilterChain, LbEndpoint, Listener,
    LocalityLbEndpoints, ResourceType, Route, RouteConfiguration, RoutePathMatch, VirtualHost,
};
pub use snapshot::{generate_xds_snapshot, make_rds_resources, Resources, Snapshot};
