//! Envoy xDS resource model
//!
//! A trimmed serde rendition of the Envoy v3 protos carrying the fields this
//! control plane fills in. Anything opaque to us (filter configs, cluster
//! options) travels as `serde_json::Value` so content hashing still sees it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four resource families delivered in a snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Endpoints,
    Clusters,
    Routes,
    Listeners,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Endpoints,
        ResourceType::Clusters,
        ResourceType::Routes,
        ResourceType::Listeners,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Endpoints => "endpoints",
            ResourceType::Clusters => "clusters",
            ResourceType::Routes => "routes",
            ResourceType::Listeners => "listeners",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, serializable xDS resource
pub trait EnvoyResource: Serialize {
    const RESOURCE_TYPE: ResourceType;

    /// Name the resource is addressed by in its family
    fn resource_name(&self) -> &str;
}

/// Upstream cluster
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb_policy: Option<String>,
    /// Discovery type, e.g. `EDS` or `STRICT_DNS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_type: Option<String>,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EnvoyResource for Cluster {
    const RESOURCE_TYPE: ResourceType = ResourceType::Clusters;

    fn resource_name(&self) -> &str {
        &self.name
    }
}

/// Endpoints of one cluster
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLoadAssignment {
    pub cluster_name: String,
    #[serde(default)]
    pub endpoints: Vec<LocalityLbEndpoints>,
}

impl EnvoyResource for ClusterLoadAssignment {
    const RESOURCE_TYPE: ResourceType = ResourceType::Endpoints;

    fn resource_name(&self) -> &str {
        &self.cluster_name
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityLbEndpoints {
    #[serde(default)]
    pub lb_endpoints: Vec<LbEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancing_weight: Option<u32>,
    #[serde(default)]
    pub priority: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LbEndpoint {
    pub address: String,
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancing_weight: Option<u32>,
}

impl LbEndpoint {
    pub fn new(address: impl Into<String>, port: u32) -> Self {
        Self {
            address: address.into(),
            port,
            load_balancing_weight: None,
        }
    }
}

/// Named set of virtual hosts served by an HTTP connection manager
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfiguration {
    pub name: String,
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHost>,
}

impl EnvoyResource for RouteConfiguration {
    const RESOURCE_TYPE: ResourceType = ResourceType::Routes;

    fn resource_name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub path_match: RoutePathMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_rewrite: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutePathMatch {
    Prefix(String),
    Path(String),
    SafeRegex(String),
}

impl Default for RoutePathMatch {
    fn default() -> Self {
        RoutePathMatch::Prefix("/".to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub name: String,
    pub address: String,
    pub port: u32,
    #[serde(default)]
    pub filter_chains: Vec<FilterChain>,
}

impl EnvoyResource for Listener {
    const RESOURCE_TYPE: ResourceType = ResourceType::Listeners;

    fn resource_name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChain {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_names: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub typed_config: serde_json::Value,
}
