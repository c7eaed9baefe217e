//! Gateway Custom Resource Definition
//!
//! A Gateway describes a set of listeners that an Envoy proxy fleet exposes.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::GatewayStatus;

#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "Gateway",
    namespaced,
    status = "GatewayStatus",
    shortname = "gtw",
    printcolumn = r#"{"name":"Class","type":"string","jsonPath":".spec.gatewayClassName"}"#,
    printcolumn = r#"{"name":"Programmed","type":"string","jsonPath":".status.conditions[?(@.type=='Programmed')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    pub gateway_class_name: String,

    #[serde(default)]
    pub listeners: Vec<Listener>,
}

/// A logical network entry point on a Gateway
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    pub port: i32,

    /// HTTP, HTTPS, TLS, TCP or UDP
    pub protocol: String,
}

impl Listener {
    pub fn new(name: impl Into<String>, port: i32, protocol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: None,
            port,
            protocol: protocol.into(),
        }
    }
}
