//! Route Custom Resource Definitions
//!
//! HTTPRoute is served at `v1`; TCPRoute and TLSRoute are still `v1alpha2`
//! upstream. All three share `RouteStatus`.

use kube::core::DynamicObject;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ParentReference, RouteStatus};

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "HTTPRoute",
    namespaced,
    status = "RouteStatus",
    printcolumn = r#"{"name":"Hostnames","type":"string","jsonPath":".spec.hostnames"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,

    #[serde(default)]
    pub rules: Vec<HttpRouteRule>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<HttpRouteMatch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<HttpRouteFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_refs: Vec<BackendRef>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<HttpPathMatch>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum PathMatchType {
    Exact,
    #[default]
    PathPrefix,
    RegularExpression,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpPathMatch {
    #[serde(rename = "type", default)]
    pub type_: PathMatchType,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteFilter {
    /// RequestHeaderModifier, URLRewrite, RequestRedirect, ...
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(rename = "urlRewrite", skip_serializing_if = "Option::is_none")]
    pub url_rewrite: Option<HttpUrlRewriteFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_redirect: Option<HttpRequestRedirectFilter>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpUrlRewriteFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<HttpPathModifier>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestRedirectFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<HttpPathModifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum PathModifierType {
    ReplaceFullPath,
    ReplacePrefixMatch,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpPathModifier {
    #[serde(rename = "type")]
    pub type_: PathModifierType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_full_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_prefix_match: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1alpha2",
    kind = "TCPRoute",
    namespaced,
    status = "RouteStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct TcpRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentReference>,

    #[serde(default)]
    pub rules: Vec<StreamRouteRule>,
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1alpha2",
    kind = "TLSRoute",
    namespaced,
    status = "RouteStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct TlsRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,

    #[serde(default)]
    pub rules: Vec<StreamRouteRule>,
}

/// Rule shape shared by TCPRoute and TLSRoute
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamRouteRule {
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
}

/// A borrowed route of any kind the translator may encounter
///
/// Status can only be built for the supported kinds; anything else the caller
/// hands us is carried as `Unsupported` so the decision is made in one match
/// instead of a fallthrough branch.
#[derive(Clone, Copy, Debug)]
pub enum RouteObject<'a> {
    Http(&'a HTTPRoute),
    Tcp(&'a TCPRoute),
    Tls(&'a TLSRoute),
    Unsupported(&'a DynamicObject),
}

impl<'a> RouteObject<'a> {
    pub fn kind(&self) -> &'a str {
        match self {
            RouteObject::Http(_) => "HTTPRoute",
            RouteObject::Tcp(_) => "TCPRoute",
            RouteObject::Tls(_) => "TLSRoute",
            RouteObject::Unsupported(obj) => obj
                .types
                .as_ref()
                .map(|t| t.kind.as_str())
                .unwrap_or("Unknown"),
        }
    }

    fn metadata(&self) -> &'a kube::core::ObjectMeta {
        match self {
            RouteObject::Http(r) => &r.metadata,
            RouteObject::Tcp(r) => &r.metadata,
            RouteObject::Tls(r) => &r.metadata,
            RouteObject::Unsupported(obj) => &obj.metadata,
        }
    }

    pub fn name(&self) -> &'a str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &'a str {
        self.metadata().namespace.as_deref().unwrap_or("default")
    }

    pub fn generation(&self) -> i64 {
        self.metadata().generation.unwrap_or_default()
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, RouteObject::Unsupported(_))
    }

    /// Parent references declared in the route spec
    pub fn spec_parent_refs(&self) -> &'a [ParentReference] {
        match self {
            RouteObject::Http(r) => &r.spec.parent_refs,
            RouteObject::Tcp(r) => &r.spec.parent_refs,
            RouteObject::Tls(r) => &r.spec.parent_refs,
            RouteObject::Unsupported(_) => &[],
        }
    }

    /// Status currently persisted on the object
    pub fn status(&self) -> Option<&'a RouteStatus> {
        match self {
            RouteObject::Http(r) => r.status.as_ref(),
            RouteObject::Tcp(r) => r.status.as_ref(),
            RouteObject::Tls(r) => r.status.as_ref(),
            RouteObject::Unsupported(_) => None,
        }
    }
}

impl<'a> From<&'a HTTPRoute> for RouteObject<'a> {
    fn from(route: &'a HTTPRoute) -> Self {
        RouteObject::Http(route)
    }
}

impl<'a> From<&'a TCPRoute> for RouteObject<'a> {
    fn from(route: &'a TCPRoute) -> Self {
        RouteObject::Tcp(route)
    }
}

impl<'a> From<&'a TLSRoute> for RouteObject<'a> {
    fn from(route: &'a TLSRoute) -> Self {
        RouteObject::Tls(route)
    }
}
