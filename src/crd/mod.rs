//! Gateway API resource definitions
//!
//! Only the fields the status and validation layers read are modelled; unknown
//! fields in manifests are ignored on deserialization.

mod gateway;
mod route;
pub mod types;

#[cfg(test)]
mod tests;

pub use gateway::{Gateway, GatewaySpec, Listener};
pub use route::{
    BackendRef, HTTPRoute, HttpPathMatch, HttpPathModifier, HttpRequestRedirectFilter,
    HttpRouteFilter, HttpRouteMatch, HttpRouteRule, HttpRouteSpec, HttpUrlRewriteFilter,
    PathMatchType, PathModifierType, RouteObject, StreamRouteRule, TCPRoute, TLSRoute,
    TcpRouteSpec, TlsRouteSpec,
};
pub use types::*;
