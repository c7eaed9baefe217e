//! Validate HTTPRoutes found in multi-document YAML manifests

use serde::Deserialize;
use tracing::debug;

use crate::crd::{HTTPRoute, GATEWAY_API_GROUP};
use crate::error::Result;

use super::path::RouteValidationError;
use super::route::validate_http_route;

/// Parse every document in `raw` and validate the HTTPRoutes among them.
///
/// Documents of other kinds are skipped. A document that claims to be an
/// HTTPRoute but does not deserialize as one is an error.
pub fn validate_manifests(raw: &str) -> Result<Vec<RouteValidationError>> {
    let mut errors = Vec::new();

    for document in serde_yaml::Deserializer::from_str(raw) {
        let value = serde_yaml::Value::deserialize(document)?;
        if !is_http_route(&value) {
            debug!("skipping non-HTTPRoute document");
            continue;
        }
        let route: HTTPRoute = serde_yaml::from_value(value)?;
        errors.extend(validate_http_route(&route));
    }

    Ok(errors)
}

fn is_http_route(value: &serde_yaml::Value) -> bool {
    let kind = value.get("kind").and_then(|k| k.as_str());
    let api_version = value.get("apiVersion").and_then(|v| v.as_str());
    kind == Some("HTTPRoute")
        && api_version.is_some_and(|v| v.starts_with(&format!("{GATEWAY_API_GROUP}/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFESTS: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: unrelated
data:
  path: "/a/../b"
---
apiVersion: gateway.networking.k8s.io/v1
kind: HTTPRoute
metadata:
  name: good
  namespace: apps
spec:
  parentRefs:
    - name: gw
  rules:
    - matches:
        - path:
            type: PathPrefix
            value: /api
---
apiVersion: gateway.networking.k8s.io/v1
kind: HTTPRoute
metadata:
  name: bad
  namespace: apps
spec:
  parentRefs:
    - name: gw
  rules:
    - matches:
        - path:
            type: PathPrefix
            value: /api//v1
      filters:
        - type: URLRewrite
          urlRewrite:
            path:
              type: ReplacePrefixMatch
              replacePrefixMatch: /v2/.
"#;

    #[test]
    fn test_only_http_routes_are_validated() {
        let errors = validate_manifests(MANIFESTS).unwrap();

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.route.starts_with("apps/bad")));
        assert!(errors[0].message.contains("//"));
        assert!(errors[1].message.contains("the rewrite is invalid"));
    }

    #[test]
    fn test_malformed_http_route_is_an_error() {
        let raw = r#"
apiVersion: gateway.networking.k8s.io/v1
kind: HTTPRoute
metadata:
  name: broken
spec:
  rules: "not a list"
"#;
        assert!(validate_manifests(raw).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(validate_manifests("").unwrap().is_empty());
    }
}
