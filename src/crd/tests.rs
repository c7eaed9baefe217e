//! Manifest (de)serialization tests for the Gateway API types

#[cfg(test)]
mod manifests {
    use kube::core::{DynamicObject, TypeMeta};
    use kube::Resource;

    use crate::crd::{
        ConditionStatus, Gateway, HTTPRoute, ParentReference, PathMatchType, PathModifierType,
        RouteObject, TCPRoute,
    };

    const HTTP_ROUTE: &str = r#"
apiVersion: gateway.networking.k8s.io/v1
kind: HTTPRoute
metadata:
  name: store
  namespace: shop
  generation: 3
spec:
  parentRefs:
    - name: public
      sectionName: http
  hostnames: ["store.example.com"]
  rules:
    - matches:
        - path:
            type: PathPrefix
            value: /cart
      filters:
        - type: URLRewrite
          urlRewrite:
            path:
              type: ReplacePrefixMatch
              replacePrefixMatch: /v2/cart
      backendRefs:
        - name: cart
          port: 8080
"#;

    #[test]
    fn test_http_route_manifest_parses() {
        let route: HTTPRoute = serde_yaml::from_str(HTTP_ROUTE).unwrap();

        assert_eq!(route.metadata.name.as_deref(), Some("store"));
        assert_eq!(route.spec.parent_refs.len(), 1);
        assert_eq!(route.spec.parent_refs[0].section_name.as_deref(), Some("http"));

        let rule = &route.spec.rules[0];
        let path = rule.matches[0].path.as_ref().unwrap();
        assert_eq!(path.type_, PathMatchType::PathPrefix);
        assert_eq!(path.value, "/cart");

        let rewrite = rule.filters[0].url_rewrite.as_ref().unwrap();
        let modifier = rewrite.path.as_ref().unwrap();
        assert_eq!(modifier.type_, PathModifierType::ReplacePrefixMatch);
        assert_eq!(modifier.replace_prefix_match.as_deref(), Some("/v2/cart"));
        assert!(route.status.is_none());
    }

    #[test]
    fn test_gateway_status_round_trips() {
        let raw = r#"
apiVersion: gateway.networking.k8s.io/v1
kind: Gateway
metadata:
  name: public
  namespace: shop
spec:
  gatewayClassName: envoy
  listeners:
    - name: http
      port: 80
      protocol: HTTP
status:
  conditions:
    - type: Accepted
      status: "True"
      reason: Accepted
      lastTransitionTime: "2024-01-01T00:00:00Z"
      observedGeneration: 1
"#;
        let gw: Gateway = serde_yaml::from_str(raw).unwrap();
        let status = gw.status.as_ref().unwrap();
        assert_eq!(status.conditions[0].status, ConditionStatus::True);
        assert_eq!(status.conditions[0].message, "");

        let json = serde_json::to_value(&gw).unwrap();
        assert_eq!(json["status"]["conditions"][0]["type"], "Accepted");
        assert_eq!(
            json["status"]["conditions"][0]["lastTransitionTime"],
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_parent_reference_omits_unset_fields() {
        let json = serde_json::to_value(ParentReference::gateway("public")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "public" }));
    }

    #[test]
    fn test_crd_metadata() {
        assert_eq!(HTTPRoute::kind(&()), "HTTPRoute");
        assert_eq!(HTTPRoute::group(&()), "gateway.networking.k8s.io");
        assert_eq!(TCPRoute::version(&()), "v1alpha2");
        assert_eq!(Gateway::version(&()), "v1");
    }

    #[test]
    fn test_route_object_accessors() {
        let route: HTTPRoute = serde_yaml::from_str(HTTP_ROUTE).unwrap();
        let obj = RouteObject::from(&route);

        assert_eq!(obj.kind(), "HTTPRoute");
        assert_eq!(obj.namespace(), "shop");
        assert_eq!(obj.name(), "store");
        assert_eq!(obj.generation(), 3);
        assert_eq!(obj.spec_parent_refs().len(), 1);
        assert!(obj.is_supported());
    }

    #[test]
    fn test_unsupported_route_object() {
        let mut dynamic = DynamicObject {
            types: Some(TypeMeta {
                api_version: "gateway.networking.k8s.io/v1alpha2".to_string(),
                kind: "UDPRoute".to_string(),
            }),
            metadata: Default::default(),
            data: serde_json::Value::Null,
        };
        dynamic.metadata.name = Some("dns".to_string());

        let obj = RouteObject::Unsupported(&dynamic);
        assert_eq!(obj.kind(), "UDPRoute");
        assert_eq!(obj.namespace(), "default");
        assert!(obj.spec_parent_refs().is_empty());
        assert!(obj.status().is_none());
        assert!(!obj.is_supported());
    }
}
