//! Apply path validation across every path-bearing field of an HTTPRoute

use kube::ResourceExt;

use crate::crd::{HTTPRoute, HttpPathModifier, PathMatchType, PathModifierType};

use super::path::{validate_path, validate_rewrite, RouteValidationError};

/// Validate all match paths and prefix rewrites of `route`.
///
/// Every problem is collected; an empty result means the route is safe to
/// translate. Regular-expression matches are not paths and are skipped.
pub fn validate_http_route(route: &HTTPRoute) -> Vec<RouteValidationError> {
    let mut errors = Vec::new();
    let namespace = route.namespace().unwrap_or_else(|| "default".to_string());
    let route_name = format!("{}/{}", namespace, route.name_any());

    for (idx, rule) in route.spec.rules.iter().enumerate() {
        let rule_name = format!("{route_name} rule[{idx}]");

        for path in rule.matches.iter().filter_map(|m| m.path.as_ref()) {
            match path.type_ {
                PathMatchType::Exact | PathMatchType::PathPrefix => {
                    validate_path(&path.value, &rule_name, &mut errors)
                }
                PathMatchType::RegularExpression => {}
            }
        }

        for filter in &rule.filters {
            let modifiers = [
                filter.url_rewrite.as_ref().and_then(|f| f.path.as_ref()),
                filter.request_redirect.as_ref().and_then(|f| f.path.as_ref()),
            ];
            for modifier in modifiers.into_iter().flatten() {
                check_modifier(modifier, &rule_name, &mut errors);
            }
        }
    }

    errors
}

fn check_modifier(
    modifier: &HttpPathModifier,
    rule_name: &str,
    errors: &mut Vec<RouteValidationError>,
) {
    match modifier.type_ {
        PathModifierType::ReplacePrefixMatch => {
            if let Some(prefix) = &modifier.replace_prefix_match {
                validate_rewrite(prefix, rule_name, errors);
            }
        }
        PathModifierType::ReplaceFullPath => {
            if let Some(full) = &modifier.replace_full_path {
                validate_path(full, rule_name, errors);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{
        HttpPathMatch, HttpRequestRedirectFilter, HttpRouteFilter, HttpRouteMatch, HttpRouteRule,
        HttpRouteSpec, HttpUrlRewriteFilter,
    };

    fn path_match(type_: PathMatchType, value: &str) -> HttpRouteMatch {
        HttpRouteMatch {
            path: Some(HttpPathMatch {
                type_,
                value: value.to_string(),
            }),
        }
    }

    fn rewrite(prefix: &str) -> HttpRouteFilter {
        HttpRouteFilter {
            type_: "URLRewrite".to_string(),
            url_rewrite: Some(HttpUrlRewriteFilter {
                hostname: None,
                path: Some(HttpPathModifier {
                    type_: PathModifierType::ReplacePrefixMatch,
                    replace_full_path: None,
                    replace_prefix_match: Some(prefix.to_string()),
                }),
            }),
            request_redirect: None,
        }
    }

    fn route(rules: Vec<HttpRouteRule>) -> HTTPRoute {
        let mut route = HTTPRoute::new(
            "store",
            HttpRouteSpec {
                rules,
                ..Default::default()
            },
        );
        route.metadata.namespace = Some("shop".to_string());
        route
    }

    #[test]
    fn test_clean_route_has_no_errors() {
        let route = route(vec![HttpRouteRule {
            matches: vec![path_match(PathMatchType::PathPrefix, "/cart")],
            filters: vec![rewrite("/v2/cart")],
            backend_refs: vec![],
        }]);
        assert!(validate_http_route(&route).is_empty());
    }

    #[test]
    fn test_every_problem_is_reported() {
        let route = route(vec![
            HttpRouteRule {
                matches: vec![
                    path_match(PathMatchType::PathPrefix, "/a/../b"),
                    path_match(PathMatchType::Exact, "/c//d"),
                    path_match(PathMatchType::RegularExpression, "/(.*)//"),
                ],
                filters: vec![],
                backend_refs: vec![],
            },
            HttpRouteRule {
                matches: vec![],
                filters: vec![rewrite("http://host/x/./y")],
                backend_refs: vec![],
            },
        ]);

        let errors = validate_http_route(&route);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].route, "shop/store rule[0]");
        assert!(errors[0].message.contains("/../"));
        assert!(errors[1].message.contains("//"));
        assert_eq!(errors[2].route, "shop/store rule[1]");
        assert!(errors[2].message.starts_with("the rewrite is invalid"));
    }

    #[test]
    fn test_redirect_full_path_is_checked() {
        let route = route(vec![HttpRouteRule {
            matches: vec![],
            filters: vec![HttpRouteFilter {
                type_: "RequestRedirect".to_string(),
                url_rewrite: None,
                request_redirect: Some(HttpRequestRedirectFilter {
                    path: Some(HttpPathModifier {
                        type_: PathModifierType::ReplaceFullPath,
                        replace_full_path: Some("/login/.".to_string()),
                        replace_prefix_match: None,
                    }),
                    ..Default::default()
                }),
            }],
            backend_refs: vec![],
        }]);

        let errors = validate_http_route(&route);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot end with [/.]"));
    }
}
