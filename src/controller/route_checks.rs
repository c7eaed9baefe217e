//! Feed path validation results into the route's report

use crate::crd::{ConditionStatus, HTTPRoute, RouteObject};
use crate::reports::conditions::{CONDITION_TYPE_ACCEPTED, REASON_UNSUPPORTED_VALUE};
use crate::reports::{ConditionReport, ReportCondition, ReportMap};
use crate::validation::validate_http_route;

/// Validate `route` and mark every parent not accepted when any path or
/// rewrite is unsafe. Returns `true` when the route passed.
pub fn check_http_route_paths(route: &HTTPRoute, reports: &mut ReportMap) -> bool {
    let errors = validate_http_route(route);
    if errors.is_empty() {
        return true;
    }

    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    let report = reports.route(RouteObject::Http(route));
    for parent in &route.spec.parent_refs {
        report.parent_ref(parent).set_condition(
            ReportCondition::new(
                CONDITION_TYPE_ACCEPTED,
                ConditionStatus::False,
                REASON_UNSUPPORTED_VALUE,
            )
            .with_message(message.clone()),
        );
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{
        HttpPathMatch, HttpRouteMatch, HttpRouteRule, HttpRouteSpec, ParentReference,
        PathMatchType,
    };
    use crate::reports::conditions::is_condition_true;

    fn route_with_path(path: &str) -> HTTPRoute {
        let mut route = HTTPRoute::new(
            "web",
            HttpRouteSpec {
                parent_refs: vec![ParentReference::gateway("gw")],
                rules: vec![HttpRouteRule {
                    matches: vec![HttpRouteMatch {
                        path: Some(HttpPathMatch {
                            type_: PathMatchType::PathPrefix,
                            value: path.to_string(),
                        }),
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            },
        );
        route.metadata.namespace = Some("apps".to_string());
        route
    }

    #[test]
    fn test_valid_route_leaves_report_untouched() {
        let route = route_with_path("/api");
        let mut reports = ReportMap::new();

        assert!(check_http_route_paths(&route, &mut reports));
        assert!(reports.is_empty());
    }

    #[test]
    fn test_invalid_path_rejects_every_parent() {
        let route = route_with_path("/api/../admin");
        let mut reports = ReportMap::new();

        assert!(!check_http_route_paths(&route, &mut reports));

        let status = reports
            .build_route_status(RouteObject::Http(&route), "example.net/controller")
            .unwrap();
        assert_eq!(status.parents.len(), 1);
        assert!(!is_condition_true(
            &status.parents[0].conditions,
            CONDITION_TYPE_ACCEPTED
        ));
        assert!(status.parents[0].conditions[0].message.contains("/../"));
    }
}
