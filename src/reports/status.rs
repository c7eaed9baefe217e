//! Build Gateway API status from a finished `ReportMap`
//!
//! Reports only hold explicit (usually negative) outcomes. Here every required
//! condition type missing from a report is filled with its healthy default,
//! stamped with the report's observed generation, and reconciled with the
//! object's previous status so `lastTransitionTime` only moves when a
//! condition's status value actually changes.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::crd::{
    Condition, Gateway, GatewayStatus, ListenerStatus, RouteObject, RouteParentStatus, RouteStatus,
};

use super::conditions::{
    find_condition, RequiredCondition, ReportCondition, GATEWAY_REQUIRED_CONDITIONS,
    LISTENER_REQUIRED_CONDITIONS, PARENT_REF_REQUIRED_CONDITIONS,
};
use super::report_map::{ConditionReport, ParentRefKey, ReportMap};

impl ReportMap {
    /// Build the status for `gw`, or `None` if translation never touched it.
    ///
    /// `None` means "leave the existing status alone", not "clear it".
    pub fn build_gateway_status(&self, gw: &Gateway) -> Option<GatewayStatus> {
        self.build_gateway_status_at(gw, Utc::now())
    }

    pub fn build_gateway_status_at(
        &self,
        gw: &Gateway,
        now: DateTime<Utc>,
    ) -> Option<GatewayStatus> {
        let report = self.gateway_report(gw)?;
        let generation = report.observed_generation();
        let previous = gw.status.as_ref();

        let listeners = gw
            .spec
            .listeners
            .iter()
            .map(|lis| {
                let lis_report = report.listener_report(&lis.name);
                let previous_conditions = previous
                    .and_then(|s| s.listeners.iter().find(|l| l.name == lis.name))
                    .map(|l| l.conditions.as_slice())
                    .unwrap_or_default();

                ListenerStatus {
                    name: lis.name.clone(),
                    supported_kinds: lis_report
                        .map(|r| r.supported_kinds().to_vec())
                        .unwrap_or_default(),
                    attached_routes: lis_report.map(|r| r.attached_routes()).unwrap_or_default(),
                    conditions: resolve_conditions(
                        lis_report.map(|r| r.conditions()).unwrap_or_default(),
                        &LISTENER_REQUIRED_CONDITIONS,
                        generation,
                        previous_conditions,
                        now,
                    ),
                }
            })
            .collect();

        let previous_conditions = previous
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default();
        let mut conditions = resolve_conditions(
            report.conditions(),
            &GATEWAY_REQUIRED_CONDITIONS,
            generation,
            previous_conditions,
            now,
        );
        preserve_unowned(&mut conditions, previous_conditions);

        Some(GatewayStatus {
            conditions,
            listeners,
        })
    }

    /// Build the status for `route`.
    ///
    /// Returns `None` for unsupported kinds and for routes translation never
    /// touched. Parents come from the report, never from `spec.parentRefs`, so refs to
    /// Gateways owned by other controllers are left out and delegated routes
    /// pick up the parents found during delegation.
    pub fn build_route_status(
        &self,
        route: RouteObject<'_>,
        controller_name: &str,
    ) -> Option<RouteStatus> {
        self.build_route_status_at(route, controller_name, Utc::now())
    }

    pub fn build_route_status_at(
        &self,
        route: RouteObject<'_>,
        controller_name: &str,
        now: DateTime<Utc>,
    ) -> Option<RouteStatus> {
        let existing = match route {
            RouteObject::Http(_) | RouteObject::Tcp(_) | RouteObject::Tls(_) => route.status(),
            RouteObject::Unsupported(_) => {
                error!(
                    kind = route.kind(),
                    namespace = route.namespace(),
                    name = route.name(),
                    "unsupported route type, failed to build route status"
                );
                return None;
            }
        };

        let Some(report) = self.route_report(route) else {
            info!(
                kind = route.kind(),
                namespace = route.namespace(),
                name = route.name(),
                "missing route report"
            );
            return None;
        };

        debug!(
            kind = route.kind(),
            namespace = route.namespace(),
            name = route.name(),
            "building route status"
        );

        let parents = report
            .parents()
            .iter()
            .map(|entry| {
                let previous_conditions = existing
                    .and_then(|status| {
                        status.parents.iter().find(|p| {
                            ParentRefKey::normalize(&p.parent_ref, report.namespace()) == entry.key
                        })
                    })
                    .map(|p| p.conditions.as_slice())
                    .unwrap_or_default();

                let mut conditions = resolve_conditions(
                    entry.report.conditions(),
                    &PARENT_REF_REQUIRED_CONDITIONS,
                    report.observed_generation(),
                    previous_conditions,
                    now,
                );
                preserve_unowned(&mut conditions, previous_conditions);

                RouteParentStatus {
                    parent_ref: entry.parent_ref.clone(),
                    controller_name: controller_name.to_string(),
                    conditions,
                }
            })
            .collect();

        Some(RouteStatus { parents })
    }
}

/// Fill defaults, stamp generation and carry transition times forward
fn resolve_conditions(
    reported: &[ReportCondition],
    required: &[RequiredCondition],
    observed_generation: i64,
    previous: &[Condition],
    now: DateTime<Utc>,
) -> Vec<Condition> {
    let defaults = required
        .iter()
        .filter(|req| find_condition(reported, req.type_).is_none())
        .map(|req| req.to_report_condition());

    reported
        .iter()
        .cloned()
        .chain(defaults)
        .map(|cond| {
            let last_transition_time = match find_condition(previous, &cond.type_) {
                Some(old) if old.status == cond.status => old.last_transition_time,
                _ => now,
            };
            Condition {
                type_: cond.type_,
                status: cond.status,
                observed_generation: Some(observed_generation),
                last_transition_time,
                reason: cond.reason,
                message: cond.message,
            }
        })
        .collect()
}

/// Keep conditions written by someone else
fn preserve_unowned(conditions: &mut Vec<Condition>, previous: &[Condition]) {
    for old in previous {
        if find_condition(conditions.as_slice(), &old.type_).is_none() {
            conditions.push(old.clone());
        }
    }
}
