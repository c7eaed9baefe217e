//! Per-pass ledger of translation outcomes
//!
//! A `ReportMap` is created at the start of a translation pass, filled by the
//! translator through `&mut` access, and then handed (shared) to status
//! building. It does no locking: one pass owns one map, and parallel passes
//! use independent maps. The borrow checker enforces the single-writer rule.

use std::collections::BTreeMap;
use std::fmt;

use kube::ResourceExt;

use crate::crd::{
    Gateway, ParentReference, RouteGroupKind, RouteObject, GATEWAY_API_GROUP, GATEWAY_KIND,
};

use super::conditions::{self, ReportCondition};

/// Shared behaviour of every facet that owns a condition list
pub trait ConditionReport {
    fn conditions(&self) -> &[ReportCondition];

    fn conditions_mut(&mut self) -> &mut Vec<ReportCondition>;

    /// Upsert by condition type
    fn set_condition(&mut self, condition: ReportCondition) {
        conditions::set_condition(self.conditions_mut(), condition);
    }
}

/// Namespaced identity of a Gateway
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_gateway(gw: &Gateway) -> Self {
        Self::new(
            gw.namespace().unwrap_or_else(|| "default".to_string()),
            gw.name_any(),
        )
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Identity of a route: kind plus namespaced name
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl RouteKey {
    pub fn from_route(route: RouteObject<'_>) -> Self {
        Self {
            kind: route.kind().to_string(),
            namespace: route.namespace().to_string(),
            name: route.name().to_string(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// A parent reference with defaults filled in, used for lookups
///
/// `{name: gw}` and `{group: gateway.networking.k8s.io, kind: Gateway,
/// namespace: <route ns>, name: gw}` address the same parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentRefKey {
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub section_name: Option<String>,
    pub port: Option<i32>,
}

impl ParentRefKey {
    pub fn normalize(parent: &ParentReference, route_namespace: &str) -> Self {
        Self {
            group: parent
                .group
                .clone()
                .unwrap_or_else(|| GATEWAY_API_GROUP.to_string()),
            kind: parent.kind.clone().unwrap_or_else(|| GATEWAY_KIND.to_string()),
            namespace: parent
                .namespace
                .clone()
                .unwrap_or_else(|| route_namespace.to_string()),
            name: parent.name.clone(),
            section_name: parent.section_name.clone(),
            port: parent.port,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReportMap {
    gateways: BTreeMap<ObjectKey, GatewayReport>,
    routes: BTreeMap<RouteKey, RouteReport>,
}

impl ReportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for `gw`, created on first access
    pub fn gateway(&mut self, gw: &Gateway) -> &mut GatewayReport {
        let generation = gw.metadata.generation.unwrap_or_default();
        self.gateways
            .entry(ObjectKey::from_gateway(gw))
            .or_insert_with(|| GatewayReport::new(generation))
    }

    pub fn gateway_report(&self, gw: &Gateway) -> Option<&GatewayReport> {
        self.gateways.get(&ObjectKey::from_gateway(gw))
    }

    /// Report for `route`, created on first access.
    ///
    /// A new report is seeded with the route's spec parent refs in spec order;
    /// refs added later (e.g. while resolving delegation) follow in first-seen
    /// order.
    pub fn route(&mut self, route: RouteObject<'_>) -> &mut RouteReport {
        self.routes
            .entry(RouteKey::from_route(route))
            .or_insert_with(|| RouteReport::seeded(route))
    }

    pub fn route_report(&self, route: RouteObject<'_>) -> Option<&RouteReport> {
        self.routes.get(&RouteKey::from_route(route))
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty() && self.routes.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct GatewayReport {
    observed_generation: i64,
    conditions: Vec<ReportCondition>,
    listeners: BTreeMap<String, ListenerReport>,
}

impl GatewayReport {
    fn new(observed_generation: i64) -> Self {
        Self {
            observed_generation,
            ..Default::default()
        }
    }

    pub fn observed_generation(&self) -> i64 {
        self.observed_generation
    }

    /// Report for the listener called `name`, created on first access
    pub fn listener(&mut self, name: &str) -> &mut ListenerReport {
        self.listeners.entry(name.to_string()).or_default()
    }

    pub fn listener_report(&self, name: &str) -> Option<&ListenerReport> {
        self.listeners.get(name)
    }
}

impl ConditionReport for GatewayReport {
    fn conditions(&self) -> &[ReportCondition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<ReportCondition> {
        &mut self.conditions
    }
}

#[derive(Clone, Debug, Default)]
pub struct ListenerReport {
    conditions: Vec<ReportCondition>,
    attached_routes: i32,
    supported_kinds: Vec<RouteGroupKind>,
}

impl ListenerReport {
    pub fn attached_routes(&self) -> i32 {
        self.attached_routes
    }

    pub fn set_attached_routes(&mut self, count: i32) {
        self.attached_routes = count;
    }

    pub fn supported_kinds(&self) -> &[RouteGroupKind] {
        &self.supported_kinds
    }

    pub fn set_supported_kinds(&mut self, kinds: Vec<RouteGroupKind>) {
        self.supported_kinds = kinds;
    }
}

impl ConditionReport for ListenerReport {
    fn conditions(&self) -> &[ReportCondition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<ReportCondition> {
        &mut self.conditions
    }
}

/// One parent of a route as first seen, plus its outcome
#[derive(Clone, Debug)]
pub struct ParentRefEntry {
    pub key: ParentRefKey,
    pub parent_ref: ParentReference,
    pub report: ParentRefReport,
}

#[derive(Clone, Debug, Default)]
pub struct RouteReport {
    observed_generation: i64,
    namespace: String,
    parents: Vec<ParentRefEntry>,
}

impl RouteReport {
    fn seeded(route: RouteObject<'_>) -> Self {
        let mut report = Self {
            observed_generation: route.generation(),
            namespace: route.namespace().to_string(),
            parents: Vec::new(),
        };
        for parent in route.spec_parent_refs() {
            report.parent_ref(parent);
        }
        report
    }

    pub fn observed_generation(&self) -> i64 {
        self.observed_generation
    }

    /// Report for `parent`, created on first access
    pub fn parent_ref(&mut self, parent: &ParentReference) -> &mut ParentRefReport {
        let key = ParentRefKey::normalize(parent, &self.namespace);
        let idx = match self.parents.iter().position(|p| p.key == key) {
            Some(idx) => idx,
            None => {
                self.parents.push(ParentRefEntry {
                    key,
                    parent_ref: parent.clone(),
                    report: ParentRefReport::default(),
                });
                self.parents.len() - 1
            }
        };
        &mut self.parents[idx].report
    }

    pub fn parent_ref_report(&self, parent: &ParentReference) -> Option<&ParentRefReport> {
        let key = ParentRefKey::normalize(parent, &self.namespace);
        self.parents
            .iter()
            .find(|p| p.key == key)
            .map(|p| &p.report)
    }

    /// Parents in first-seen order
    pub fn parents(&self) -> &[ParentRefEntry] {
        &self.parents
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParentRefReport {
    conditions: Vec<ReportCondition>,
}

impl ConditionReport for ParentRefReport {
    fn conditions(&self) -> &[ReportCondition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<ReportCondition> {
        &mut self.conditions
    }
}
