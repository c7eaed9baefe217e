//! Condition management helpers following Gateway API conventions

use crate::crd::{Condition, ConditionStatus};

/// Standard condition types
pub const CONDITION_TYPE_ACCEPTED: &str = "Accepted";
pub const CONDITION_TYPE_PROGRAMMED: &str = "Programmed";
pub const CONDITION_TYPE_CONFLICTED: &str = "Conflicted";
pub const CONDITION_TYPE_RESOLVED_REFS: &str = "ResolvedRefs";

/// Canonical reasons for the healthy state of each type
pub const REASON_ACCEPTED: &str = "Accepted";
pub const REASON_PROGRAMMED: &str = "Programmed";
pub const REASON_NO_CONFLICTS: &str = "NoConflicts";
pub const REASON_RESOLVED_REFS: &str = "ResolvedRefs";

/// Reasons translators commonly report for negative outcomes
pub const REASON_INVALID: &str = "Invalid";
pub const REASON_UNSUPPORTED_VALUE: &str = "UnsupportedValue";
pub const REASON_ADDRESS_NOT_USABLE: &str = "AddressNotUsable";
pub const REASON_INVALID_ROUTE_KINDS: &str = "InvalidRouteKinds";
pub const REASON_INVALID_CERTIFICATE_REF: &str = "InvalidCertificateRef";
pub const REASON_HOSTNAME_CONFLICT: &str = "HostnameConflict";
pub const REASON_PROTOCOL_CONFLICT: &str = "ProtocolConflict";
pub const REASON_BACKEND_NOT_FOUND: &str = "BackendNotFound";
pub const REASON_NOT_ALLOWED_BY_LISTENERS: &str = "NotAllowedByListeners";
pub const REASON_NO_MATCHING_PARENT: &str = "NoMatchingParent";

/// An outcome recorded during translation
///
/// Carries no timestamp or generation; both are resolved against the object's
/// previous status when status is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportCondition {
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
}

impl ReportCondition {
    pub fn new(type_: &str, status: ConditionStatus, reason: &str) -> Self {
        Self {
            type_: type_.to_string(),
            status,
            reason: reason.to_string(),
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// A condition type that must always appear in built status
#[derive(Clone, Copy, Debug)]
pub struct RequiredCondition {
    pub type_: &'static str,
    pub status: ConditionStatus,
    pub reason: &'static str,
}

impl RequiredCondition {
    const fn new(type_: &'static str, status: ConditionStatus, reason: &'static str) -> Self {
        Self {
            type_,
            status,
            reason,
        }
    }

    pub fn to_report_condition(self) -> ReportCondition {
        ReportCondition::new(self.type_, self.status, self.reason)
    }
}

pub const GATEWAY_REQUIRED_CONDITIONS: [RequiredCondition; 2] = [
    RequiredCondition::new(CONDITION_TYPE_ACCEPTED, ConditionStatus::True, REASON_ACCEPTED),
    RequiredCondition::new(CONDITION_TYPE_PROGRAMMED, ConditionStatus::True, REASON_PROGRAMMED),
];

pub const LISTENER_REQUIRED_CONDITIONS: [RequiredCondition; 4] = [
    RequiredCondition::new(CONDITION_TYPE_ACCEPTED, ConditionStatus::True, REASON_ACCEPTED),
    RequiredCondition::new(
        CONDITION_TYPE_CONFLICTED,
        ConditionStatus::False,
        REASON_NO_CONFLICTS,
    ),
    RequiredCondition::new(
        CONDITION_TYPE_RESOLVED_REFS,
        ConditionStatus::True,
        REASON_RESOLVED_REFS,
    ),
    RequiredCondition::new(CONDITION_TYPE_PROGRAMMED, ConditionStatus::True, REASON_PROGRAMMED),
];

pub const PARENT_REF_REQUIRED_CONDITIONS: [RequiredCondition; 2] = [
    RequiredCondition::new(CONDITION_TYPE_ACCEPTED, ConditionStatus::True, REASON_ACCEPTED),
    RequiredCondition::new(
        CONDITION_TYPE_RESOLVED_REFS,
        ConditionStatus::True,
        REASON_RESOLVED_REFS,
    ),
];

/// Anything that carries a condition type
pub trait HasConditionType {
    fn condition_type(&self) -> &str;
}

impl HasConditionType for Condition {
    fn condition_type(&self) -> &str {
        &self.type_
    }
}

impl HasConditionType for ReportCondition {
    fn condition_type(&self) -> &str {
        &self.type_
    }
}

/// Update or add a condition, keyed by type. The last write wins.
pub fn set_condition(conditions: &mut Vec<ReportCondition>, condition: ReportCondition) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        *existing = condition;
    } else {
        conditions.push(condition);
    }
}

/// Find a condition by type
pub fn find_condition<'a, C: HasConditionType>(conditions: &'a [C], type_: &str) -> Option<&'a C> {
    conditions.iter().find(|c| c.condition_type() == type_)
}

/// Check if a condition is true
pub fn is_condition_true(conditions: &[Condition], type_: &str) -> bool {
    find_condition(conditions, type_)
        .map(|c| c.status == ConditionStatus::True)
        .unwrap_or(false)
}
