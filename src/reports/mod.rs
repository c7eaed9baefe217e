//! Translation outcome reporting
//!
//! Translators record conditions into a [`ReportMap`] during a pass; the map
//! then builds Gateway and Route status for the API client to persist.

pub mod conditions;
mod report_map;
mod status;


pub use conditions::{ReportCondition, RequiredCondition};
pub use report_map::{
    ConditionReport, GatewayReport, ListenerReport, ObjectKey, ParentRefEntry, ParentRefKey,
    ParentRefReport, ReportMap, RouteKey, RouteReport,
};
