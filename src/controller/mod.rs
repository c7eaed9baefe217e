//! Controller module for Gateway translation passes
//! This module drives one pass from translated Gateways to cached snapshots
//! and built statuses.

mod route_checks;
mod syncer;

pub use route_checks::check_http_route_paths;
pub use syncer::{ProxyResources, SyncOutcome, Translator, XdsSyncer};
