//! One reconciliation pass: translate, snapshot, build status
//!
//! The syncer owns no Kubernetes client. Callers hand it the Gateways and
//! routes they listed, and persist the statuses it returns.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::ControllerConfig;
use crate::crd::{Gateway, GatewayStatus, RouteObject, RouteStatus};
use crate::reports::{ObjectKey, ReportMap, RouteKey};
use crate::xds::{
    gateway_cache_key, generate_xds_snapshot, Cluster, ClusterLoadAssignment, Listener,
    ResourceHasher, RouteConfiguration, SnapshotCache,
};

/// Envoy resources produced for one Gateway's proxy
#[derive(Clone, Debug, Default)]
pub struct ProxyResources {
    pub clusters: Vec<Cluster>,
    pub endpoints: Vec<ClusterLoadAssignment>,
    pub route_configs: Vec<RouteConfiguration>,
    pub listeners: Vec<Listener>,
}

/// Turns a Gateway and the routes attached to it into proxy config
///
/// Problems are recorded in `reports`. Returning `None` means the Gateway is
/// not handled by this controller and gets no snapshot.
pub trait Translator {
    fn translate_gateway(
        &self,
        gateway: &Gateway,
        routes: &[RouteObject<'_>],
        reports: &mut ReportMap,
    ) -> Option<ProxyResources>;
}

/// Result of one pass, ready for the status writer
#[derive(Clone, Debug, Default)]
pub struct SyncOutcome {
    pub gateway_statuses: Vec<(ObjectKey, GatewayStatus)>,
    pub route_statuses: Vec<(RouteKey, RouteStatus)>,
    /// Node keys whose snapshot was replaced in this pass
    pub changed_keys: Vec<String>,
}

pub struct XdsSyncer<T, H> {
    config: ControllerConfig,
    translator: T,
    hasher: H,
    cache: Arc<SnapshotCache>,
}

impl<T: Translator, H: ResourceHasher> XdsSyncer<T, H> {
    pub fn new(
        config: ControllerConfig,
        translator: T,
        hasher: H,
        cache: Arc<SnapshotCache>,
    ) -> Self {
        Self {
            config,
            translator,
            hasher,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Run one full pass over `gateways` and `routes`
    #[instrument(skip_all, fields(gateways = gateways.len(), routes = routes.len()))]
    pub fn sync(&self, gateways: &[Gateway], routes: &[RouteObject<'_>]) -> SyncOutcome {
        let mut reports = ReportMap::new();
        let translated: Vec<(&Gateway, ProxyResources)> = gateways
            .iter()
            .filter_map(|gw| {
                self.translator
                    .translate_gateway(gw, routes, &mut reports)
                    .map(|res| (gw, res))
            })
            .collect();

        info!("begin sync of {} translated gateways", translated.len());

        let mut outcome = SyncOutcome::default();

        if !self.config.xds_garbage_collection {
            let live: BTreeSet<String> = translated
                .iter()
                .map(|(gw, _)| gateway_cache_key(gw))
                .collect();
            outcome.changed_keys.extend(self.cache.clear_stale(&live));
        }

        for (gw, res) in translated {
            let key = gateway_cache_key(gw);
            let snapshot = generate_xds_snapshot(
                &self.hasher,
                res.clusters,
                res.endpoints,
                res.route_configs,
                res.listeners,
            );
            if self.cache.set_snapshot(&key, snapshot) {
                debug!(key = key.as_str(), "setting xds snapshot");
                outcome.changed_keys.push(key);
            }
        }

        outcome.gateway_statuses = gateways
            .iter()
            .filter_map(|gw| {
                reports
                    .build_gateway_status(gw)
                    .map(|status| (ObjectKey::from_gateway(gw), status))
            })
            .collect();

        outcome.route_statuses = routes
            .iter()
            .filter_map(|route| {
                reports
                    .build_route_status(*route, &self.config.controller_name)
                    .map(|status| (RouteKey::from_route(*route), status))
            })
            .collect();

        info!(
            gateway_statuses = outcome.gateway_statuses.len(),
            route_statuses = outcome.route_statuses.len(),
            changed_snapshots = outcome.changed_keys.len(),
            "end sync"
        );

        outcome
    }
}
