use std::sync::Arc;

use chrono::{DateTime, Utc};
use plugin_registry_sdk::models::{
    AccessDecision, AccessQuery, PluginScope, Subscription, TenantEnablement,
};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::repo::{EnablementRepository, SubscriptionRepository};
use crate::infra::cache::EntitlementCache;

/// Entitlement Checker: the read path consulted before every plugin use.
/// Never mutates state; results are cached until the next write for the key.
pub struct EntitlementService {
    enablements: Arc<dyn EnablementRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    cache: Arc<EntitlementCache>,
}

/// Everything the pure resolution step needs, gathered in one read pass.
struct EntitlementState {
    /// Enablement for the exact (plugin, tenant, organization) key.
    enablement: Option<TenantEnablement>,
    /// Tenant-wide enablement (no organization), when the query is scoped to
    /// an organization.
    tenant_wide: Option<TenantEnablement>,
    /// Live subscriptions of the plugin within the tenant, all scopes.
    live: Vec<Subscription>,
}

impl EntitlementService {
    pub fn new(
        enablements: Arc<dyn EnablementRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        cache: Arc<EntitlementCache>,
    ) -> Self {
        Self {
            enablements,
            subscriptions,
            cache,
        }
    }

    /// May this caller use this plugin right now?
    #[instrument(skip(self, query), fields(plugin_id = %query.plugin_id, tenant_id = %query.tenant_id))]
    pub async fn check_access(&self, query: &AccessQuery) -> Result<AccessDecision, DomainError> {
        if let Some(hit) = self.cache.get(query) {
            debug!("Entitlement cache hit");
            return Ok(hit);
        }

        let state = self.load_state(query).await?;
        let decision = resolve(query, &state, Utc::now());
        self.cache.put(query.clone(), decision.clone());
        debug!(has_access = decision.has_access, "Resolved entitlement");
        Ok(decision)
    }

    /// The governing live subscription for the key, when access is granted.
    #[instrument(skip(self, query), fields(plugin_id = %query.plugin_id, tenant_id = %query.tenant_id))]
    pub async fn find_active_subscription(
        &self,
        query: &AccessQuery,
    ) -> Result<Option<Subscription>, DomainError> {
        let decision = self.check_access(query).await?;
        Ok(decision.subscription.filter(|_| decision.has_access))
    }

    async fn load_state(&self, query: &AccessQuery) -> Result<EntitlementState, DomainError> {
        let enablement = self
            .enablements
            .find_by_key(query.plugin_id, query.tenant_id, query.organization_id)
            .await?;

        let tenant_wide = if query.organization_id.is_some() {
            self.enablements
                .find_by_key(query.plugin_id, query.tenant_id, None)
                .await?
        } else {
            None
        };

        let live = self
            .subscriptions
            .list_live_for_plugin_tenant(query.plugin_id, query.tenant_id)
            .await?;

        Ok(EntitlementState {
            enablement,
            tenant_wide,
            live,
        })
    }
}

/// Pure entitlement resolution.
///
/// Grant sources, most specific scope first: a live user-scope subscription
/// of the subscriber, then an organization-scope subscription of the query's
/// organization, then a tenant-scope subscription, then an enabled
/// tenant-wide enablement. The enablement's gates (availability, deny list,
/// allow lists, quotas) apply to whichever source grants.
fn resolve(query: &AccessQuery, state: &EntitlementState, now: DateTime<Utc>) -> AccessDecision {
    let governing = state.enablement.as_ref().or(state.tenant_wide.as_ref());
    let subscription = governing_subscription(query, &state.live, now);

    let enablement_grants = governing
        .filter(|e| e.scope == PluginScope::Tenant && e.is_available())
        .is_some();

    let mut reasons = Vec::new();

    if subscription.is_none() && !enablement_grants {
        reasons.push(
            "no live subscription or tenant-wide enablement exists for this plugin".to_owned(),
        );
    }

    if let Some(enablement) = governing {
        if !enablement.enabled {
            reasons.push("plugin is not enabled for this tenant".to_owned());
        } else if enablement.requires_approval && enablement.approved_by_id.is_none() {
            reasons.push("plugin requires approval and has not been approved yet".to_owned());
        }

        if let Some(subscriber) = query.subscriber_id {
            if enablement.denied_user_ids.contains(&subscriber) {
                reasons.push("subscriber is explicitly denied access to this plugin".to_owned());
            } else if !enablement.has_user_access(subscriber, &query.role_ids) {
                reasons.push(
                    "subscriber is not in the allowed users or roles for this plugin".to_owned(),
                );
            }
        }

        if !enablement.can_install_more()
            || (query.subscriber_id.is_some() && !enablement.can_add_more_users())
        {
            reasons.push("installation or user quota has been exceeded".to_owned());
        }
    }

    if reasons.is_empty() {
        AccessDecision::granted(subscription.cloned())
    } else {
        AccessDecision::denied(reasons)
    }
}

/// Pick the live subscription governing this query: user scope wins over
/// organization scope wins over tenant scope.
fn governing_subscription<'a>(
    query: &AccessQuery,
    live: &'a [Subscription],
    now: DateTime<Utc>,
) -> Option<&'a Subscription> {
    let candidates: Vec<&Subscription> = live
        .iter()
        .filter(|s| s.grants_access_at(now) && org_compatible(s, query))
        .collect();

    let user_match = |s: &&Subscription| {
        s.scope == PluginScope::User
            && query.subscriber_id.is_some()
            && s.subscriber_id == query.subscriber_id
    };
    let org_match = |s: &&Subscription| {
        s.scope == PluginScope::Organization
            && query.organization_id.is_some()
            && s.organization_id == query.organization_id
    };
    let tenant_match = |s: &&Subscription| s.scope == PluginScope::Tenant;

    candidates
        .iter()
        .find(|s| user_match(s))
        .or_else(|| candidates.iter().find(|s| org_match(s)))
        .or_else(|| candidates.iter().find(|s| tenant_match(s)))
        .copied()
}

/// A subscription bound to an organization only applies inside it; one with
/// no organization applies tenant-wide.
fn org_compatible(sub: &Subscription, query: &AccessQuery) -> bool {
    sub.organization_id.is_none() || sub.organization_id == query.organization_id
}
