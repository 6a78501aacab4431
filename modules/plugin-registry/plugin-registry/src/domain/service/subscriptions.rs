use std::sync::Arc;

use chrono::Utc;
use plugin_registry_sdk::models::{
    Plan, PluginScope, PurchaseSubscription, Subscription, SubscriptionStatus, PROMO_CODE_KEY,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::domain::error::DomainError;
use crate::domain::plan::{billing_period_end, trial_end, PlanKind};
use crate::domain::repo::{PlanCatalog, SubscriptionRepository};
use crate::domain::service::enablement::{EnablementService, QuotaHints};
use crate::infra::cache::EntitlementCache;

/// Subscription Lifecycle Manager: creates, transitions and deletes
/// subscription records for a (plugin, subscriber, tenant, organization) key.
pub struct SubscriptionService {
    plans: Arc<dyn PlanCatalog>,
    repo: Arc<dyn SubscriptionRepository>,
    enablements: Arc<EnablementService>,
    cache: Arc<EntitlementCache>,
    config: RegistryConfig,
}

impl SubscriptionService {
    pub fn new(
        plans: Arc<dyn PlanCatalog>,
        repo: Arc<dyn SubscriptionRepository>,
        enablements: Arc<EnablementService>,
        cache: Arc<EntitlementCache>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            plans,
            repo,
            enablements,
            cache,
            config,
        }
    }

    /// Purchase a subscription.
    ///
    /// A live subscription for the same key is a conflict; a terminal one is
    /// replaced atomically so the new row never coexists with the old.
    #[instrument(skip(self, cmd), fields(plugin_id = %cmd.plugin_id, tenant_id = %cmd.tenant_id, scope = ?cmd.scope))]
    pub async fn purchase(&self, cmd: PurchaseSubscription) -> Result<Subscription, DomainError> {
        validate_purchase(&cmd)?;

        let plan = match cmd.plan_id {
            Some(plan_id) => Some(self.load_purchasable_plan(plan_id, cmd.plugin_id).await?),
            None => None,
        };

        let existing = self
            .repo
            .find_for_key(
                cmd.plugin_id,
                cmd.tenant_id,
                cmd.organization_id,
                cmd.subscriber_id,
            )
            .await?;

        if let Some(live) = existing.as_ref().filter(|s| s.status.is_live()) {
            debug!(existing_id = %live.id, status = ?live.status, "Live subscription already present");
            return Err(DomainError::conflict(
                "an active subscription already exists for this plugin; \
                 upgrade or downgrade it instead of purchasing again",
            ));
        }

        let hints = plan
            .as_ref()
            .filter(|p| p.has_limitations)
            .map(|p| QuotaHints {
                max_installations: p.limitation_i32("maxInstallations"),
                max_active_users: p.limitation_i32("maxActiveUsers"),
            })
            .unwrap_or_default();

        let enablement = self
            .enablements
            .find_or_create(
                cmd.plugin_id,
                cmd.tenant_id,
                cmd.organization_id,
                cmd.scope,
                hints,
            )
            .await?;

        let now = Utc::now();
        let kind = plan
            .as_ref()
            .map(|p| PlanKind::of(p, self.config.default_trial_days));

        let (status, scope, end_date, payment_method) = match kind {
            // A plan-less grant is always personal and immediate.
            None => (
                SubscriptionStatus::Active,
                PluginScope::User,
                None,
                None,
            ),
            Some(PlanKind::Free) => (SubscriptionStatus::Active, cmd.scope, None, None),
            Some(PlanKind::Trial { days }) => (
                SubscriptionStatus::Trial,
                cmd.scope,
                Some(trial_end(now, days)),
                None,
            ),
            Some(PlanKind::Paid { period }) => (
                SubscriptionStatus::Pending,
                cmd.scope,
                Some(billing_period_end(now, period)),
                cmd.payment_method.clone(),
            ),
        };

        let mut metadata = cmd.metadata.clone().unwrap_or_default();
        if let Some(promo) = &cmd.promo_code {
            metadata.insert(
                PROMO_CODE_KEY.to_owned(),
                serde_json::Value::String(promo.clone()),
            );
        }

        let subscription = Subscription {
            id: Uuid::now_v7(),
            plugin_id: cmd.plugin_id,
            plugin_tenant_id: enablement.id,
            tenant_id: cmd.tenant_id,
            organization_id: cmd.organization_id,
            subscriber_id: cmd.subscriber_id,
            plan_id: cmd.plan_id,
            scope,
            status,
            start_date: now,
            end_date,
            auto_renew: cmd.auto_renew,
            payment_method,
            metadata: (!metadata.is_empty()).then_some(metadata),
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let persisted = match existing {
            Some(stale) => {
                debug!(stale_id = %stale.id, "Replacing terminal subscription for key");
                self.repo.replace_terminal(stale.id, subscription).await?
            }
            None => self.repo.insert_unique(subscription).await?,
        };

        self.cache
            .invalidate_plugin_tenant(cmd.plugin_id, cmd.tenant_id);
        info!(subscription_id = %persisted.id, status = ?persisted.status, "Purchased subscription");
        Ok(persisted)
    }

    /// Payment confirmed: `pending`/`trial` becomes `active`. The billing
    /// horizon restarts from now when a plan is attached.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn activate(&self, id: Uuid) -> Result<Subscription, DomainError> {
        let mut sub = self.get(id).await?;
        ensure_transition(&sub, SubscriptionStatus::Active)?;

        let now = Utc::now();
        sub.status = SubscriptionStatus::Active;
        sub.end_date = match sub.plan_id {
            Some(plan_id) => {
                let plan = self
                    .plans
                    .get_plan(plan_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Plan", plan_id))?;
                Some(billing_period_end(now, plan.billing_period))
            }
            None => None,
        };
        sub.updated_at = now;

        let updated = self.repo.update(sub).await?;
        self.cache
            .invalidate_plugin_tenant(updated.plugin_id, updated.tenant_id);
        info!("Activated subscription");
        Ok(updated)
    }

    /// Trial or billing period ended without renewal.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn expire(&self, id: Uuid) -> Result<Subscription, DomainError> {
        let mut sub = self.get(id).await?;
        ensure_transition(&sub, SubscriptionStatus::Expired)?;

        let now = Utc::now();
        sub.status = SubscriptionStatus::Expired;
        sub.end_date = Some(sub.end_date.map_or(now, |end| end.min(now)));
        sub.updated_at = now;

        let updated = self.repo.update(sub).await?;
        self.cache
            .invalidate_plugin_tenant(updated.plugin_id, updated.tenant_id);
        info!("Expired subscription");
        Ok(updated)
    }

    /// Explicit cancellation of any live subscription.
    #[instrument(skip(self, reason), fields(subscription_id = %id))]
    pub async fn cancel(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Subscription, DomainError> {
        let mut sub = self.get(id).await?;
        ensure_transition(&sub, SubscriptionStatus::Cancelled)?;

        let now = Utc::now();
        sub.status = SubscriptionStatus::Cancelled;
        sub.cancelled_at = Some(now);
        sub.cancellation_reason = reason;
        sub.updated_at = now;

        let updated = self.repo.update(sub).await?;
        self.cache
            .invalidate_plugin_tenant(updated.plugin_id, updated.tenant_id);
        info!("Cancelled subscription");
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<Subscription, DomainError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Subscription", id))
    }

    pub async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<Subscription>, DomainError> {
        self.repo.list_by_plugin(plugin_id).await
    }

    pub async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError> {
        self.repo.list_by_subscriber(subscriber_id).await
    }

    /// The subscription for an exact key, regardless of status.
    pub async fn find_for_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
        subscriber_id: Option<Uuid>,
    ) -> Result<Option<Subscription>, DomainError> {
        self.repo
            .find_for_key(plugin_id, tenant_id, organization_id, subscriber_id)
            .await
    }

    async fn load_purchasable_plan(
        &self,
        plan_id: Uuid,
        plugin_id: Uuid,
    ) -> Result<Plan, DomainError> {
        let plan = self
            .plans
            .get_plan(plan_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DomainError::not_found("Plan", plan_id))?;

        if plan.plugin_id != plugin_id {
            return Err(DomainError::invalid_argument(
                "the selected plan belongs to a different plugin",
            ));
        }
        Ok(plan)
    }
}

fn validate_purchase(cmd: &PurchaseSubscription) -> Result<(), DomainError> {
    match cmd.scope {
        PluginScope::Organization if cmd.organization_id.is_none() => Err(
            DomainError::invalid_argument("organization_id is required for organization scope"),
        ),
        PluginScope::User if cmd.subscriber_id.is_none() => Err(DomainError::invalid_argument(
            "subscriber_id is required for user scope",
        )),
        // A plan-less grant is forced to user scope, so it needs a subscriber
        // no matter which scope was requested.
        _ if cmd.plan_id.is_none() && cmd.subscriber_id.is_none() => Err(
            DomainError::invalid_argument("subscriber_id is required when no plan is specified"),
        ),
        _ => Ok(()),
    }
}

fn ensure_transition(sub: &Subscription, next: SubscriptionStatus) -> Result<(), DomainError> {
    if sub.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(DomainError::invalid_argument(format!(
            "illegal subscription transition {:?} -> {next:?}",
            sub.status
        )))
    }
}
