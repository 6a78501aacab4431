use std::sync::Arc;

use plugin_registry_sdk::models::{RevocationOutcome, Subscription, TenantEnablement};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::{EnablementRepository, SubscriptionRepository};
use crate::infra::cache::EntitlementCache;

/// Revocation Handler: reacts to subscriber removal and explicit
/// subscription deletion.
///
/// The approver cascade (removing the user who approved the plugin revokes
/// it for the whole tenant) never fires implicitly: [`Self::revoke`] refuses
/// it with a conflict, and callers confirm by invoking
/// [`Self::revoke_cascading`] instead.
pub struct RevocationService {
    enablements: Arc<dyn EnablementRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    cache: Arc<EntitlementCache>,
}

impl RevocationService {
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

    /// Revoke one subscription: pull the subscriber from the enablement's
    /// allowed list and delete the subscription row, in one transaction.
    ///
    /// Fails with `Conflict` when the subscriber is the enablement's
    /// approver, since that removal would cascade to the whole tenant.
    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    pub async fn revoke(&self, subscription_id: Uuid) -> Result<RevocationOutcome, DomainError> {
        let (sub, enablement) = self.load(subscription_id).await?;

        if is_approver(&sub, enablement.as_ref()) {
            return Err(DomainError::conflict(
                "the subscriber approved this plugin for the tenant; revoking them removes the \
                 plugin for everyone - confirm with the cascading revocation",
            ));
        }

        self.execute(&sub, false).await
    }

    /// Revoke with the approver cascade confirmed. When the subscriber is
    /// the approver, the whole enablement and every subscription under it
    /// are deleted; otherwise this behaves exactly like [`Self::revoke`].
    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    pub async fn revoke_cascading(
        &self,
        subscription_id: Uuid,
    ) -> Result<RevocationOutcome, DomainError> {
        let (sub, enablement) = self.load(subscription_id).await?;
        let cascade = is_approver(&sub, enablement.as_ref());
        if cascade {
            warn!(
                enablement_id = %sub.plugin_tenant_id,
                "Approver revocation: cascading to the whole tenant enablement"
            );
        }
        self.execute(&sub, cascade).await
    }

    /// Offboarding hook: a subscriber is leaving the tenant. Revokes every
    /// subscription they hold in the tenant (cascading where they are the
    /// approver - the approver is genuinely being removed here) and pulls
    /// them from the allowed list of every remaining enablement.
    #[instrument(skip(self), fields(tenant_id = %tenant_id, subscriber_id = %subscriber_id))]
    pub async fn offboard_subscriber(
        &self,
        tenant_id: Uuid,
        subscriber_id: Uuid,
    ) -> Result<RevocationOutcome, DomainError> {
        let subs: Vec<Subscription> = self
            .subscriptions
            .list_by_subscriber(subscriber_id)
            .await?
            .into_iter()
            .filter(|s| s.tenant_id == tenant_id)
            .collect();

        let mut total = RevocationOutcome::default();
        for sub in subs {
            let enablement = self.enablements.get(sub.plugin_tenant_id).await?;
            let cascade = is_approver(&sub, enablement.as_ref());
            let outcome = self
                .subscriptions
                .revoke_atomic(sub.id, sub.plugin_tenant_id, sub.subscriber_id, cascade)
                .await?;
            total.subscriptions_deleted += outcome.subscriptions_deleted;
            total.enablement_deleted |= outcome.enablement_deleted;
            self.cache
                .invalidate_plugin_tenant(sub.plugin_id, sub.tenant_id);
        }

        for enablement in self.enablements.list_by_tenant(tenant_id).await? {
            if enablement.allowed_user_ids.contains(&subscriber_id) {
                let mut record = enablement;
                record.allowed_user_ids.retain(|u| *u != subscriber_id);
                record.updated_at = chrono::Utc::now();
                let updated = self.enablements.update(record).await?;
                self.cache
                    .invalidate_plugin_tenant(updated.plugin_id, updated.tenant_id);
            }
        }

        info!(
            subscriptions_deleted = total.subscriptions_deleted,
            "Offboarded subscriber from tenant"
        );
        Ok(total)
    }

    async fn load(
        &self,
        subscription_id: Uuid,
    ) -> Result<(Subscription, Option<TenantEnablement>), DomainError> {
        let sub = self
            .subscriptions
            .get(subscription_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Subscription", subscription_id))?;
        let enablement = self.enablements.get(sub.plugin_tenant_id).await?;
        Ok((sub, enablement))
    }

    async fn execute(
        &self,
        sub: &Subscription,
        cascade: bool,
    ) -> Result<RevocationOutcome, DomainError> {
        let outcome = self
            .subscriptions
            .revoke_atomic(sub.id, sub.plugin_tenant_id, sub.subscriber_id, cascade)
            .await?;
        self.cache
            .invalidate_plugin_tenant(sub.plugin_id, sub.tenant_id);
        info!(
            subscriptions_deleted = outcome.subscriptions_deleted,
            enablement_deleted = outcome.enablement_deleted,
            "Revoked subscription"
        );
        Ok(outcome)
    }
}

fn is_approver(sub: &Subscription, enablement: Option<&TenantEnablement>) -> bool {
    match (enablement, sub.subscriber_id) {
        (Some(e), Some(subscriber)) => e.approved_by_id == Some(subscriber),
        _ => false,
    }
}
