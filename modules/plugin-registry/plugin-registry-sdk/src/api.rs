use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::RegistryError;
use crate::models::{
    AccessDecision, AccessQuery, CreateTenantEnablement, PurchaseSubscription, RevocationOutcome,
    Subscription, TenantEnablement,
};

/// Command/query surface of the plugin registry.
///
/// Commands are transactional: they either fully commit or leave no trace.
/// Queries never mutate state and are safe to call on every authorization
/// decision.
#[async_trait]
pub trait PluginRegistryApi: Send + Sync {
    /// Purchase a plugin subscription for a (plugin, subscriber, tenant,
    /// organization) key, resolving conflicts against any existing record.
    async fn purchase_subscription(
        &self,
        cmd: PurchaseSubscription,
    ) -> Result<Subscription, RegistryError>;

    /// Revoke one subscription. Fails with [`RegistryError::Conflict`] when
    /// the subscriber is the enablement's approver; such revocations must go
    /// through [`Self::delete_subscription_cascading`].
    async fn delete_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<RevocationOutcome, RegistryError>;

    /// Revoke a subscription with the approver cascade confirmed: when the
    /// subscriber approved the plugin for the tenant, the whole enablement
    /// and every subscription under it are removed.
    async fn delete_subscription_cascading(
        &self,
        subscription_id: Uuid,
    ) -> Result<RevocationOutcome, RegistryError>;

    /// Administratively create a tenant enablement record. Fails with
    /// `Conflict` when a record already exists for the key and with
    /// `NotFound` when the plugin is unknown.
    async fn create_tenant_enablement(
        &self,
        cmd: CreateTenantEnablement,
    ) -> Result<TenantEnablement, RegistryError>;

    /// Entitlement check: may this caller use this plugin right now?
    async fn check_access(&self, query: AccessQuery) -> Result<AccessDecision, RegistryError>;

    /// The governing live subscription for a key, if any.
    async fn get_active_subscription(
        &self,
        query: AccessQuery,
    ) -> Result<Option<Subscription>, RegistryError>;

    async fn get_subscription(&self, id: Uuid) -> Result<Subscription, RegistryError>;

    async fn subscriptions_by_plugin(
        &self,
        plugin_id: Uuid,
    ) -> Result<Vec<Subscription>, RegistryError>;

    async fn subscriptions_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, RegistryError>;
}
