use async_trait::async_trait;
use plugin_registry_sdk::models::{Plan, RevocationOutcome, Subscription, TenantEnablement};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Read-only access to the subscription plan catalog.
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, DomainError>;
}

/// Identity of known plugins. Owned by the surrounding platform; this module
/// only asks whether an id refers to a real plugin.
#[async_trait]
pub trait PluginDirectory: Send + Sync {
    async fn plugin_exists(&self, plugin_id: Uuid) -> Result<bool, DomainError>;
}

/// Persistence of tenant enablement records.
///
/// At most one record exists per (plugin, tenant, organization) key; the
/// write methods uphold that invariant.
#[async_trait]
pub trait EnablementRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<TenantEnablement>, DomainError>;

    async fn find_by_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
    ) -> Result<Option<TenantEnablement>, DomainError>;

    /// Idempotent creation: when a record for the key already exists it is
    /// returned unchanged, quotas and all. Safe under concurrent callers.
    async fn create_if_absent(
        &self,
        record: TenantEnablement,
    ) -> Result<TenantEnablement, DomainError>;

    /// Strict insert: fails with [`DomainError::Conflict`] when a record for
    /// the key already exists.
    async fn insert(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError>;

    /// Full-row update by id.
    async fn update(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError>;

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError>;

    /// Hard-delete the record and, in the same transaction, every
    /// subscription referencing it.
    async fn delete_cascade(&self, id: Uuid) -> Result<RevocationOutcome, DomainError>;
}

/// Persistence of subscriptions.
///
/// The live-uniqueness invariant (at most one pending/trial/active row per
/// (plugin, subscriber, tenant, organization) key) is enforced here: the
/// composite write methods run in one transaction backed by the partial
/// unique index, so a concurrent duplicate purchase surfaces as `Conflict`
/// instead of a second live row.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, DomainError>;

    /// The subscription for an exact key, any status. When several historic
    /// rows exist the most recent one governs.
    async fn find_for_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
        subscriber_id: Option<Uuid>,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Every live subscription of a plugin within a tenant, across scopes.
    async fn list_live_for_plugin_tenant(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError>;

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<Subscription>, DomainError>;

    async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError>;

    /// Insert a new subscription, failing with `Conflict` when a live row
    /// already exists for the key.
    async fn insert_unique(&self, subscription: Subscription)
        -> Result<Subscription, DomainError>;

    /// Atomically replace a terminal row with its successor: the delete and
    /// the insert commit together or not at all. Fails with `Conflict` when
    /// the old row is no longer terminal (or has already been replaced).
    async fn replace_terminal(
        &self,
        old_id: Uuid,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError>;

    /// Full-row update by id.
    async fn update(&self, subscription: Subscription) -> Result<Subscription, DomainError>;

    /// Composite revocation in one transaction: pull `remove_allowed_user`
    /// from the enablement's allowed list, then delete either the one
    /// subscription row or (when `cascade_enablement` is set) the whole
    /// enablement with every subscription under it. Rows that are already
    /// gone count as zero; the call itself stays idempotent.
    async fn revoke_atomic(
        &self,
        subscription_id: Uuid,
        enablement_id: Uuid,
        remove_allowed_user: Option<Uuid>,
        cascade_enablement: bool,
    ) -> Result<RevocationOutcome, DomainError>;
}
