//! In-process implementation of the registry API.
//!
//! Other modules in the same process consume the registry through
//! [`PluginRegistryApi`]; this client maps the trait onto the domain
//! services and translates `DomainError` into the SDK taxonomy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use plugin_registry_sdk::models::{
    AccessDecision, AccessQuery, CreateTenantEnablement, PurchaseSubscription, RevocationOutcome,
    Subscription, TenantEnablement,
};
use plugin_registry_sdk::{PluginRegistryApi, RegistryError};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::domain::service::{
    EnablementService, EntitlementService, RevocationService, SubscriptionService,
};
use crate::infra::cache::EntitlementCache;
use crate::infra::storage::sea_orm_repo::{
    SeaOrmEnablementRepository, SeaOrmPlanCatalog, SeaOrmSubscriptionRepository,
};

pub struct LocalClient {
    enablements: Arc<EnablementService>,
    subscriptions: Arc<SubscriptionService>,
    entitlements: Arc<EntitlementService>,
    revocations: Arc<RevocationService>,
}

impl LocalClient {
    #[must_use]
    pub fn new(
        enablements: Arc<EnablementService>,
        subscriptions: Arc<SubscriptionService>,
        entitlements: Arc<EntitlementService>,
        revocations: Arc<RevocationService>,
    ) -> Self {
        Self {
            enablements,
            subscriptions,
            entitlements,
            revocations,
        }
    }

    /// Wire the full service stack over a database connection.
    ///
    /// The plugin directory is supplied by the host; modules that own no
    /// plugin catalog pass their platform's directory client.
    #[must_use]
    pub fn with_database(
        db: DatabaseConnection,
        directory: Arc<dyn crate::domain::repo::PluginDirectory>,
        config: RegistryConfig,
    ) -> Self {
        let cache = Arc::new(EntitlementCache::new(Duration::from_secs(
            config.entitlement_cache_ttl_secs,
        )));
        let plans = Arc::new(SeaOrmPlanCatalog::new(db.clone()));
        let enablement_repo = Arc::new(SeaOrmEnablementRepository::new(db.clone()));
        let subscription_repo = Arc::new(SeaOrmSubscriptionRepository::new(db));

        let enablements = Arc::new(EnablementService::new(
            enablement_repo.clone(),
            directory,
            cache.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionService::new(
            plans,
            subscription_repo.clone(),
            enablements.clone(),
            cache.clone(),
            config,
        ));
        let entitlements = Arc::new(EntitlementService::new(
            enablement_repo.clone(),
            subscription_repo.clone(),
            cache.clone(),
        ));
        let revocations = Arc::new(RevocationService::new(
            enablement_repo,
            subscription_repo,
            cache,
        ));

        Self::new(enablements, subscriptions, entitlements, revocations)
    }

    #[must_use]
    pub fn enablements(&self) -> &EnablementService {
        &self.enablements
    }

    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.subscriptions
    }

    #[must_use]
    pub fn entitlements(&self) -> &EntitlementService {
        &self.entitlements
    }

    #[must_use]
    pub fn revocations(&self) -> &RevocationService {
        &self.revocations
    }
}

#[async_trait]
impl PluginRegistryApi for LocalClient {
    async fn purchase_subscription(
        &self,
        cmd: PurchaseSubscription,
    ) -> Result<Subscription, RegistryError> {
        self.subscriptions
            .purchase(cmd)
            .await
            .map_err(RegistryError::from)
    }

    async fn delete_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<RevocationOutcome, RegistryError> {
        self.revocations
            .revoke(subscription_id)
            .await
            .map_err(RegistryError::from)
    }

    async fn delete_subscription_cascading(
        &self,
        subscription_id: Uuid,
    ) -> Result<RevocationOutcome, RegistryError> {
        self.revocations
            .revoke_cascading(subscription_id)
            .await
            .map_err(RegistryError::from)
    }

    async fn create_tenant_enablement(
        &self,
        cmd: CreateTenantEnablement,
    ) -> Result<TenantEnablement, RegistryError> {
        self.enablements
            .create(cmd)
            .await
            .map_err(RegistryError::from)
    }

    async fn check_access(&self, query: AccessQuery) -> Result<AccessDecision, RegistryError> {
        self.entitlements
            .check_access(&query)
            .await
            .map_err(RegistryError::from)
    }

    async fn get_active_subscription(
        &self,
        query: AccessQuery,
    ) -> Result<Option<Subscription>, RegistryError> {
        self.entitlements
            .find_active_subscription(&query)
            .await
            .map_err(RegistryError::from)
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Subscription, RegistryError> {
        self.subscriptions.get(id).await.map_err(RegistryError::from)
    }

    async fn subscriptions_by_plugin(
        &self,
        plugin_id: Uuid,
    ) -> Result<Vec<Subscription>, RegistryError> {
        self.subscriptions
            .list_by_plugin(plugin_id)
            .await
            .map_err(RegistryError::from)
    }

    async fn subscriptions_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, RegistryError> {
        self.subscriptions
            .list_by_subscriber(subscriber_id)
            .await
            .map_err(RegistryError::from)
    }
}
