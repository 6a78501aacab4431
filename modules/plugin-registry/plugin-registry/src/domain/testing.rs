//! In-memory repositories for tests.
//!
//! One struct backs all repository traits with the same semantics the
//! sea-orm layer provides, including the composite atomic operations, so
//! service tests exercise the real decision logic end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use plugin_registry_sdk::models::{
    BillingPeriod, Plan, PluginScope, PurchaseSubscription, RevocationOutcome, Subscription,
    TenantEnablement,
};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::domain::error::DomainError;
use crate::domain::repo::{
    EnablementRepository, PlanCatalog, PluginDirectory, SubscriptionRepository,
};
use crate::domain::service::{
    EnablementService, EntitlementService, RevocationService, SubscriptionService,
};
use crate::infra::cache::EntitlementCache;

#[derive(Default)]
struct State {
    plans: HashMap<Uuid, Plan>,
    /// `None` means every plugin id is considered known.
    known_plugins: Option<Vec<Uuid>>,
    enablements: HashMap<Uuid, TenantEnablement>,
    subscriptions: HashMap<Uuid, Subscription>,
}

#[derive(Default)]
pub(crate) struct InMemoryRegistry {
    state: Mutex<State>,
}

impl InMemoryRegistry {
    pub fn seed_plan(&self, plan: Plan) {
        self.lock().plans.insert(plan.id, plan);
    }

    pub fn set_known_plugins(&self, plugins: Vec<Uuid>) {
        self.lock().known_plugins = Some(plugins);
    }

    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    pub fn enablement_count(&self) -> usize {
        self.lock().enablements.len()
    }

    pub fn put_enablement(&self, record: TenantEnablement) {
        self.lock().enablements.insert(record.id, record);
    }

    pub fn put_subscription(&self, sub: Subscription) {
        self.lock().subscriptions.insert(sub.id, sub);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl PlanCatalog for InMemoryRegistry {
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, DomainError> {
        Ok(self.lock().plans.get(&plan_id).cloned())
    }
}

#[async_trait]
impl PluginDirectory for InMemoryRegistry {
    async fn plugin_exists(&self, plugin_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .known_plugins
            .as_ref()
            .is_none_or(|known| known.contains(&plugin_id)))
    }
}

fn key_of(e: &TenantEnablement) -> (Uuid, Uuid, Option<Uuid>) {
    (e.plugin_id, e.tenant_id, e.organization_id)
}

#[async_trait]
impl EnablementRepository for InMemoryRegistry {
    async fn get(&self, id: Uuid) -> Result<Option<TenantEnablement>, DomainError> {
        Ok(self.lock().enablements.get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
    ) -> Result<Option<TenantEnablement>, DomainError> {
        Ok(self
            .lock()
            .enablements
            .values()
            .find(|e| key_of(e) == (plugin_id, tenant_id, organization_id))
            .cloned())
    }

    async fn create_if_absent(
        &self,
        record: TenantEnablement,
    ) -> Result<TenantEnablement, DomainError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .enablements
            .values()
            .find(|e| key_of(e) == key_of(&record))
        {
            return Ok(existing.clone());
        }
        state.enablements.insert(record.id, record.clone());
        Ok(record)
    }

    async fn insert(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError> {
        let mut state = self.lock();
        if state
            .enablements
            .values()
            .any(|e| key_of(e) == key_of(&record))
        {
            return Err(DomainError::conflict(
                "a plugin tenant record already exists for this plugin and tenant",
            ));
        }
        state.enablements.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError> {
        let mut state = self.lock();
        if !state.enablements.contains_key(&record.id) {
            return Err(DomainError::not_found("TenantEnablement", record.id));
        }
        state.enablements.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError> {
        Ok(self
            .lock()
            .enablements
            .values()
            .filter(|e| e.plugin_id == plugin_id)
            .cloned()
            .collect())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError> {
        Ok(self
            .lock()
            .enablements
            .values()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<RevocationOutcome, DomainError> {
        let mut state = self.lock();
        let enablement_deleted = state.enablements.remove(&id).is_some();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|_, s| s.plugin_tenant_id != id);
        Ok(RevocationOutcome {
            enablement_deleted,
            subscriptions_deleted: (before - state.subscriptions.len()) as u64,
        })
    }
}

fn sub_key(s: &Subscription) -> (Uuid, Uuid, Option<Uuid>, Option<Uuid>) {
    (s.plugin_id, s.tenant_id, s.organization_id, s.subscriber_id)
}

#[async_trait]
impl SubscriptionRepository for InMemoryRegistry {
    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        Ok(self.lock().subscriptions.get(&id).cloned())
    }

    async fn find_for_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
        subscriber_id: Option<Uuid>,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .lock()
            .subscriptions
            .values()
            .filter(|s| sub_key(s) == (plugin_id, tenant_id, organization_id, subscriber_id))
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn list_live_for_plugin_tenant(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .lock()
            .subscriptions
            .values()
            .filter(|s| {
                s.plugin_id == plugin_id && s.tenant_id == tenant_id && s.status.is_live()
            })
            .cloned()
            .collect())
    }

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .lock()
            .subscriptions
            .values()
            .filter(|s| s.plugin_id == plugin_id)
            .cloned()
            .collect())
    }

    async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .lock()
            .subscriptions
            .values()
            .filter(|s| s.subscriber_id == Some(subscriber_id))
            .cloned()
            .collect())
    }

    async fn insert_unique(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError> {
        let mut state = self.lock();
        if state
            .subscriptions
            .values()
            .any(|s| sub_key(s) == sub_key(&subscription) && s.status.is_live())
        {
            return Err(DomainError::conflict(
                "a live subscription already exists for this key",
            ));
        }
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn replace_terminal(
        &self,
        old_id: Uuid,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError> {
        let mut state = self.lock();
        let replaceable = state
            .subscriptions
            .get(&old_id)
            .is_some_and(|old| old.status.is_terminal());
        if !replaceable {
            return Err(DomainError::conflict(
                "the subscription being replaced is no longer terminal",
            ));
        }
        state.subscriptions.remove(&old_id);
        if state
            .subscriptions
            .values()
            .any(|s| sub_key(s) == sub_key(&subscription) && s.status.is_live())
        {
            return Err(DomainError::conflict(
                "a live subscription already exists for this key",
            ));
        }
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let mut state = self.lock();
        if !state.subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::not_found("Subscription", subscription.id));
        }
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn revoke_atomic(
        &self,
        subscription_id: Uuid,
        enablement_id: Uuid,
        remove_allowed_user: Option<Uuid>,
        cascade_enablement: bool,
    ) -> Result<RevocationOutcome, DomainError> {
        let mut state = self.lock();

        if let Some(user) = remove_allowed_user {
            if let Some(enablement) = state.enablements.get_mut(&enablement_id) {
                enablement.allowed_user_ids.retain(|u| *u != user);
            }
        }

        if cascade_enablement {
            let enablement_deleted = state.enablements.remove(&enablement_id).is_some();
            let before = state.subscriptions.len();
            state
                .subscriptions
                .retain(|_, s| s.plugin_tenant_id != enablement_id);
            Ok(RevocationOutcome {
                enablement_deleted,
                subscriptions_deleted: (before - state.subscriptions.len()) as u64,
            })
        } else {
            let removed = state.subscriptions.remove(&subscription_id).is_some();
            Ok(RevocationOutcome {
                enablement_deleted: false,
                subscriptions_deleted: u64::from(removed),
            })
        }
    }
}

/// Fully wired services over the in-memory registry.
pub(crate) struct TestHarness {
    pub store: Arc<InMemoryRegistry>,
    pub cache: Arc<EntitlementCache>,
    pub enablements: Arc<EnablementService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub entitlements: Arc<EntitlementService>,
    pub revocations: Arc<RevocationService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_cache_ttl(Duration::from_secs(30))
    }

    pub fn with_cache_ttl(ttl: Duration) -> Self {
        let store = Arc::new(InMemoryRegistry::default());
        let cache = Arc::new(EntitlementCache::new(ttl));

        let enablements = Arc::new(EnablementService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionService::new(
            store.clone(),
            store.clone(),
            enablements.clone(),
            cache.clone(),
            RegistryConfig::default(),
        ));
        let entitlements = Arc::new(EntitlementService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
        ));
        let revocations = Arc::new(RevocationService::new(
            store.clone(),
            store.clone(),
            cache.clone(),
        ));

        Self {
            store,
            cache,
            enablements,
            subscriptions,
            entitlements,
            revocations,
        }
    }
}

pub(crate) fn plan_fixture(plugin_id: Uuid, period: BillingPeriod) -> Plan {
    let now = Utc::now();
    Plan {
        id: Uuid::new_v4(),
        plugin_id,
        name: "plan".to_owned(),
        billing_period: period,
        is_free: false,
        has_trial: false,
        trial_days: None,
        has_limitations: false,
        limitations: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn enablement_fixture(plugin_id: Uuid, tenant_id: Uuid) -> TenantEnablement {
    let now = Utc::now();
    TenantEnablement {
        id: Uuid::now_v7(),
        plugin_id,
        tenant_id,
        organization_id: None,
        scope: PluginScope::Tenant,
        enabled: true,
        auto_install: false,
        requires_approval: false,
        is_mandatory: false,
        max_installations: None,
        max_active_users: None,
        current_installations: 0,
        current_active_users: 0,
        tenant_configuration: None,
        preferences: None,
        allowed_role_ids: Vec::new(),
        allowed_user_ids: Vec::new(),
        denied_user_ids: Vec::new(),
        approved_by_id: None,
        approved_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn purchase_fixture(plugin_id: Uuid, tenant_id: Uuid) -> PurchaseSubscription {
    PurchaseSubscription {
        plugin_id,
        scope: PluginScope::User,
        plan_id: None,
        auto_renew: false,
        payment_method: None,
        promo_code: None,
        metadata: None,
        tenant_id,
        organization_id: None,
        subscriber_id: Some(Uuid::new_v4()),
    }
}
