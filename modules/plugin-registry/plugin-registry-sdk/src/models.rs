//! Public models for the plugin registry module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the plugin registry and its consumers: plan catalog rows, tenant
//! enablement records, subscriptions, and the command/query inputs of the
//! registry API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque JSON maps carried on plans, enablements and subscriptions.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key under which a purchase's promo code is stored.
pub const PROMO_CODE_KEY: &str = "promoCode";

/// Quota sentinel meaning "unlimited" (mirrors the persisted -1 convention).
pub const UNLIMITED: i32 = -1;

/// Breadth of a plugin grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginScope {
    /// One person.
    User,
    /// One organization within a tenant.
    Organization,
    /// The whole tenant.
    Tenant,
}

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    /// Live statuses count toward the per-key uniqueness invariant.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Trial | Self::Active)
    }

    /// Terminal statuses never block a new purchase.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }

    /// Lifecycle state machine: `pending -> active`, `trial -> active | expired`,
    /// `active -> expired`, and any live state `-> cancelled`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending | Self::Trial, Self::Active) => true,
            (Self::Trial | Self::Active, Self::Expired) => true,
            (from, Self::Cancelled) => from.is_live(),
            _ => false,
        }
    }
}

/// Billing cadence of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    OneTime,
    UsageBased,
}

/// Subscription plan catalog row. Immutable from this module's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub name: String,
    pub billing_period: BillingPeriod,
    pub is_free: bool,
    pub has_trial: bool,
    pub trial_days: Option<i32>,
    pub has_limitations: bool,
    pub limitations: Option<Metadata>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Read an integer quota hint from the plan's limitations map.
    #[must_use]
    pub fn limitation_i32(&self, key: &str) -> Option<i32> {
        self.limitations
            .as_ref()
            .and_then(|map| map.get(key))
            .and_then(serde_json::Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    }
}

/// Per-(plugin, tenant, organization) record describing whether and how a
/// plugin is switched on for a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantEnablement {
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub scope: PluginScope,
    pub enabled: bool,
    pub auto_install: bool,
    pub requires_approval: bool,
    pub is_mandatory: bool,
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
    pub current_installations: i32,
    pub current_active_users: i32,
    pub tenant_configuration: Option<Metadata>,
    pub preferences: Option<Metadata>,
    pub allowed_role_ids: Vec<Uuid>,
    pub allowed_user_ids: Vec<Uuid>,
    pub denied_user_ids: Vec<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantEnablement {
    /// Whether the plugin can currently be used under this record at all:
    /// it must be enabled, and approved when approval is required.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && (!self.requires_approval || self.approved_by_id.is_some())
    }

    /// Per-user access decision against the record's access lists.
    ///
    /// The deny list always wins. When neither an allowed-user nor an
    /// allowed-role list is configured, access is unrestricted.
    #[must_use]
    pub fn has_user_access(&self, user_id: Uuid, role_ids: &[Uuid]) -> bool {
        if self.denied_user_ids.contains(&user_id) {
            return false;
        }
        if self.scope == PluginScope::Tenant {
            return true;
        }
        if self.allowed_user_ids.is_empty() && self.allowed_role_ids.is_empty() {
            return true;
        }
        self.allowed_user_ids.contains(&user_id)
            || role_ids.iter().any(|r| self.allowed_role_ids.contains(r))
    }

    /// Whether another installation fits within `max_installations`.
    /// `None` and the -1 sentinel both mean unlimited.
    #[must_use]
    pub fn can_install_more(&self) -> bool {
        within_quota(self.max_installations, self.current_installations)
    }

    /// Whether another active user fits within `max_active_users`.
    #[must_use]
    pub fn can_add_more_users(&self) -> bool {
        within_quota(self.max_active_users, self.current_active_users)
    }
}

fn within_quota(limit: Option<i32>, current: i32) -> bool {
    match limit {
        None | Some(UNLIMITED) => true,
        Some(max) => current < max,
    }
}

/// A time-bounded grant of plugin use tied to a plan and billing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub plugin_tenant_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub scope: PluginScope,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub metadata: Option<Metadata>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Live status and, when an end date is set, not yet past it.
    #[must_use]
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && self.end_date.is_none_or(|end| end > now)
    }
}

/// Purchase command consumed by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSubscription {
    pub plugin_id: Uuid,
    pub scope: PluginScope,
    pub plan_id: Option<Uuid>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub promo_code: Option<String>,
    pub metadata: Option<Metadata>,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
}

/// Administrative creation of a tenant enablement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTenantEnablement {
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub scope: PluginScope,
    pub enabled: bool,
    pub auto_install: bool,
    pub requires_approval: bool,
    pub is_mandatory: bool,
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
    pub tenant_configuration: Option<Metadata>,
    pub preferences: Option<Metadata>,
    pub allowed_role_ids: Vec<Uuid>,
    pub allowed_user_ids: Vec<Uuid>,
    pub denied_user_ids: Vec<Uuid>,
}

/// Entitlement query key. The caller supplies the subscriber's roles
/// explicitly; there is no ambient request context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessQuery {
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
    pub role_ids: Vec<Uuid>,
}

/// Result of an entitlement check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub has_access: bool,
    pub subscription: Option<Subscription>,
    pub denial_reasons: Vec<String>,
}

impl AccessDecision {
    #[must_use]
    pub fn granted(subscription: Option<Subscription>) -> Self {
        Self {
            has_access: true,
            subscription,
            denial_reasons: Vec::new(),
        }
    }

    #[must_use]
    pub fn denied(reasons: Vec<String>) -> Self {
        Self {
            has_access: false,
            subscription: None,
            denial_reasons: reasons,
        }
    }
}

/// Membership list operation for `manage_users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserListOp {
    /// Add to the allowed list (and drop from the denied list).
    Allow,
    /// Add to the denied list (and drop from the allowed list).
    Deny,
    /// Drop from both lists.
    Remove,
}

/// Usage counter adjustment for `record_usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    Install,
    Uninstall,
    Activate,
    Deactivate,
}

/// What a revocation actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevocationOutcome {
    pub enablement_deleted: bool,
    pub subscriptions_deleted: u64,
}
