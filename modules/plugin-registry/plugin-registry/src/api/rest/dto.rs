//! Wire DTOs for the REST surface. Kept separate from the SDK models so the
//! HTTP contract can evolve without touching in-process consumers.

use chrono::{DateTime, Utc};
use plugin_registry_sdk::models as sdk;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScopeDto {
    User,
    Organization,
    Tenant,
}

impl From<ScopeDto> for sdk::PluginScope {
    fn from(value: ScopeDto) -> Self {
        match value {
            ScopeDto::User => Self::User,
            ScopeDto::Organization => Self::Organization,
            ScopeDto::Tenant => Self::Tenant,
        }
    }
}

impl From<sdk::PluginScope> for ScopeDto {
    fn from(value: sdk::PluginScope) -> Self {
        match value {
            sdk::PluginScope::User => Self::User,
            sdk::PluginScope::Organization => Self::Organization,
            sdk::PluginScope::Tenant => Self::Tenant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusDto {
    Pending,
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl From<sdk::SubscriptionStatus> for StatusDto {
    fn from(value: sdk::SubscriptionStatus) -> Self {
        match value {
            sdk::SubscriptionStatus::Pending => Self::Pending,
            sdk::SubscriptionStatus::Trial => Self::Trial,
            sdk::SubscriptionStatus::Active => Self::Active,
            sdk::SubscriptionStatus::Expired => Self::Expired,
            sdk::SubscriptionStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseSubscriptionRequest {
    pub plugin_id: Uuid,
    pub scope: ScopeDto,
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub promo_code: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Option<sdk::Metadata>,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
}

impl From<PurchaseSubscriptionRequest> for sdk::PurchaseSubscription {
    fn from(req: PurchaseSubscriptionRequest) -> Self {
        Self {
            plugin_id: req.plugin_id,
            scope: req.scope.into(),
            plan_id: req.plan_id,
            auto_renew: req.auto_renew,
            payment_method: req.payment_method,
            promo_code: req.promo_code,
            metadata: req.metadata,
            tenant_id: req.tenant_id,
            organization_id: req.organization_id,
            subscriber_id: req.subscriber_id,
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePluginTenantRequest {
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub scope: ScopeDto,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub auto_install: bool,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub is_mandatory: bool,
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
    #[schema(value_type = Object)]
    pub tenant_configuration: Option<sdk::Metadata>,
    #[schema(value_type = Object)]
    pub preferences: Option<sdk::Metadata>,
    #[serde(default)]
    pub allowed_role_ids: Vec<Uuid>,
    #[serde(default)]
    pub allowed_user_ids: Vec<Uuid>,
    #[serde(default)]
    pub denied_user_ids: Vec<Uuid>,
}

impl From<CreatePluginTenantRequest> for sdk::CreateTenantEnablement {
    fn from(req: CreatePluginTenantRequest) -> Self {
        Self {
            plugin_id: req.plugin_id,
            tenant_id: req.tenant_id,
            organization_id: req.organization_id,
            scope: req.scope.into(),
            enabled: req.enabled,
            auto_install: req.auto_install,
            requires_approval: req.requires_approval,
            is_mandatory: req.is_mandatory,
            max_installations: req.max_installations,
            max_active_users: req.max_active_users,
            tenant_configuration: req.tenant_configuration,
            preferences: req.preferences,
            allowed_role_ids: req.allowed_role_ids,
            allowed_user_ids: req.allowed_user_ids,
            denied_user_ids: req.denied_user_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub plugin_tenant_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub scope: ScopeDto,
    pub status: StatusDto,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Option<sdk::Metadata>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl From<sdk::Subscription> for SubscriptionDto {
    fn from(sub: sdk::Subscription) -> Self {
        Self {
            id: sub.id,
            plugin_id: sub.plugin_id,
            plugin_tenant_id: sub.plugin_tenant_id,
            tenant_id: sub.tenant_id,
            organization_id: sub.organization_id,
            subscriber_id: sub.subscriber_id,
            plan_id: sub.plan_id,
            scope: sub.scope.into(),
            status: sub.status.into(),
            start_date: sub.start_date,
            end_date: sub.end_date,
            auto_renew: sub.auto_renew,
            payment_method: sub.payment_method,
            metadata: sub.metadata,
            cancelled_at: sub.cancelled_at,
            cancellation_reason: sub.cancellation_reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantEnablementDto {
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub scope: ScopeDto,
    pub enabled: bool,
    pub auto_install: bool,
    pub requires_approval: bool,
    pub is_mandatory: bool,
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
    pub current_installations: i32,
    pub current_active_users: i32,
    pub allowed_role_ids: Vec<Uuid>,
    pub allowed_user_ids: Vec<Uuid>,
    pub denied_user_ids: Vec<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<sdk::TenantEnablement> for TenantEnablementDto {
    fn from(record: sdk::TenantEnablement) -> Self {
        Self {
            id: record.id,
            plugin_id: record.plugin_id,
            tenant_id: record.tenant_id,
            organization_id: record.organization_id,
            scope: record.scope.into(),
            enabled: record.enabled,
            auto_install: record.auto_install,
            requires_approval: record.requires_approval,
            is_mandatory: record.is_mandatory,
            max_installations: record.max_installations,
            max_active_users: record.max_active_users,
            current_installations: record.current_installations,
            current_active_users: record.current_active_users,
            allowed_role_ids: record.allowed_role_ids,
            allowed_user_ids: record.allowed_user_ids,
            denied_user_ids: record.denied_user_ids,
            approved_by_id: record.approved_by_id,
            approved_at: record.approved_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AccessCheckParams {
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
    /// Comma-separated role ids of the subscriber.
    pub role_ids: Option<String>,
}

impl AccessCheckParams {
    pub fn into_query(self) -> sdk::AccessQuery {
        let role_ids = self
            .role_ids
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| Uuid::parse_str(part.trim()).ok())
                    .collect()
            })
            .unwrap_or_default();
        sdk::AccessQuery {
            plugin_id: self.plugin_id,
            tenant_id: self.tenant_id,
            organization_id: self.organization_id,
            subscriber_id: self.subscriber_id,
            role_ids,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct CascadeParams {
    /// Confirm the approver cascade when revoking an approver's subscription.
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessDecisionDto {
    pub has_access: bool,
    pub subscription: Option<SubscriptionDto>,
    pub denial_reasons: Vec<String>,
}

impl From<sdk::AccessDecision> for AccessDecisionDto {
    fn from(decision: sdk::AccessDecision) -> Self {
        Self {
            has_access: decision.has_access,
            subscription: decision.subscription.map(Into::into),
            denial_reasons: decision.denial_reasons,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RevocationOutcomeDto {
    pub enablement_deleted: bool,
    pub subscriptions_deleted: u64,
}

impl From<sdk::RevocationOutcome> for RevocationOutcomeDto {
    fn from(outcome: sdk::RevocationOutcome) -> Self {
        Self {
            enablement_deleted: outcome.enablement_deleted,
            subscriptions_deleted: outcome.subscriptions_deleted,
        }
    }
}
