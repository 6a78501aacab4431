//! Column enums shared by the registry tables.

use plugin_registry_sdk::models as sdk;
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Scope {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "organization")]
    Organization,
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "trial")]
    Trial,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum BillingPeriod {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
    #[sea_orm(string_value = "one_time")]
    OneTime,
    #[sea_orm(string_value = "usage_based")]
    UsageBased,
}

impl From<Scope> for sdk::PluginScope {
    fn from(value: Scope) -> Self {
        match value {
            Scope::User => Self::User,
            Scope::Organization => Self::Organization,
            Scope::Tenant => Self::Tenant,
        }
    }
}

impl From<sdk::PluginScope> for Scope {
    fn from(value: sdk::PluginScope) -> Self {
        match value {
            sdk::PluginScope::User => Self::User,
            sdk::PluginScope::Organization => Self::Organization,
            sdk::PluginScope::Tenant => Self::Tenant,
        }
    }
}

impl From<SubscriptionStatus> for sdk::SubscriptionStatus {
    fn from(value: SubscriptionStatus) -> Self {
        match value {
            SubscriptionStatus::Pending => Self::Pending,
            SubscriptionStatus::Trial => Self::Trial,
            SubscriptionStatus::Active => Self::Active,
            SubscriptionStatus::Expired => Self::Expired,
            SubscriptionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<sdk::SubscriptionStatus> for SubscriptionStatus {
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

impl From<BillingPeriod> for sdk::BillingPeriod {
    fn from(value: BillingPeriod) -> Self {
        match value {
            BillingPeriod::Daily => Self::Daily,
            BillingPeriod::Weekly => Self::Weekly,
            BillingPeriod::Monthly => Self::Monthly,
            BillingPeriod::Quarterly => Self::Quarterly,
            BillingPeriod::Yearly => Self::Yearly,
            BillingPeriod::OneTime => Self::OneTime,
            BillingPeriod::UsageBased => Self::UsageBased,
        }
    }
}

impl From<sdk::BillingPeriod> for BillingPeriod {
    fn from(value: sdk::BillingPeriod) -> Self {
        match value {
            sdk::BillingPeriod::Daily => Self::Daily,
            sdk::BillingPeriod::Weekly => Self::Weekly,
            sdk::BillingPeriod::Monthly => Self::Monthly,
            sdk::BillingPeriod::Quarterly => Self::Quarterly,
            sdk::BillingPeriod::Yearly => Self::Yearly,
            sdk::BillingPeriod::OneTime => Self::OneTime,
            sdk::BillingPeriod::UsageBased => Self::UsageBased,
        }
    }
}
