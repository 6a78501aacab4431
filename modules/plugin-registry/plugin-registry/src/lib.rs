//! Plugin Registry Module
//!
//! Plugin entitlement and subscription lifecycle engine: decides, per plugin
//! and per tenant/organization/user scope, whether a caller may use a plugin
//! right now, and manages subscription state transitions driven by plan type
//! and billing period.
//!
//! The public API is defined in `plugin-registry-sdk` and re-exported here.

pub use plugin_registry_sdk::{
    AccessDecision, AccessQuery, BillingPeriod, CreateTenantEnablement, Plan, PluginRegistryApi,
    PluginScope, PurchaseSubscription, RegistryError, RevocationOutcome, Subscription,
    SubscriptionStatus, TenantEnablement,
};

pub mod local_client;
pub use local_client::LocalClient;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
