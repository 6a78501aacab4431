//! Plugin Registry SDK
//!
//! Transport-agnostic contract of the plugin entitlement and subscription
//! lifecycle engine: models, the [`PluginRegistryApi`] trait, and the error
//! taxonomy. Other modules depend on this crate, never on the
//! implementation crate directly.

pub mod api;
pub mod errors;
pub mod models;

pub use api::PluginRegistryApi;
pub use errors::RegistryError;
pub use models::{
    AccessDecision, AccessQuery, BillingPeriod, CreateTenantEnablement, Metadata, Plan,
    PluginScope, PurchaseSubscription, RevocationOutcome, Subscription, SubscriptionStatus,
    TenantEnablement, UsageAction, UserListOp,
};
