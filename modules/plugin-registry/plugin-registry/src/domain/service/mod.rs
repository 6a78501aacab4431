pub mod enablement;
pub mod entitlement;
pub mod revocation;
pub mod subscriptions;

pub use enablement::{EnablementService, QuotaHints};
pub use entitlement::EntitlementService;
pub use revocation::RevocationService;
pub use subscriptions::SubscriptionService;
