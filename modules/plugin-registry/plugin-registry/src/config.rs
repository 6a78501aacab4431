use serde::Deserialize;

use crate::domain::plan::DEFAULT_TRIAL_DAYS;

/// Module configuration, deserialized by the host from its config tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Trial length applied when a trial plan carries no day count.
    pub default_trial_days: i32,
    /// TTL of the entitlement read cache. Zero disables caching.
    pub entitlement_cache_ttl_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_trial_days: DEFAULT_TRIAL_DAYS,
            entitlement_cache_ttl_secs: 30,
        }
    }
}
