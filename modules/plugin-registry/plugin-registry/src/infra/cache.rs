//! Entitlement read cache.
//!
//! `hasAccess` is consulted on every authorization decision in the platform,
//! so resolved decisions are kept for a short TTL. Invalidation is explicit:
//! every write to a subscription or enablement evicts the affected
//! (plugin, tenant) slice.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use plugin_registry_sdk::models::{AccessDecision, AccessQuery};
use uuid::Uuid;

pub struct EntitlementCache {
    ttl: Duration,
    entries: DashMap<AccessQuery, CacheEntry>,
}

struct CacheEntry {
    decision: AccessDecision,
    expires_at: Instant,
}

impl EntitlementCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn get(&self, query: &AccessQuery) -> Option<AccessDecision> {
        if self.ttl.is_zero() {
            return None;
        }
        let expired = {
            let entry = self.entries.get(query)?;
            if entry.expires_at > Instant::now() {
                return Some(entry.decision.clone());
            }
            true
        };
        if expired {
            self.entries.remove(query);
        }
        None
    }

    pub fn put(&self, query: AccessQuery, decision: AccessDecision) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            query,
            CacheEntry {
                decision,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Evict every cached decision for a (plugin, tenant) pair.
    pub fn invalidate_plugin_tenant(&self, plugin_id: Uuid, tenant_id: Uuid) {
        self.entries
            .retain(|key, _| !(key.plugin_id == plugin_id && key.tenant_id == tenant_id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
