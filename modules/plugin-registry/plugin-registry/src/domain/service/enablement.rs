use std::sync::Arc;

use chrono::Utc;
use plugin_registry_sdk::models::{
    CreateTenantEnablement, PluginScope, RevocationOutcome, TenantEnablement, UsageAction,
    UserListOp,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::{EnablementRepository, PluginDirectory};
use crate::infra::cache::EntitlementCache;

/// Quota defaults derived from a plan's limitations map, applied only when
/// a brand-new enablement record is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaHints {
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
}

/// Tenant Enablement Registry: owns the per-(plugin, tenant, organization)
/// record describing whether and how a plugin is switched on.
pub struct EnablementService {
    repo: Arc<dyn EnablementRepository>,
    directory: Arc<dyn PluginDirectory>,
    cache: Arc<EntitlementCache>,
}

impl EnablementService {
    pub fn new(
        repo: Arc<dyn EnablementRepository>,
        directory: Arc<dyn PluginDirectory>,
        cache: Arc<EntitlementCache>,
    ) -> Self {
        Self {
            repo,
            directory,
            cache,
        }
    }

    /// Idempotent lookup-or-create for a key. Quota hints are applied only
    /// when the record is created; repeated calls never reset
    /// administrator-configured quotas.
    #[instrument(skip(self), fields(plugin_id = %plugin_id, tenant_id = %tenant_id))]
    pub async fn find_or_create(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
        scope: PluginScope,
        hints: QuotaHints,
    ) -> Result<TenantEnablement, DomainError> {
        if let Some(existing) = self
            .repo
            .find_by_key(plugin_id, tenant_id, organization_id)
            .await?
        {
            debug!(enablement_id = %existing.id, "Enablement already present for key");
            return Ok(existing);
        }

        let now = Utc::now();
        let record = TenantEnablement {
            id: Uuid::now_v7(),
            plugin_id,
            tenant_id,
            organization_id,
            scope,
            enabled: true,
            auto_install: false,
            requires_approval: false,
            is_mandatory: false,
            max_installations: hints.max_installations,
            max_active_users: hints.max_active_users,
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
        };

        let created = self.repo.create_if_absent(record).await?;
        info!(enablement_id = %created.id, "Enablement ready for key");
        Ok(created)
    }

    /// Administrative creation. Strict: the key must be unused and the
    /// plugin must be known to the platform.
    #[instrument(skip(self, cmd), fields(plugin_id = %cmd.plugin_id, tenant_id = %cmd.tenant_id))]
    pub async fn create(
        &self,
        cmd: CreateTenantEnablement,
    ) -> Result<TenantEnablement, DomainError> {
        if !self.directory.plugin_exists(cmd.plugin_id).await? {
            return Err(DomainError::not_found("Plugin", cmd.plugin_id));
        }

        if self
            .repo
            .find_by_key(cmd.plugin_id, cmd.tenant_id, cmd.organization_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                "a plugin tenant record already exists for this plugin and tenant",
            ));
        }

        let now = Utc::now();
        let record = TenantEnablement {
            id: Uuid::now_v7(),
            plugin_id: cmd.plugin_id,
            tenant_id: cmd.tenant_id,
            organization_id: cmd.organization_id,
            scope: cmd.scope,
            enabled: cmd.enabled,
            auto_install: cmd.auto_install,
            requires_approval: cmd.requires_approval,
            is_mandatory: cmd.is_mandatory,
            max_installations: cmd.max_installations,
            max_active_users: cmd.max_active_users,
            current_installations: 0,
            current_active_users: 0,
            tenant_configuration: cmd.tenant_configuration,
            preferences: cmd.preferences,
            allowed_role_ids: cmd.allowed_role_ids,
            allowed_user_ids: cmd.allowed_user_ids,
            denied_user_ids: cmd.denied_user_ids,
            approved_by_id: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.insert(record).await?;
        self.invalidate(&created);
        info!(enablement_id = %created.id, "Created plugin tenant record");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<TenantEnablement, DomainError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("TenantEnablement", id))
    }

    pub async fn list_by_plugin(
        &self,
        plugin_id: Uuid,
    ) -> Result<Vec<TenantEnablement>, DomainError> {
        self.repo.list_by_plugin(plugin_id).await
    }

    pub async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<TenantEnablement>, DomainError> {
        self.repo.list_by_tenant(tenant_id).await
    }

    /// Switch a plugin on or off for the tenant.
    #[instrument(skip(self), fields(enablement_id = %id))]
    pub async fn set_enabled(
        &self,
        id: Uuid,
        enabled: bool,
    ) -> Result<TenantEnablement, DomainError> {
        let mut record = self.get(id).await?;
        record.enabled = enabled;
        record.updated_at = Utc::now();
        let updated = self.repo.update(record).await?;
        self.invalidate(&updated);
        info!(enabled, "Updated enablement availability");
        Ok(updated)
    }

    /// Record administrative approval of the plugin for this tenant.
    #[instrument(skip(self), fields(enablement_id = %id, approver_id = %approver_id))]
    pub async fn approve(
        &self,
        id: Uuid,
        approver_id: Uuid,
    ) -> Result<TenantEnablement, DomainError> {
        let mut record = self.get(id).await?;
        let now = Utc::now();
        record.approved_by_id = Some(approver_id);
        record.approved_at = Some(now);
        record.updated_at = now;
        let updated = self.repo.update(record).await?;
        self.invalidate(&updated);
        info!("Approved plugin for tenant");
        Ok(updated)
    }

    /// Apply a membership operation to the access lists.
    #[instrument(skip(self, user_ids), fields(enablement_id = %id, users = user_ids.len()))]
    pub async fn manage_users(
        &self,
        id: Uuid,
        user_ids: &[Uuid],
        op: UserListOp,
    ) -> Result<TenantEnablement, DomainError> {
        let mut record = self.get(id).await?;

        for user_id in user_ids {
            match op {
                UserListOp::Allow => {
                    record.denied_user_ids.retain(|u| u != user_id);
                    if !record.allowed_user_ids.contains(user_id) {
                        record.allowed_user_ids.push(*user_id);
                    }
                }
                UserListOp::Deny => {
                    record.allowed_user_ids.retain(|u| u != user_id);
                    if !record.denied_user_ids.contains(user_id) {
                        record.denied_user_ids.push(*user_id);
                    }
                }
                UserListOp::Remove => {
                    record.allowed_user_ids.retain(|u| u != user_id);
                    record.denied_user_ids.retain(|u| u != user_id);
                }
            }
        }
        record.updated_at = Utc::now();

        let updated = self.repo.update(record).await?;
        self.invalidate(&updated);
        debug!("Updated enablement access lists");
        Ok(updated)
    }

    /// Remove a single user from the allowed list. No-op when absent.
    #[instrument(skip(self), fields(enablement_id = %id, user_id = %user_id))]
    pub async fn remove_allowed_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<TenantEnablement, DomainError> {
        let mut record = self.get(id).await?;
        if !record.allowed_user_ids.contains(&user_id) {
            return Ok(record);
        }
        record.allowed_user_ids.retain(|u| *u != user_id);
        record.updated_at = Utc::now();
        let updated = self.repo.update(record).await?;
        self.invalidate(&updated);
        Ok(updated)
    }

    /// Bump the usage counters. Decrements saturate at zero.
    #[instrument(skip(self), fields(enablement_id = %id))]
    pub async fn record_usage(
        &self,
        id: Uuid,
        action: UsageAction,
    ) -> Result<TenantEnablement, DomainError> {
        let mut record = self.get(id).await?;
        match action {
            UsageAction::Install => record.current_installations += 1,
            UsageAction::Uninstall => {
                record.current_installations = (record.current_installations - 1).max(0);
            }
            UsageAction::Activate => record.current_active_users += 1,
            UsageAction::Deactivate => {
                record.current_active_users = (record.current_active_users - 1).max(0);
            }
        }
        record.updated_at = Utc::now();
        let updated = self.repo.update(record).await?;
        self.invalidate(&updated);
        Ok(updated)
    }

    /// Explicit high-blast-radius revocation: delete the enablement and,
    /// transactionally, every subscription under it.
    #[instrument(skip(self), fields(enablement_id = %id))]
    pub async fn revoke_and_cascade(&self, id: Uuid) -> Result<RevocationOutcome, DomainError> {
        let record = self.get(id).await?;
        let outcome = self.repo.delete_cascade(id).await?;
        self.invalidate(&record);
        warn!(
            subscriptions_deleted = outcome.subscriptions_deleted,
            "Revoked plugin tenant record and cascaded subscriptions"
        );
        Ok(outcome)
    }

    fn invalidate(&self, record: &TenantEnablement) {
        self.cache
            .invalidate_plugin_tenant(record.plugin_id, record.tenant_id);
    }
}
