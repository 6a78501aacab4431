//! Unique keys protecting the registry invariants.
//!
//! Postgres and SQLite get partial unique indexes: one index per
//! null-combination of the optional key columns, so NULL organization or
//! subscriber ids still collide. MySQL cannot express partial indexes; there
//! the transactional check inside the repository is the only guard for live
//! subscriptions, and the plain unique index below covers enablement keys
//! with an organization.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

const LIVE: &str = "('pending','trial','active')";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        match backend {
            sea_orm::DatabaseBackend::Postgres | sea_orm::DatabaseBackend::Sqlite => {
                let statements = [
                    // one enablement per (plugin, tenant, organization) key
                    "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_tenants_key \
                     ON plugin_tenants (plugin_id, tenant_id, organization_id) \
                     WHERE organization_id IS NOT NULL"
                        .to_owned(),
                    "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_tenants_key_no_org \
                     ON plugin_tenants (plugin_id, tenant_id) \
                     WHERE organization_id IS NULL"
                        .to_owned(),
                    // one live subscription per (plugin, subscriber, tenant, organization)
                    format!(
                        "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_subscriptions_live \
                         ON plugin_subscriptions (plugin_id, tenant_id, organization_id, subscriber_id) \
                         WHERE organization_id IS NOT NULL AND subscriber_id IS NOT NULL \
                         AND status IN {LIVE}"
                    ),
                    format!(
                        "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_subscriptions_live_no_org \
                         ON plugin_subscriptions (plugin_id, tenant_id, subscriber_id) \
                         WHERE organization_id IS NULL AND subscriber_id IS NOT NULL \
                         AND status IN {LIVE}"
                    ),
                    format!(
                        "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_subscriptions_live_no_sub \
                         ON plugin_subscriptions (plugin_id, tenant_id, organization_id) \
                         WHERE organization_id IS NOT NULL AND subscriber_id IS NULL \
                         AND status IN {LIVE}"
                    ),
                    format!(
                        "CREATE UNIQUE INDEX IF NOT EXISTS uq_plugin_subscriptions_live_bare \
                         ON plugin_subscriptions (plugin_id, tenant_id) \
                         WHERE organization_id IS NULL AND subscriber_id IS NULL \
                         AND status IN {LIVE}"
                    ),
                ];
                for sql in statements {
                    conn.execute_unprepared(&sql).await?;
                }
                Ok(())
            }
            sea_orm::DatabaseBackend::MySql => {
                if !manager
                    .has_index("plugin_tenants", "uq_plugin_tenants_key")
                    .await?
                {
                    conn.execute_unprepared(
                        "CREATE UNIQUE INDEX uq_plugin_tenants_key \
                         ON plugin_tenants (plugin_id, tenant_id, organization_id);",
                    )
                    .await?;
                }
                Ok(())
            }
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        match backend {
            sea_orm::DatabaseBackend::Postgres | sea_orm::DatabaseBackend::Sqlite => {
                for name in [
                    "uq_plugin_tenants_key",
                    "uq_plugin_tenants_key_no_org",
                    "uq_plugin_subscriptions_live",
                    "uq_plugin_subscriptions_live_no_org",
                    "uq_plugin_subscriptions_live_no_sub",
                    "uq_plugin_subscriptions_live_bare",
                ] {
                    conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                        .await?;
                }
                Ok(())
            }
            sea_orm::DatabaseBackend::MySql => {
                if manager
                    .has_index("plugin_tenants", "uq_plugin_tenants_key")
                    .await?
                {
                    conn.execute_unprepared(
                        "DROP INDEX uq_plugin_tenants_key ON plugin_tenants;",
                    )
                    .await?;
                }
                Ok(())
            }
        }
    }
}
