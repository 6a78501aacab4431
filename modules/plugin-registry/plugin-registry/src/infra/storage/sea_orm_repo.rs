//! sea-orm repository implementations.
//!
//! Composite operations (`create_if_absent`, `insert_unique`,
//! `replace_terminal`, `revoke_atomic`, `delete_cascade`) each run inside a
//! single transaction; the partial unique indexes turn a concurrent
//! duplicate insert into a `Conflict` instead of a second live row.

use async_trait::async_trait;
use plugin_registry_sdk::models::{Plan, RevocationOutcome, Subscription, TenantEnablement};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::{EnablementRepository, PlanCatalog, SubscriptionRepository};

use super::db::{db_err, insert_err, is_unique_violation, update_err};
use super::entity::types::SubscriptionStatus as DbStatus;
use super::entity::{plan, plugin_subscription, plugin_tenant, uuids_from_json, uuids_to_json};

const LIVE_STATUSES: [DbStatus; 3] = [DbStatus::Pending, DbStatus::Trial, DbStatus::Active];
const TERMINAL_STATUSES: [DbStatus; 2] = [DbStatus::Expired, DbStatus::Cancelled];

const SUBSCRIPTION_CONFLICT: &str = "a live subscription already exists for this key";
const ENABLEMENT_CONFLICT: &str =
    "a plugin tenant record already exists for this plugin and tenant";

pub struct SeaOrmPlanCatalog {
    db: DatabaseConnection,
}

impl SeaOrmPlanCatalog {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanCatalog for SeaOrmPlanCatalog {
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, DomainError> {
        let found = plan::Entity::find_by_id(plan_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }
}

pub struct SeaOrmEnablementRepository {
    db: DatabaseConnection,
}

impl SeaOrmEnablementRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn enablement_by_key<C: ConnectionTrait>(
    conn: &C,
    plugin_id: Uuid,
    tenant_id: Uuid,
    organization_id: Option<Uuid>,
) -> Result<Option<plugin_tenant::Model>, DomainError> {
    let mut query = plugin_tenant::Entity::find()
        .filter(plugin_tenant::Column::PluginId.eq(plugin_id))
        .filter(plugin_tenant::Column::TenantId.eq(tenant_id));
    query = match organization_id {
        Some(org) => query.filter(plugin_tenant::Column::OrganizationId.eq(org)),
        None => query.filter(plugin_tenant::Column::OrganizationId.is_null()),
    };
    query.one(conn).await.map_err(db_err)
}

#[async_trait]
impl EnablementRepository for SeaOrmEnablementRepository {
    async fn get(&self, id: Uuid) -> Result<Option<TenantEnablement>, DomainError> {
        let found = plugin_tenant::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
    ) -> Result<Option<TenantEnablement>, DomainError> {
        let found = enablement_by_key(&self.db, plugin_id, tenant_id, organization_id).await?;
        Ok(found.map(Into::into))
    }

    async fn create_if_absent(
        &self,
        record: TenantEnablement,
    ) -> Result<TenantEnablement, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(existing) = enablement_by_key(
            &txn,
            record.plugin_id,
            record.tenant_id,
            record.organization_id,
        )
        .await?
        {
            txn.commit().await.map_err(db_err)?;
            return Ok(existing.into());
        }

        let inserted = plugin_tenant::ActiveModel::from(record.clone())
            .insert(&txn)
            .await;
        match inserted {
            Ok(model) => {
                txn.commit().await.map_err(db_err)?;
                Ok(model.into())
            }
            // lost the race: someone created the record between the check
            // and the insert, so return theirs
            Err(e) if is_unique_violation(&e) => {
                txn.rollback().await.map_err(db_err)?;
                self.find_by_key(record.plugin_id, record.tenant_id, record.organization_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::database("enablement vanished after conflicting insert")
                    })
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn insert(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError> {
        let model = plugin_tenant::ActiveModel::from(record)
            .insert(&self.db)
            .await
            .map_err(|e| insert_err(e, ENABLEMENT_CONFLICT))?;
        Ok(model.into())
    }

    async fn update(&self, record: TenantEnablement) -> Result<TenantEnablement, DomainError> {
        let id = record.id;
        let model = plugin_tenant::Entity::update(plugin_tenant::ActiveModel::from(record))
            .exec(&self.db)
            .await
            .map_err(|e| update_err(e, "TenantEnablement", id))?;
        Ok(model.into())
    }

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError> {
        let found = plugin_tenant::Entity::find()
            .filter(plugin_tenant::Column::PluginId.eq(plugin_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantEnablement>, DomainError> {
        let found = plugin_tenant::Entity::find()
            .filter(plugin_tenant::Column::TenantId.eq(tenant_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<RevocationOutcome, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let subscriptions = plugin_subscription::Entity::delete_many()
            .filter(plugin_subscription::Column::PluginTenantId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let record = plugin_tenant::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(RevocationOutcome {
            enablement_deleted: record.rows_affected > 0,
            subscriptions_deleted: subscriptions.rows_affected,
        })
    }
}

pub struct SeaOrmSubscriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn key_filter(
    plugin_id: Uuid,
    tenant_id: Uuid,
    organization_id: Option<Uuid>,
    subscriber_id: Option<Uuid>,
) -> sea_orm::Select<plugin_subscription::Entity> {
    let mut query = plugin_subscription::Entity::find()
        .filter(plugin_subscription::Column::PluginId.eq(plugin_id))
        .filter(plugin_subscription::Column::TenantId.eq(tenant_id));
    query = match organization_id {
        Some(org) => query.filter(plugin_subscription::Column::OrganizationId.eq(org)),
        None => query.filter(plugin_subscription::Column::OrganizationId.is_null()),
    };
    match subscriber_id {
        Some(subscriber) => query.filter(plugin_subscription::Column::SubscriberId.eq(subscriber)),
        None => query.filter(plugin_subscription::Column::SubscriberId.is_null()),
    }
}

async fn live_exists_for_key<C: ConnectionTrait>(
    conn: &C,
    sub: &Subscription,
) -> Result<bool, DomainError> {
    let found = key_filter(
        sub.plugin_id,
        sub.tenant_id,
        sub.organization_id,
        sub.subscriber_id,
    )
    .filter(plugin_subscription::Column::Status.is_in(LIVE_STATUSES))
    .one(conn)
    .await
    .map_err(db_err)?;
    Ok(found.is_some())
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        let found = plugin_subscription::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_for_key(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
        organization_id: Option<Uuid>,
        subscriber_id: Option<Uuid>,
    ) -> Result<Option<Subscription>, DomainError> {
        let found = key_filter(plugin_id, tenant_id, organization_id, subscriber_id)
            .order_by_desc(plugin_subscription::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list_live_for_plugin_tenant(
        &self,
        plugin_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError> {
        let found = plugin_subscription::Entity::find()
            .filter(plugin_subscription::Column::PluginId.eq(plugin_id))
            .filter(plugin_subscription::Column::TenantId.eq(tenant_id))
            .filter(plugin_subscription::Column::Status.is_in(LIVE_STATUSES))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn list_by_plugin(&self, plugin_id: Uuid) -> Result<Vec<Subscription>, DomainError> {
        let found = plugin_subscription::Entity::find()
            .filter(plugin_subscription::Column::PluginId.eq(plugin_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn list_by_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<Subscription>, DomainError> {
        let found = plugin_subscription::Entity::find()
            .filter(plugin_subscription::Column::SubscriberId.eq(subscriber_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn insert_unique(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if live_exists_for_key(&txn, &subscription).await? {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::conflict(SUBSCRIPTION_CONFLICT));
        }

        let model = plugin_subscription::ActiveModel::from(subscription)
            .insert(&txn)
            .await
            .map_err(|e| insert_err(e, SUBSCRIPTION_CONFLICT))?;
        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn replace_terminal(
        &self,
        old_id: Uuid,
        subscription: Subscription,
    ) -> Result<Subscription, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let deleted = plugin_subscription::Entity::delete_many()
            .filter(plugin_subscription::Column::Id.eq(old_id))
            .filter(plugin_subscription::Column::Status.is_in(TERMINAL_STATUSES))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::conflict(
                "the subscription being replaced is no longer terminal",
            ));
        }

        let model = plugin_subscription::ActiveModel::from(subscription)
            .insert(&txn)
            .await
            .map_err(|e| insert_err(e, SUBSCRIPTION_CONFLICT))?;
        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let id = subscription.id;
        let model =
            plugin_subscription::Entity::update(plugin_subscription::ActiveModel::from(
                subscription,
            ))
            .exec(&self.db)
            .await
            .map_err(|e| update_err(e, "Subscription", id))?;
        Ok(model.into())
    }

    async fn revoke_atomic(
        &self,
        subscription_id: Uuid,
        enablement_id: Uuid,
        remove_allowed_user: Option<Uuid>,
        cascade_enablement: bool,
    ) -> Result<RevocationOutcome, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(user) = remove_allowed_user {
            let enablement = plugin_tenant::Entity::find_by_id(enablement_id)
                .one(&txn)
                .await
                .map_err(db_err)?;
            if let Some(enablement) = enablement {
                let mut allowed = uuids_from_json(enablement.allowed_user_ids.as_ref());
                if allowed.contains(&user) {
                    allowed.retain(|u| *u != user);
                    let mut active = enablement.into_active_model();
                    active.allowed_user_ids = Set(Some(uuids_to_json(&allowed)));
                    active.update(&txn).await.map_err(db_err)?;
                }
            }
        }

        let outcome = if cascade_enablement {
            let subscriptions = plugin_subscription::Entity::delete_many()
                .filter(plugin_subscription::Column::PluginTenantId.eq(enablement_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            let record = plugin_tenant::Entity::delete_by_id(enablement_id)
                .exec(&txn)
                .await
                .map_err(db_err)?;
            RevocationOutcome {
                enablement_deleted: record.rows_affected > 0,
                subscriptions_deleted: subscriptions.rows_affected,
            }
        } else {
            let subscription = plugin_subscription::Entity::delete_by_id(subscription_id)
                .exec(&txn)
                .await
                .map_err(db_err)?;
            RevocationOutcome {
                enablement_deleted: false,
                subscriptions_deleted: subscription.rows_affected,
            }
        };

        txn.commit().await.map_err(db_err)?;
        Ok(outcome)
    }
}
