use plugin_registry_sdk::models::Subscription;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use super::types::{Scope, SubscriptionStatus};
use super::{map_from_json, map_to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plugin_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub plugin_tenant_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub subscriber_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub scope: Scope,
    pub status: SubscriptionStatus,
    pub start_date: DateTimeUtc,
    pub end_date: Option<DateTimeUtc>,
    pub auto_renew: bool,
    pub payment_method: Option<String>,
    pub metadata: Option<Json>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Subscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            plugin_id: model.plugin_id,
            plugin_tenant_id: model.plugin_tenant_id,
            tenant_id: model.tenant_id,
            organization_id: model.organization_id,
            subscriber_id: model.subscriber_id,
            plan_id: model.plan_id,
            scope: model.scope.into(),
            status: model.status.into(),
            start_date: model.start_date,
            end_date: model.end_date,
            auto_renew: model.auto_renew,
            payment_method: model.payment_method,
            metadata: map_from_json(model.metadata.as_ref()),
            cancelled_at: model.cancelled_at,
            cancellation_reason: model.cancellation_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Subscription> for ActiveModel {
    fn from(sub: Subscription) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(sub.id),
            plugin_id: Set(sub.plugin_id),
            plugin_tenant_id: Set(sub.plugin_tenant_id),
            tenant_id: Set(sub.tenant_id),
            organization_id: Set(sub.organization_id),
            subscriber_id: Set(sub.subscriber_id),
            plan_id: Set(sub.plan_id),
            scope: Set(sub.scope.into()),
            status: Set(sub.status.into()),
            start_date: Set(sub.start_date),
            end_date: Set(sub.end_date),
            auto_renew: Set(sub.auto_renew),
            payment_method: Set(sub.payment_method),
            metadata: Set(map_to_json(sub.metadata)),
            cancelled_at: Set(sub.cancelled_at),
            cancellation_reason: Set(sub.cancellation_reason),
            created_at: Set(sub.created_at),
            updated_at: Set(sub.updated_at),
        }
    }
}
