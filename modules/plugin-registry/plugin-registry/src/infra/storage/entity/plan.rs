use plugin_registry_sdk::models::Plan;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use super::types::BillingPeriod;
use super::{map_from_json, map_to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plugin_subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub name: String,
    pub billing_period: BillingPeriod,
    pub is_free: bool,
    pub has_trial: bool,
    pub trial_days: Option<i32>,
    pub has_limitations: bool,
    pub limitations: Option<Json>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Plan {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            plugin_id: model.plugin_id,
            name: model.name,
            billing_period: model.billing_period.into(),
            is_free: model.is_free,
            has_trial: model.has_trial,
            trial_days: model.trial_days,
            has_limitations: model.has_limitations,
            limitations: map_from_json(model.limitations.as_ref()),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Plan> for ActiveModel {
    fn from(plan: Plan) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(plan.id),
            plugin_id: Set(plan.plugin_id),
            name: Set(plan.name),
            billing_period: Set(plan.billing_period.into()),
            is_free: Set(plan.is_free),
            has_trial: Set(plan.has_trial),
            trial_days: Set(plan.trial_days),
            has_limitations: Set(plan.has_limitations),
            limitations: Set(map_to_json(plan.limitations)),
            is_active: Set(plan.is_active),
            created_at: Set(plan.created_at),
            updated_at: Set(plan.updated_at),
        }
    }
}
