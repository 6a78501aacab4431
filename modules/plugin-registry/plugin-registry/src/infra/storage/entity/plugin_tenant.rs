use plugin_registry_sdk::models::TenantEnablement;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use super::types::Scope;
use super::{map_from_json, map_to_json, uuids_from_json, uuids_to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plugin_tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plugin_id: Uuid,
    pub tenant_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub scope: Scope,
    pub enabled: bool,
    pub auto_install: bool,
    pub requires_approval: bool,
    pub is_mandatory: bool,
    pub max_installations: Option<i32>,
    pub max_active_users: Option<i32>,
    pub current_installations: i32,
    pub current_active_users: i32,
    pub tenant_configuration: Option<Json>,
    pub preferences: Option<Json>,
    pub allowed_role_ids: Option<Json>,
    pub allowed_user_ids: Option<Json>,
    pub denied_user_ids: Option<Json>,
    pub approved_by_id: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TenantEnablement {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            plugin_id: model.plugin_id,
            tenant_id: model.tenant_id,
            organization_id: model.organization_id,
            scope: model.scope.into(),
            enabled: model.enabled,
            auto_install: model.auto_install,
            requires_approval: model.requires_approval,
            is_mandatory: model.is_mandatory,
            max_installations: model.max_installations,
            max_active_users: model.max_active_users,
            current_installations: model.current_installations,
            current_active_users: model.current_active_users,
            tenant_configuration: map_from_json(model.tenant_configuration.as_ref()),
            preferences: map_from_json(model.preferences.as_ref()),
            allowed_role_ids: uuids_from_json(model.allowed_role_ids.as_ref()),
            allowed_user_ids: uuids_from_json(model.allowed_user_ids.as_ref()),
            denied_user_ids: uuids_from_json(model.denied_user_ids.as_ref()),
            approved_by_id: model.approved_by_id,
            approved_at: model.approved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<TenantEnablement> for ActiveModel {
    fn from(record: TenantEnablement) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(record.id),
            plugin_id: Set(record.plugin_id),
            tenant_id: Set(record.tenant_id),
            organization_id: Set(record.organization_id),
            scope: Set(record.scope.into()),
            enabled: Set(record.enabled),
            auto_install: Set(record.auto_install),
            requires_approval: Set(record.requires_approval),
            is_mandatory: Set(record.is_mandatory),
            max_installations: Set(record.max_installations),
            max_active_users: Set(record.max_active_users),
            current_installations: Set(record.current_installations),
            current_active_users: Set(record.current_active_users),
            tenant_configuration: Set(map_to_json(record.tenant_configuration)),
            preferences: Set(map_to_json(record.preferences)),
            allowed_role_ids: Set(Some(uuids_to_json(&record.allowed_role_ids))),
            allowed_user_ids: Set(Some(uuids_to_json(&record.allowed_user_ids))),
            denied_user_ids: Set(Some(uuids_to_json(&record.denied_user_ids))),
            approved_by_id: Set(record.approved_by_id),
            approved_at: Set(record.approved_at),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }
}
