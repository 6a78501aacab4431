pub mod plan;
pub mod plugin_subscription;
pub mod plugin_tenant;
pub mod types;

use sea_orm::entity::prelude::Json;
use uuid::Uuid;

/// Access lists are persisted as JSON arrays of uuid strings.
pub(crate) fn uuids_to_json(ids: &[Uuid]) -> Json {
    Json::Array(ids.iter().map(|u| Json::String(u.to_string())).collect())
}

pub(crate) fn uuids_from_json(value: Option<&Json>) -> Vec<Uuid> {
    value
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn map_to_json(map: Option<plugin_registry_sdk::models::Metadata>) -> Option<Json> {
    map.map(Json::Object)
}

pub(crate) fn map_from_json(value: Option<&Json>) -> Option<plugin_registry_sdk::models::Metadata> {
    value.and_then(|v| v.as_object().cloned())
}
