use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use utoipa::OpenApi;

use crate::local_client::LocalClient;

use super::{dto, handlers, problem};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Plugin Registry",
        description = "Plugin entitlement and subscription lifecycle engine"
    ),
    paths(
        handlers::purchase_subscription,
        handlers::delete_subscription,
        handlers::create_plugin_tenant,
        handlers::check_access,
        handlers::get_active_subscription,
        handlers::get_subscription,
        handlers::list_subscriptions_by_plugin,
        handlers::list_subscriptions_by_subscriber,
    ),
    components(schemas(
        dto::PurchaseSubscriptionRequest,
        dto::CreatePluginTenantRequest,
        dto::SubscriptionDto,
        dto::TenantEnablementDto,
        dto::AccessDecisionDto,
        dto::RevocationOutcomeDto,
        dto::ScopeDto,
        dto::StatusDto,
        problem::Problem,
    ))
)]
pub struct ApiDoc;

/// Build the module's REST router over an in-process client.
pub fn router(client: Arc<LocalClient>) -> Router {
    Router::new()
        .route(
            "/plugin-registry/v1/subscriptions",
            post(handlers::purchase_subscription),
        )
        .route(
            "/plugin-registry/v1/subscriptions/active",
            get(handlers::get_active_subscription),
        )
        .route(
            "/plugin-registry/v1/subscriptions/by-plugin/{plugin_id}",
            get(handlers::list_subscriptions_by_plugin),
        )
        .route(
            "/plugin-registry/v1/subscriptions/by-subscriber/{subscriber_id}",
            get(handlers::list_subscriptions_by_subscriber),
        )
        .route(
            "/plugin-registry/v1/subscriptions/{id}",
            get(handlers::get_subscription).delete(handlers::delete_subscription),
        )
        .route(
            "/plugin-registry/v1/plugin-tenants",
            post(handlers::create_plugin_tenant),
        )
        .route("/plugin-registry/v1/access", get(handlers::check_access))
        .layer(Extension(client))
}
