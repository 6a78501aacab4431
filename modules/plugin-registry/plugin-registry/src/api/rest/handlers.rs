use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::Json;
use http::StatusCode;
use plugin_registry_sdk::PluginRegistryApi;
use uuid::Uuid;

use crate::local_client::LocalClient;

use super::dto::{
    AccessCheckParams, AccessDecisionDto, CascadeParams, CreatePluginTenantRequest,
    PurchaseSubscriptionRequest, RevocationOutcomeDto, SubscriptionDto, TenantEnablementDto,
};
use super::problem::Problem;

#[utoipa::path(
    post,
    path = "/plugin-registry/v1/subscriptions",
    tag = "Plugin Registry",
    request_body = PurchaseSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription purchased", body = SubscriptionDto),
        (status = 400, description = "Invalid purchase request", body = Problem),
        (status = 404, description = "Unknown plan", body = Problem),
        (status = 409, description = "A live subscription already exists", body = Problem),
    )
)]
pub async fn purchase_subscription(
    Extension(client): Extension<Arc<LocalClient>>,
    Json(req): Json<PurchaseSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionDto>), Problem> {
    let subscription = client.purchase_subscription(req.into()).await?;
    Ok((StatusCode::CREATED, Json(subscription.into())))
}

#[utoipa::path(
    delete,
    path = "/plugin-registry/v1/subscriptions/{id}",
    tag = "Plugin Registry",
    params(("id" = Uuid, Path, description = "Subscription id"), CascadeParams),
    responses(
        (status = 200, description = "Subscription revoked", body = RevocationOutcomeDto),
        (status = 404, description = "Subscription not found", body = Problem),
        (status = 409, description = "Approver revocation requires the cascade flag", body = Problem),
    )
)]
pub async fn delete_subscription(
    Extension(client): Extension<Arc<LocalClient>>,
    Path(id): Path<Uuid>,
    Query(params): Query<CascadeParams>,
) -> Result<Json<RevocationOutcomeDto>, Problem> {
    let outcome = if params.cascade {
        client.delete_subscription_cascading(id).await?
    } else {
        client.delete_subscription(id).await?
    };
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/plugin-registry/v1/plugin-tenants",
    tag = "Plugin Registry",
    request_body = CreatePluginTenantRequest,
    responses(
        (status = 201, description = "Plugin tenant created", body = TenantEnablementDto),
        (status = 404, description = "Unknown plugin", body = Problem),
        (status = 409, description = "Record already exists for the key", body = Problem),
    )
)]
pub async fn create_plugin_tenant(
    Extension(client): Extension<Arc<LocalClient>>,
    Json(req): Json<CreatePluginTenantRequest>,
) -> Result<(StatusCode, Json<TenantEnablementDto>), Problem> {
    let record = client.create_tenant_enablement(req.into()).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/plugin-registry/v1/access",
    tag = "Plugin Registry",
    params(AccessCheckParams),
    responses(
        (status = 200, description = "Entitlement decision", body = AccessDecisionDto),
    )
)]
pub async fn check_access(
    Extension(client): Extension<Arc<LocalClient>>,
    Query(params): Query<AccessCheckParams>,
) -> Result<Json<AccessDecisionDto>, Problem> {
    let decision = client.check_access(params.into_query()).await?;
    Ok(Json(decision.into()))
}

#[utoipa::path(
    get,
    path = "/plugin-registry/v1/subscriptions/active",
    tag = "Plugin Registry",
    params(AccessCheckParams),
    responses(
        (status = 200, description = "Governing subscription, if any", body = Option<SubscriptionDto>),
    )
)]
pub async fn get_active_subscription(
    Extension(client): Extension<Arc<LocalClient>>,
    Query(params): Query<AccessCheckParams>,
) -> Result<Json<Option<SubscriptionDto>>, Problem> {
    let subscription = client.get_active_subscription(params.into_query()).await?;
    Ok(Json(subscription.map(Into::into)))
}

#[utoipa::path(
    get,
    path = "/plugin-registry/v1/subscriptions/{id}",
    tag = "Plugin Registry",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionDto),
        (status = 404, description = "Subscription not found", body = Problem),
    )
)]
pub async fn get_subscription(
    Extension(client): Extension<Arc<LocalClient>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionDto>, Problem> {
    let subscription = client.get_subscription(id).await?;
    Ok(Json(subscription.into()))
}

#[utoipa::path(
    get,
    path = "/plugin-registry/v1/subscriptions/by-plugin/{plugin_id}",
    tag = "Plugin Registry",
    params(("plugin_id" = Uuid, Path, description = "Plugin id")),
    responses(
        (status = 200, description = "Subscriptions of the plugin", body = [SubscriptionDto]),
    )
)]
pub async fn list_subscriptions_by_plugin(
    Extension(client): Extension<Arc<LocalClient>>,
    Path(plugin_id): Path<Uuid>,
) -> Result<Json<Vec<SubscriptionDto>>, Problem> {
    let subscriptions = client.subscriptions_by_plugin(plugin_id).await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/plugin-registry/v1/subscriptions/by-subscriber/{subscriber_id}",
    tag = "Plugin Registry",
    params(("subscriber_id" = Uuid, Path, description = "Subscriber id")),
    responses(
        (status = 200, description = "Subscriptions of the subscriber", body = [SubscriptionDto]),
    )
)]
pub async fn list_subscriptions_by_subscriber(
    Extension(client): Extension<Arc<LocalClient>>,
    Path(subscriber_id): Path<Uuid>,
) -> Result<Json<Vec<SubscriptionDto>>, Problem> {
    let subscriptions = client.subscriptions_by_subscriber(subscriber_id).await?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}
