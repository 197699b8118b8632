use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorBody;
use crate::handlers::subscription;
use subtrack_models::{CreateSubscriptionRequest, SubscriptionResponse, TotalCostResponse};

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription Service API",
        description = "CRUD over user subscriptions and their cost over a month range.",
        version = "1.0.0",
    ),
    paths(
        subscription::create_subscription,
        subscription::list_subscriptions,
        subscription::get_subscription,
        subscription::update_subscription,
        subscription::delete_subscription,
        subscription::list_user_subscriptions,
        subscription::total_cost,
    ),
    components(schemas(
        CreateSubscriptionRequest,
        SubscriptionResponse,
        TotalCostResponse,
        ErrorBody,
    )),
    tags(
        (name = "Subscriptions", description = "Subscription records and cost calculation")
    )
)]
pub struct ApiDoc;

/// Swagger UI under `/swagger/`, document at [`OPENAPI_JSON_PATH`].
pub fn configure_swagger(cfg: &mut web::ServiceConfig) {
    cfg.service(SwaggerUi::new("/swagger/{_:.*}").url(OPENAPI_JSON_PATH, ApiDoc::openapi()));
}
