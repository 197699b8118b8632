use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use serde::Serialize;
use subtrack_models::{
    parse_month_year, CreateSubscriptionRequest, Subscription, SubscriptionIdQuery,
    SubscriptionResponse, TotalCostQuery, TotalCostResponse, UpdateSubscriptionRequest,
    UserSubscriptionsQuery,
};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ErrorBody, ServiceError};
use crate::services::SubscriptionService;

/// Builds the entity from a request body. Nothing is validated beyond parsing;
/// field rules belong to the service.
fn subscription_from_request(
    id: Uuid,
    request: CreateSubscriptionRequest,
) -> Result<Subscription, ServiceError> {
    let user_id = Uuid::parse_str(&request.user_id)
        .map_err(|e| ServiceError::ParseError(format!("invalid user_id: {}", e)))?;

    let start_date = parse_month_year(&request.start_month)
        .map_err(|e| ServiceError::ParseError(format!("invalid start_month: {}", e)))?;

    let end_date = request
        .end_month
        .as_deref()
        .map(parse_month_year)
        .transpose()
        .map_err(|e| ServiceError::ParseError(format!("invalid end_month: {}", e)))?;

    Ok(Subscription {
        id,
        service_name: request.service_name,
        price: request.price,
        user_id,
        start_date,
        end_date,
    })
}

/// Serializes ahead of building the response so failures surface as `EncodingError`.
fn json_ok<T: Serialize>(value: &T) -> Result<HttpResponse, ServiceError> {
    let body = serde_json::to_string(value)
        .map_err(|e| ServiceError::EncodingError(e.to_string()))?;
    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

fn log_rejected(handler: &'static str, err: ServiceError) -> ServiceError {
    warn!(handler, error = %err, "rejecting request");
    err
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "Subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created"),
        (status = 400, description = "Malformed or invalid subscription", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, ServiceError> {
    let sub = subscription_from_request(Uuid::nil(), request.into_inner())
        .map_err(|e| log_rejected("create_subscription", e))?;

    service.create_subscription(sub).await?;
    Ok(HttpResponse::Created().finish())
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "Subscriptions",
    responses(
        (status = 200, description = "All subscriptions", body = [SubscriptionResponse]),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ServiceError> {
    let subs = service.list().await?;
    let body: Vec<SubscriptionResponse> = subs.iter().map(SubscriptionResponse::from).collect();
    json_ok(&body)
}

#[utoipa::path(
    get,
    path = "/subscriptions/get",
    tag = "Subscriptions",
    params(SubscriptionIdQuery),
    responses(
        (status = 200, description = "The subscription", body = SubscriptionResponse),
        (status = 400, description = "Missing or malformed id", body = ErrorBody),
        (status = 404, description = "No subscription with this id", body = ErrorBody),
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionIdQuery>,
) -> Result<HttpResponse, ServiceError> {
    let sub = service.get_subscription_by_id(query.id).await?;
    json_ok(&SubscriptionResponse::from(&sub))
}

#[utoipa::path(
    put,
    path = "/subscriptions/update",
    tag = "Subscriptions",
    params(SubscriptionIdQuery),
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced"),
        (status = 400, description = "Malformed or invalid subscription", body = ErrorBody),
        (status = 404, description = "No subscription with this id", body = ErrorBody),
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionIdQuery>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse, ServiceError> {
    let sub = subscription_from_request(query.id, request.into_inner())
        .map_err(|e| log_rejected("update_subscription", e))?;

    service.update_subscription(sub).await?;
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    delete,
    path = "/subscriptions/delete",
    tag = "Subscriptions",
    params(SubscriptionIdQuery),
    responses(
        (status = 201, description = "Subscription removed, or it did not exist"),
        (status = 400, description = "Missing or malformed id", body = ErrorBody),
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionIdQuery>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_subscription(query.id).await?;
    Ok(HttpResponse::Created().finish())
}

#[utoipa::path(
    get,
    path = "/subscriptions/user",
    tag = "Subscriptions",
    params(UserSubscriptionsQuery),
    responses(
        (status = 200, description = "The user's subscriptions", body = [SubscriptionResponse]),
        (status = 400, description = "Missing or malformed userId", body = ErrorBody),
    )
)]
pub async fn list_user_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<UserSubscriptionsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let subs = service.list_by_user(query.user_id).await?;
    let body: Vec<SubscriptionResponse> = subs.iter().map(SubscriptionResponse::from).collect();
    json_ok(&body)
}

#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    tag = "Subscriptions",
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Cost over the month range", body = TotalCostResponse),
        (status = 400, description = "Missing or malformed parameter", body = ErrorBody),
        (status = 404, description = "User has no subscription to this service", body = ErrorBody),
    )
)]
pub async fn total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    if let Err(validation_errors) = query.validate() {
        return Err(log_rejected(
            "total_cost",
            ServiceError::ValidationError(validation_errors.to_string()),
        ));
    }

    let range_start = parse_month_year(&query.start)
        .map_err(|e| log_rejected("total_cost", ServiceError::ParseError(format!("invalid start: {}", e))))?;
    let range_end = parse_month_year(&query.end)
        .map_err(|e| log_rejected("total_cost", ServiceError::ParseError(format!("invalid end: {}", e))))?;

    let total = service
        .calculate_subscriptions_total_cost(query.user_id, &query.service_name, range_start, range_end)
        .await?;

    json_ok(&TotalCostResponse { total })
}

pub fn configure_subscription_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, req| {
        log_rejected(malformed_input(req), ServiceError::ParseError(err.to_string())).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, req| {
        log_rejected(malformed_input(req), ServiceError::ParseError(err.to_string())).into()
    });

    cfg.service(
        web::scope("/subscriptions")
            .app_data(json_config)
            .app_data(query_config)
            .service(
                web::resource("")
                    .route(web::post().to(create_subscription))
                    .route(web::get().to(list_subscriptions)),
            )
            .service(web::resource("/get").route(web::get().to(get_subscription)))
            .service(web::resource("/update").route(web::put().to(update_subscription)))
            .service(web::resource("/delete").route(web::delete().to(delete_subscription)))
            .service(web::resource("/user").route(web::get().to(list_user_subscriptions)))
            .service(web::resource("/total-cost").route(web::get().to(total_cost))),
    );
}

// Extractor failures happen before any handler runs.
fn malformed_input(req: &HttpRequest) -> &'static str {
    match req.path().trim_start_matches("/subscriptions") {
        "" => "create_subscription",
        "/update" => "update_subscription",
        "/get" => "get_subscription",
        "/delete" => "delete_subscription",
        "/user" => "list_user_subscriptions",
        "/total-cost" => "total_cost",
        _ => "subscriptions",
    }
}
