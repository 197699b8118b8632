use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use subscription_service::{
    handlers::configure_subscription_routes,
    openapi::{configure_swagger, OPENAPI_JSON_PATH},
    SubscriptionService,
};
use subtrack_database::{
    sqlx, InMemorySubscriptionRepository, RepositoryError, SubscriptionStore,
};
use subtrack_models::{Subscription, SubscriptionResponse, TotalCostResponse};
use uuid::Uuid;

/// Store whose every call fails the way an unreachable database does.
struct FailingStore;

#[async_trait]
impl SubscriptionStore for FailingStore {
    async fn create(&self, _sub: &Subscription) -> Result<Uuid, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _sub: &Subscription) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Subscription, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_by_user(&self, _user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get_by_user_and_service(
        &self,
        _user_id: Uuid,
        _service_name: &str,
    ) -> Result<Subscription, RepositoryError> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}

fn service_data(store: Arc<dyn SubscriptionStore>) -> web::Data<SubscriptionService> {
    web::Data::new(SubscriptionService::new(store))
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(service_data($store))
                .configure(configure_subscription_routes),
        )
        .await
    };
}

fn body(user_id: Uuid, service: &str, price: i32, start: &str, end: Option<&str>) -> Value {
    let mut body = json!({
        "service_name": service,
        "price": price,
        "user_id": user_id.to_string(),
        "start_month": start,
    });
    if let Some(end) = end {
        body["end_month"] = json!(end);
    }
    body
}

#[actix_web::test]
async fn test_create_then_list() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(user, "Yandex Plus", 400, "07-2025", Some("09-2025")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(test::read_body(resp).await.is_empty());

    let req = test::TestRequest::get().uri("/subscriptions").to_request();
    let listed: Vec<SubscriptionResponse> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].user_id, user);
    assert_eq!(listed[0].service_name, "Yandex Plus");
    assert_eq!(listed[0].price, 400);
    assert_eq!(listed[0].start_month, "07-2025");
    assert_eq!(listed[0].end_month.as_deref(), Some("09-2025"));
    assert!(!listed[0].id.is_nil());
}

#[actix_web::test]
async fn test_list_empty_is_array() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));

    let req = test::TestRequest::get().uri("/subscriptions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn test_open_ended_subscription_omits_end_month() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(Uuid::new_v4(), "Netflix", 100, "01-2025", None))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/subscriptions").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert!(listed[0].get("end_month").is_none());
}

#[actix_web::test]
async fn test_create_rejects_bad_input() {
    let store = Arc::new(InMemorySubscriptionRepository::new());
    let app = init_app!(store.clone());
    let user = Uuid::new_v4();

    let malformed = test::TestRequest::post()
        .uri("/subscriptions")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"service_name\": ")
        .to_request();
    let resp = test::call_service(&app, malformed).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = test::read_body_json(resp).await;
    assert_eq!(err["error"], "Parse error");

    let bad_bodies = [
        body(user, "Netflix", 100, "2025-01", None),
        body(user, "Netflix", 100, "13-2025", None),
        body(user, "Netflix", 100, "01-2025", Some("garbage")),
        body(user, "", 100, "01-2025", None),
        body(user, "Netflix", 0, "01-2025", None),
        body(user, "Netflix", 100, "05-2025", Some("04-2025")),
        json!({
            "service_name": "Netflix",
            "price": 100,
            "user_id": "not-a-uuid",
            "start_month": "01-2025",
        }),
    ];

    for bad in bad_bodies {
        let req = test::TestRequest::post().uri("/subscriptions").set_json(&bad).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {bad}");
    }

    assert!(store.is_empty());
}

#[actix_web::test]
async fn test_get_by_id() {
    let store = Arc::new(InMemorySubscriptionRepository::new());
    let user = Uuid::new_v4();
    let id = store
        .create(&Subscription {
            id: Uuid::nil(),
            service_name: "Spotify".to_string(),
            price: 199,
            user_id: user,
            start_date: subtrack_models::parse_month_year("03-2025").unwrap(),
            end_date: None,
        })
        .await
        .unwrap();
    let app = init_app!(store);

    let req = test::TestRequest::get()
        .uri(&format!("/subscriptions/get?id={}", id))
        .to_request();
    let fetched: SubscriptionResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.user_id, user);
    assert_eq!(fetched.start_month, "03-2025");
}

#[actix_web::test]
async fn test_get_errors() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));

    let req = test::TestRequest::get()
        .uri(&format!("/subscriptions/get?id={}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: Value = test::read_body_json(resp).await;
    assert_eq!(err["error"], "Not found");

    for uri in ["/subscriptions/get", "/subscriptions/get?id=nope"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let req = test::TestRequest::get()
        .uri(&format!("/subscriptions/get?id={}", Uuid::nil()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_replaces_record() {
    let store = Arc::new(InMemorySubscriptionRepository::new());
    let app = init_app!(store.clone());
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(user, "Netflix", 100, "01-2025", None))
        .to_request();
    test::call_service(&app, req).await;
    let id = store.list().await.unwrap()[0].id;

    let req = test::TestRequest::put()
        .uri(&format!("/subscriptions/update?id={}", id))
        .set_json(body(user, "Netflix", 150, "02-2025", Some("06-2025")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let updated = store.get_by_id(id).await.unwrap();
    assert_eq!(updated.price, 150);
    assert_eq!(updated.end_date, Some(subtrack_models::parse_month_year("06-2025").unwrap()));

    let req = test::TestRequest::put()
        .uri(&format!("/subscriptions/update?id={}", Uuid::new_v4()))
        .set_json(body(user, "Netflix", 150, "02-2025", None))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_is_idempotent() {
    let store = Arc::new(InMemorySubscriptionRepository::new());
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(Uuid::new_v4(), "Netflix", 100, "01-2025", None))
        .to_request();
    test::call_service(&app, req).await;
    let id = store.list().await.unwrap()[0].id;

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&format!("/subscriptions/delete?id={}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    assert!(store.is_empty());

    let req = test::TestRequest::delete().uri("/subscriptions/delete").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_by_user() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for (user, service) in [(alice, "Netflix"), (alice, "Spotify"), (bob, "Netflix")] {
        let req = test::TestRequest::post()
            .uri("/subscriptions")
            .set_json(body(user, service, 100, "01-2025", None))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/subscriptions/user?userId={}", alice))
        .to_request();
    let listed: Vec<SubscriptionResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| s.user_id == alice));
}

#[actix_web::test]
async fn test_total_cost() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(user, "Yandex Plus", 400, "07-2025", Some("12-2025")))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/subscriptions/total-cost?userId={}&serviceName=Yandex%20Plus&start=01-2025&end=09-2025",
            user
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let total: TotalCostResponse = test::read_body_json(resp).await;
    assert_eq!(total.total, 1200);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/subscriptions/total-cost?userId={}&serviceName=Yandex%20Plus&start=01-2026&end=03-2026",
            user
        ))
        .to_request();
    let total: TotalCostResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(total.total, 0);
}

#[actix_web::test]
async fn test_total_cost_errors() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));
    let user = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri(&format!(
            "/subscriptions/total-cost?userId={}&serviceName=Netflix&start=01-2025&end=03-2025",
            user
        ))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let bad_queries = [
        format!("userId={}&serviceName=&start=01-2025&end=03-2025", user),
        format!("userId={}&serviceName=Netflix&start=2025-01&end=03-2025", user),
        format!("userId={}&serviceName=Netflix&start=01-2025&end=3-2025", user),
        format!("userId={}&serviceName=Netflix&start=01-2025", user),
        "userId=nope&serviceName=Netflix&start=01-2025&end=03-2025".to_string(),
    ];

    for query in bad_queries {
        let req = test::TestRequest::get()
            .uri(&format!("/subscriptions/total-cost?{}", query))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{query}");
    }
}

#[actix_web::test]
async fn test_wrong_method_is_rejected() {
    let app = init_app!(Arc::new(InMemorySubscriptionRepository::new()));

    let wrong = [
        test::TestRequest::delete().uri("/subscriptions"),
        test::TestRequest::post().uri("/subscriptions/get"),
        test::TestRequest::get().uri("/subscriptions/update"),
        test::TestRequest::get().uri("/subscriptions/delete"),
        test::TestRequest::put().uri("/subscriptions/user"),
        test::TestRequest::post().uri("/subscriptions/total-cost"),
    ];

    for req in wrong {
        let req = req.to_request();
        let target = format!("{} {}", req.method(), req.path());
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{target}");
    }

    let req = test::TestRequest::get().uri("/subscriptions/unknown").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_openapi_document_is_served() {
    let app = test::init_service(App::new().configure(configure_swagger)).await;

    let req = test::TestRequest::get().uri(OPENAPI_JSON_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let doc: Value = test::read_body_json(resp).await;
    assert_eq!(doc["info"]["title"], "Subscription Service API");
    for path in ["/subscriptions", "/subscriptions/get", "/subscriptions/total-cost"] {
        assert!(doc["paths"].get(path).is_some(), "{path} missing");
    }
    assert!(doc["paths"]["/subscriptions"].get("post").is_some());
    assert!(doc["components"]["schemas"].get("SubscriptionResponse").is_some());
}

#[actix_web::test]
async fn test_store_failure_is_internal_error() {
    let app = init_app!(Arc::new(FailingStore));

    let req = test::TestRequest::get().uri("/subscriptions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = test::read_body_json(resp).await;
    assert_eq!(err["error"], "Database error");

    let req = test::TestRequest::post()
        .uri("/subscriptions")
        .set_json(body(Uuid::new_v4(), "Netflix", 100, "01-2025", None))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
