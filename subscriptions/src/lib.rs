//! Subscription tracking service: HTTP handlers, orchestration and cost
//! calculation on top of the storage layer in `subtrack-database`.

pub mod errors;
pub mod handlers;
pub mod openapi;
pub mod services;

pub use errors::ServiceError;
pub use services::SubscriptionService;

pub const SERVICE_NAME: &str = "subscription-service";
