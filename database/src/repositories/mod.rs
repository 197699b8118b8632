// Repository pattern for database operations

pub mod memory;
pub mod subscription;

pub use memory::InMemorySubscriptionRepository;
pub use subscription::SubscriptionRepository;

use async_trait::async_trait;
use subtrack_models::Subscription;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("subscription not found")]
    NotFound,
    #[error("subscription {0} already exists")]
    AlreadyExists(Uuid),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            other => RepositoryError::Database(other),
        }
    }
}

/// Storage of subscription records.
///
/// Every operation is a single auto-committed statement. Lookups of a single
/// record report [`RepositoryError::NotFound`] when nothing matches.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts the record, assigning an id when `sub.id` is nil. Returns the id used.
    async fn create(&self, sub: &Subscription) -> Result<Uuid, RepositoryError>;

    /// Replaces every mutable field of the record with id `sub.id`.
    async fn update(&self, sub: &Subscription) -> Result<(), RepositoryError>;

    /// Removes the record. Unknown ids are not an error.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, RepositoryError>;

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError>;

    /// The user's subscription to `service_name` with the latest start date.
    async fn get_by_user_and_service(
        &self,
        user_id: Uuid,
        service_name: &str,
    ) -> Result<Subscription, RepositoryError>;
}
