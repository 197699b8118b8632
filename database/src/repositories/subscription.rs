use async_trait::async_trait;
use sqlx::PgPool;
use subtrack_models::Subscription;
use tracing::{debug, error};
use uuid::Uuid;

use super::{RepositoryError, SubscriptionStore};
use crate::models::SubscriptionRow;

const INSERT: &str = r#"
    INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

const UPDATE: &str = r#"
    UPDATE subscriptions
    SET service_name = $2, price = $3, user_id = $4, start_date = $5, end_date = $6
    WHERE id = $1
"#;

const DELETE: &str = "DELETE FROM subscriptions WHERE id = $1";

const SELECT_BY_ID: &str = r#"
    SELECT id, service_name, price, user_id, start_date, end_date
    FROM subscriptions
    WHERE id = $1
"#;

const SELECT_ALL: &str = r#"
    SELECT id, service_name, price, user_id, start_date, end_date
    FROM subscriptions
    ORDER BY start_date, id
"#;

const SELECT_BY_USER: &str = r#"
    SELECT id, service_name, price, user_id, start_date, end_date
    FROM subscriptions
    WHERE user_id = $1
    ORDER BY start_date, id
"#;

const SELECT_BY_USER_AND_SERVICE: &str = r#"
    SELECT id, service_name, price, user_id, start_date, end_date
    FROM subscriptions
    WHERE user_id = $1 AND service_name = $2
    ORDER BY start_date DESC, id DESC
    LIMIT 1
"#;

/// PostgreSQL-backed [`SubscriptionStore`].
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn log_failure(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match RepositoryError::from(err) {
        RepositoryError::NotFound => RepositoryError::NotFound,
        RepositoryError::Database(e) => {
            error!(target: "database", operation, table = "subscriptions", error = %e, "Query failed");
            RepositoryError::Database(e)
        }
        other => other,
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn create(&self, sub: &Subscription) -> Result<Uuid, RepositoryError> {
        let id = if sub.id.is_nil() { Uuid::new_v4() } else { sub.id };

        sqlx::query(INSERT)
            .bind(id)
            .bind(&sub.service_name)
            .bind(sub.price)
            .bind(sub.user_id)
            .bind(sub.start_date)
            .bind(sub.end_date)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    RepositoryError::AlreadyExists(id)
                }
                other => log_failure("insert", other),
            })?;

        debug!(target: "database", operation = "insert", table = "subscriptions", id = %id, user_id = %sub.user_id, "db operation");
        Ok(id)
    }

    async fn update(&self, sub: &Subscription) -> Result<(), RepositoryError> {
        let result = sqlx::query(UPDATE)
            .bind(sub.id)
            .bind(&sub.service_name)
            .bind(sub.price)
            .bind(sub.user_id)
            .bind(sub.start_date)
            .bind(sub.end_date)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(target: "database", operation = "update", table = "subscriptions", id = %sub.id, "db operation");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(DELETE)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("delete", e))?;

        debug!(
            target: "database",
            operation = "delete",
            table = "subscriptions",
            id = %id,
            rows_affected = result.rows_affected(),
            "db operation"
        );
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| log_failure("select_by_id", e))?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("select_all", e))?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(SELECT_BY_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("select_by_user", e))?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn get_by_user_and_service(
        &self,
        user_id: Uuid,
        service_name: &str,
    ) -> Result<Subscription, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(SELECT_BY_USER_AND_SERVICE)
            .bind(user_id)
            .bind(service_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| log_failure("select_by_user_and_service", e))?;

        Ok(row.into())
    }
}
