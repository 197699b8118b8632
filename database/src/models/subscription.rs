use chrono::{DateTime, Utc};
use sqlx::FromRow;
use subtrack_models::Subscription;
use uuid::Uuid;

/// One row of the `subscriptions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}
