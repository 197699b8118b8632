use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::month::{format_month_year, zero_month};

/// A billable service a user pays for monthly.
///
/// `start_date` and `end_date` are normalized months. `end_date: None` means
/// the subscription is still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubscriptionValidationError {
    #[error("id is required")]
    MissingId,
    #[error("service name is required")]
    EmptyServiceName,
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("start date is required")]
    MissingStartDate,
    #[error("end date must not be before start date")]
    EndBeforeStart,
}

impl Subscription {
    /// Checks the mutable fields. The id is not inspected here.
    pub fn validate_fields(&self) -> Result<(), SubscriptionValidationError> {
        if self.service_name.is_empty() {
            return Err(SubscriptionValidationError::EmptyServiceName);
        }
        if self.price <= 0 {
            return Err(SubscriptionValidationError::NonPositivePrice);
        }
        if zero_month(&self.start_date) {
            return Err(SubscriptionValidationError::MissingStartDate);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(SubscriptionValidationError::EndBeforeStart);
            }
        }
        Ok(())
    }

    /// Field checks plus a non-nil id, for full-record replacement.
    pub fn validate_for_update(&self) -> Result<(), SubscriptionValidationError> {
        if self.id.is_nil() {
            return Err(SubscriptionValidationError::MissingId);
        }
        self.validate_fields()
    }
}

/// Body of `POST /subscriptions` and `PUT /subscriptions/update`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    /// `MM-YYYY`
    #[schema(example = "07-2025")]
    pub start_month: String,
    /// `MM-YYYY`; omitted for an open-ended subscription
    #[serde(default)]
    pub end_month: Option<String>,
}

/// Updates replace the whole record and take the same body as creation.
pub type UpdateSubscriptionRequest = CreateSubscriptionRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<String>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name.clone(),
            price: sub.price,
            user_id: sub.user_id,
            start_month: format_month_year(&sub.start_date),
            end_month: sub.end_date.as_ref().map(format_month_year),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionIdQuery {
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSubscriptionsQuery {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// Query of `GET /subscriptions/total-cost`.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "serviceName")]
    #[validate(length(min = 1, message = "serviceName is required"))]
    pub service_name: String,
    /// `MM-YYYY`
    pub start: String,
    /// `MM-YYYY`
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    pub total: i64,
}
