use chrono::{DateTime, Utc};
use std::sync::Arc;
use subtrack_database::SubscriptionStore;
use subtrack_models::{Subscription, SubscriptionValidationError};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::cost::overlap_window;
use crate::errors::ServiceError;

/// Validation and orchestration on top of a [`SubscriptionStore`].
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

fn reject(reason: SubscriptionValidationError) -> ServiceError {
    warn!(reason = %reason, "invalid subscription data");
    reason.into()
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Validates and stores a new subscription, generating its id when unset.
    /// Returns the stored id.
    pub async fn create_subscription(&self, mut sub: Subscription) -> Result<Uuid, ServiceError> {
        sub.validate_fields().map_err(reject)?;

        if sub.id.is_nil() {
            sub.id = Uuid::new_v4();
        }

        let id = self.store.create(&sub).await.map_err(|e| {
            error!(error = %e, user_id = %sub.user_id, "failed to create subscription");
            ServiceError::from(e)
        })?;

        info!(id = %id, user_id = %sub.user_id, service = %sub.service_name, "subscription created");
        Ok(id)
    }

    /// Replaces every mutable field of an existing subscription.
    pub async fn update_subscription(&self, sub: Subscription) -> Result<(), ServiceError> {
        sub.validate_for_update().map_err(reject)?;

        self.store.update(&sub).await.map_err(|e| {
            error!(error = %e, id = %sub.id, "failed to update subscription");
            ServiceError::from(e)
        })?;

        info!(id = %sub.id, "subscription updated");
        Ok(())
    }

    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), ServiceError> {
        if id.is_nil() {
            return Err(reject(SubscriptionValidationError::MissingId));
        }

        self.store.delete(id).await.map_err(|e| {
            error!(error = %e, id = %id, "failed to delete subscription");
            ServiceError::from(e)
        })?;

        info!(id = %id, "subscription deleted");
        Ok(())
    }

    pub async fn get_subscription_by_id(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        if id.is_nil() {
            return Err(reject(SubscriptionValidationError::MissingId));
        }

        let sub = self.store.get_by_id(id).await.map_err(|e| {
            error!(error = %e, id = %id, "failed to get subscription by id");
            ServiceError::from(e)
        })?;

        debug!(id = %id, "subscription fetched");
        Ok(sub)
    }

    pub async fn list(&self) -> Result<Vec<Subscription>, ServiceError> {
        let subs = self.store.list().await.map_err(|e| {
            error!(error = %e, "failed to list subscriptions");
            ServiceError::from(e)
        })?;

        debug!(count = subs.len(), "subscriptions fetched");
        Ok(subs)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, ServiceError> {
        if user_id.is_nil() {
            return Err(ServiceError::ValidationError("user id is required".to_string()));
        }

        let subs = self.store.list_by_user(user_id).await.map_err(|e| {
            error!(error = %e, user_id = %user_id, "failed to list user subscriptions");
            ServiceError::from(e)
        })?;

        debug!(user_id = %user_id, count = subs.len(), "user subscriptions fetched");
        Ok(subs)
    }

    /// Cost of the user's subscription to `service_name` over the months
    /// `range_start..=range_end`.
    ///
    /// Costs a single subscription: when the user has several for the same
    /// service, the one with the latest start month is used.
    #[instrument(skip(self), fields(months = tracing::field::Empty))]
    pub async fn calculate_subscriptions_total_cost(
        &self,
        user_id: Uuid,
        service_name: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        if service_name.is_empty() {
            return Err(reject(SubscriptionValidationError::EmptyServiceName));
        }

        let sub = self
            .store
            .get_by_user_and_service(user_id, service_name)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to get subscription");
                ServiceError::from(e)
            })?;

        let Some(window) = overlap_window(&sub, range_start, range_end) else {
            info!(subscription_id = %sub.id, "no overlapping period for subscription");
            return Ok(0);
        };

        let total = window.cost(sub.price);
        tracing::Span::current().record("months", window.months());

        debug!(subscription_id = %sub.id, price = sub.price, total, "calculated subscription cost");
        Ok(total)
    }
}
