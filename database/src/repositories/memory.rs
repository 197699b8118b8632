use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use subtrack_models::Subscription;
use uuid::Uuid;

use super::{RepositoryError, SubscriptionStore};

/// Process-local [`SubscriptionStore`] with the same ordering and not-found
/// rules as the PostgreSQL repository.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn sorted(mut subs: Vec<Subscription>) -> Vec<Subscription> {
        subs.sort_by(|a, b| (a.start_date, a.id).cmp(&(b.start_date, b.id)));
        subs
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionRepository {
    async fn create(&self, sub: &Subscription) -> Result<Uuid, RepositoryError> {
        let id = if sub.id.is_nil() { Uuid::new_v4() } else { sub.id };

        let mut rows = self.rows.write();
        if rows.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }
        rows.insert(id, Subscription { id, ..sub.clone() });
        Ok(id)
    }

    async fn update(&self, sub: &Subscription) -> Result<(), RepositoryError> {
        match self.rows.write().get_mut(&sub.id) {
            Some(existing) => {
                *existing = sub.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.rows.write().remove(&id);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, RepositoryError> {
        self.rows.read().get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(Self::sorted(self.rows.read().values().cloned().collect()))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, RepositoryError> {
        let subs = self
            .rows
            .read()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::sorted(subs))
    }

    async fn get_by_user_and_service(
        &self,
        user_id: Uuid,
        service_name: &str,
    ) -> Result<Subscription, RepositoryError> {
        self.rows
            .read()
            .values()
            .filter(|s| s.user_id == user_id && s.service_name == service_name)
            .max_by_key(|s| (s.start_date, s.id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}
