use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, User};

/// In-memory stand-in for the relational store. Strictly a stub/test
/// double behind the same trait; the persistent implementation is
/// `PgUserStore`.
#[derive(Debug)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed the store; the next assigned id continues past the seeds.
    pub fn with_users(users: Vec<User>) -> Self {
        let next = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
            next_id: AtomicI64::new(next),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.email == email)
            .min_by_key(|u| u.id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = user.into_user(id);
        self.users.write().await.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, user: &NewUser) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(existing) => {
                *existing = user.clone().into_user(id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            password: "hashed-secret".into(),
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();

        let first = store.create(record("A", "a@x.com")).await.unwrap();
        let second = store.create(record("B", "b@x.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn create_then_get_returns_the_record() {
        let store = InMemoryUserStore::new();
        let created = store.create(record("A", "a@x.com")).await.unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "A");
        assert_eq!(fetched.email, "a@x.com");

        assert!(store.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_by_email_prefers_the_oldest_row() {
        let store = InMemoryUserStore::new();
        store.create(record("A", "same@x.com")).await.unwrap();
        store.create(record("B", "same@x.com")).await.unwrap();

        let found = store.get_by_email("same@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);

        assert!(store.get_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_the_whole_row() {
        let store = InMemoryUserStore::new();
        let created = store.create(record("A", "a@x.com")).await.unwrap();

        let mut replacement = record("B", "b@x.com");
        replacement.wins = 3;
        let affected = store.update(created.id, &replacement).await.unwrap();
        assert_eq!(affected, 1);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "B");
        assert_eq!(fetched.email, "b@x.com");
        assert_eq!(fetched.wins, 3);
    }

    #[tokio::test]
    async fn update_missing_id_affects_nothing() {
        let store = InMemoryUserStore::new();
        let affected = store.update(42, &record("A", "a@x.com")).await.unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn delete_removes_the_row_once() {
        let store = InMemoryUserStore::new();
        let created = store.create(record("A", "a@x.com")).await.unwrap();

        assert_eq!(store.delete(created.id).await.unwrap(), 1);
        assert!(store.get(created.id).await.unwrap().is_none());
        assert_eq!(store.delete(created.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = InMemoryUserStore::new();
        store.create(record("A", "a@x.com")).await.unwrap();
        store.create(record("B", "b@x.com")).await.unwrap();
        store.create(record("C", "c@x.com")).await.unwrap();

        let all = store.list().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn with_users_continues_the_id_sequence() {
        let seeded = record("A", "a@x.com").into_user(7);
        let store = InMemoryUserStore::with_users(vec![seeded]);

        let created = store.create(record("B", "b@x.com")).await.unwrap();
        assert_eq!(created.id, 8);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
