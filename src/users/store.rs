use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::RwLock;
use thiserror::Error;

use crate::users::model::{NewUser, User};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
}

/// Narrow contract the auth pipeline depends on. A database-backed store
/// would implement this same trait; lookups are async because a real store
/// may block on I/O.
#[rocket::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, user_id: i64) -> StoreResult<Option<User>>;
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;
    async fn list(&self) -> StoreResult<Vec<User>>;
}

/// Handle managed in Rocket state and shared by handlers and guards.
pub type SharedUserStore = Arc<dyn UserStore>;

/// In-process user store. The lock is held only across map access, never
/// across an await point.
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[rocket::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let users = self.users.read();
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(StoreError::UsernameTaken(new_user.username));
        }

        let user = User {
            user_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role_name: new_user.role_name,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, role: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "hash".into(),
            role_name: role.into(),
        }
    }

    #[rocket::async_test]
    async fn assigns_sequential_ids() {
        let store = MemoryUserStore::new();
        let first = store.create(new_user("sue", "student")).await.expect("create sue");
        let second = store.create(new_user("bob", "admin")).await.expect("create bob");
        assert_eq!(first.user_id, 1);
        assert_eq!(second.user_id, 2);
    }

    #[rocket::async_test]
    async fn rejects_duplicate_usernames() {
        let store = MemoryUserStore::new();
        store.create(new_user("sue", "student")).await.expect("create sue");
        let err = store.create(new_user("sue", "teacher")).await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "sue"));
    }

    #[rocket::async_test]
    async fn finds_by_username_and_id() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("sue", "student")).await.expect("create sue");

        let by_name = store
            .find_by_username("sue")
            .await
            .expect("lookup runs")
            .expect("sue exists");
        assert_eq!(by_name.user_id, created.user_id);

        let by_id = store
            .find_by_id(created.user_id)
            .await
            .expect("lookup runs")
            .expect("sue exists");
        assert_eq!(by_id.username, "sue");

        assert!(store.find_by_username("nobody").await.expect("lookup runs").is_none());
    }
}
